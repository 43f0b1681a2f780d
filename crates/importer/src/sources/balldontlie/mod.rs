mod client;
mod config;
mod delay;
mod models;
mod transformer;

pub use client::{BallDontLieClient, MAX_PER_PAGE};
pub use config::{BallDontLieConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_DELAY};
pub use delay::{FixedDelay, NoDelay, RequestDelay};
pub use models::{Cursor, Decoded, ExternalPlayer, ExternalTeam, InvalidRecord, PageMeta, TeamRef};
pub use transformer::{transform_player, transform_team};
