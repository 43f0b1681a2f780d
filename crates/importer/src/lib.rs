pub mod error;
pub mod jobs;
pub mod reconcile;
pub mod runner;
pub mod sources;
pub mod traits;

pub use error::{ImporterError, Result};
pub use jobs::{ImportJob, ImportReport, JobOutcome, JobRunner};
pub use reconcile::{ImportStats, Outcome, Reconciler};
pub use runner::{
    ImportRunner, PlayerImportReport, PlayerImporter, TeamImportReport, TeamImporter,
    run_player_import, run_team_import,
};
pub use traits::{EntityImporter, ImportContext, NbaSource, Page};

pub use sources::balldontlie::{BallDontLieClient, BallDontLieConfig};
