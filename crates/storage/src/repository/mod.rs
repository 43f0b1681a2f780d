pub mod player;
pub mod team;

pub use player::PlayerRepository;
pub use team::TeamRepository;
