mod conference;
mod player;
mod team;

pub use conference::Conference;
pub use player::Player;
pub use team::Team;
