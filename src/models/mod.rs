pub mod game;
pub mod redis;
pub mod season;

pub use game::{Game, GamePatch, GameView};
pub use season::Season;
