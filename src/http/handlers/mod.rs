pub mod game;
pub mod season;

pub use game::{
    add_game_handler, delete_game_handler, get_all_games_handler, get_game_handler,
    get_public_games_handler, refresh_game_handler, sync_games_handler, update_game_handler,
};

pub use season::{add_season_handler, get_current_season_handler, get_seasons_handler};
