use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        add_game_handler, add_season_handler, delete_game_handler, get_all_games_handler,
        get_current_season_handler, get_game_handler, get_public_games_handler,
        get_seasons_handler, refresh_game_handler, sync_games_handler, update_game_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    let public = Router::new()
        .route("/games", get(get_public_games_handler))
        .route("/seasons", get(get_seasons_handler))
        .route("/seasons/current", get(get_current_season_handler));

    let admin = Router::new()
        .route("/seasons", post(add_season_handler))
        .route("/games", get(get_all_games_handler).post(add_game_handler))
        .route("/games/sync", post(sync_games_handler))
        .route(
            "/games/{id}",
            get(get_game_handler)
                .put(update_game_handler)
                .delete(delete_game_handler),
        )
        .route("/games/{id}/refresh", post(refresh_game_handler));

    Router::new()
        .nest("/api", public)
        .nest("/admin", admin)
        .with_state(state)
}
