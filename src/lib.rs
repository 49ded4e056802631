pub mod competition;
pub mod config;
pub mod db;
pub mod errors;
pub mod games;
mod http;
mod middleware;
pub mod models;
mod scheduler;
pub mod seasons;
pub mod state;

use axum::{Router, middleware as axum_middleware};
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use chrono::Utc;
use middleware::{cors_layer, create_global_rate_limiter, rate_limit_middleware};
use scheduler::PeriodicRefresher;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    competition::{SyncReport, update_scores},
    config::Settings,
    db::{PgSeasonStore, RedisGameStore},
    errors::AppError,
    models::Season,
    seasons::DurationUnit,
    state::AppState,
};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connects Postgres and Redis and wires the stores into the app state.
pub async fn connect(settings: &Settings) -> Result<AppState, AppError> {
    let postgres = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to Postgres: {}", e)))?;

    let seasons = PgSeasonStore::new(postgres);
    seasons.init().await?;

    let manager = RedisConnectionManager::new(settings.redis_url.as_str())?;
    let redis = Pool::builder().build(manager).await?;

    AppState::new(
        Arc::new(seasons),
        Arc::new(RedisGameStore::new(redis)),
        settings.home_venue.clone(),
        settings.sync.clone(),
    )
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let global_rate_limiter = create_global_rate_limiter();

    Router::new()
        .merge(http::create_http_routes(state))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(allowed_origins)),
        )
        .fallback(|| async { "404 Not Found" })
}

pub async fn start_server(settings: Settings) -> Result<(), AppError> {
    let state = connect(&settings).await?;

    if settings.sync.interval.is_zero() {
        tracing::info!("Scheduled score refresh disabled");
    } else {
        let refresher = PeriodicRefresher::new(
            state.engine.clone(),
            settings.sync.interval,
            settings.sync.hours,
            settings.sync.concurrency,
        );
        tokio::spawn(refresher.run());
    }

    let app = build_router(state, &settings.allowed_origins);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port))
        .await
        .map_err(|e| AppError::EnvError(format!("Failed to bind port {}: {}", settings.port, e)))?;

    tracing::info!("Clubmanager server running at http://0.0.0.0:{}", settings.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
    .map_err(|e| {
        tracing::error!("Server error: {}", e);
        AppError::InternalError
    })
}

pub async fn run_update_scores(settings: Settings, hours: i64) -> Result<SyncReport, AppError> {
    let state = connect(&settings).await?;
    update_scores(&state.engine, hours, Utc::now(), settings.sync.concurrency).await
}

pub async fn run_add_season(
    settings: Settings,
    duration: u32,
    unit: DurationUnit,
) -> Result<Season, AppError> {
    let state = connect(&settings).await?;
    seasons::create_next_season(state.seasons.as_ref(), duration, unit).await
}
