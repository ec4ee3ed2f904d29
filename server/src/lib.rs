mod db;
mod error;
mod handlers;

use std::net::SocketAddr;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use config::Config;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::db::init_database;
pub use crate::error::{AppError, AppResult};

/// Used when `RUST_LOG` is unset. Targets are crate names, not package names.
const DEFAULT_LOG_FILTER: &str = "warn,piste_server=info,piste_core=info,tower_http=warn";

#[derive(Debug, Deserialize)]
struct ServerConfig {
    port: u16,
    cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: String,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    server: ServerConfig,
    database: DatabaseConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub db: turso::Database,
}

pub fn build_router(state: AppState, cors_layer: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/workouts",
            get(handlers::list_workouts).post(handlers::create_workout),
        )
        .route(
            "/api/workouts/{id}",
            get(handlers::get_workout).delete(handlers::delete_workout),
        )
        .route(
            "/api/workouts/{id}/complete",
            post(handlers::complete_workout),
        )
        .route(
            "/api/workouts/{id}/deviations",
            get(handlers::get_deviations),
        )
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

fn load_config() -> AppResult<AppConfig> {
    Config::builder()
        .set_default("server.port", 3000_i64)
        .and_then(|builder| builder.set_default("server.cors_origins", Vec::<String>::new()))
        .and_then(|builder| builder.set_default("database.path", "piste.db"))
        .map_err(|err| AppError::Internal(format!("invalid config defaults: {err}")))?
        .add_source(
            config::Environment::with_prefix("PISTE")
                .separator("__")
                .list_separator(",")
                .try_parsing(true)
                .with_list_parse_key("server.cors_origins"),
        )
        .build()
        .map_err(|err| AppError::Internal(format!("failed to load config: {err}")))?
        .try_deserialize()
        .map_err(|err| AppError::Internal(format!("failed to parse config: {err}")))
}

fn build_cors_layer(origins: &[String]) -> AppResult<CorsLayer> {
    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .map_err(|err| AppError::Internal(format!("invalid CORS origin '{origin}': {err}")))
        })
        .collect::<Result<_, _>>()?;

    Ok(CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(allowed_origins)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(env_filter);

    let _ = subscriber.try_init();
}

pub async fn run() -> AppResult<()> {
    init_tracing();

    let app_config = load_config()?;
    let cors_layer = build_cors_layer(&app_config.server.cors_origins)?;

    let db = init_database(&app_config.database.path).await?;

    let app = build_router(AppState { db }, cors_layer);

    let addr: SocketAddr = ([0, 0, 0, 0], app_config.server.port).into();
    let listener = TcpListener::bind(addr).await?;
    info!(
        "listening on {addr}, database: {}",
        app_config.database.path
    );
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
