//! Account Keeper - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use account_keeper_backend::{
    api::{self, AppState},
    config::Config,
    db,
    error::Result,
    store::postgres::PgStore,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    telemetry::init_tracing(&config.log_level);
    tracing::info!(?config, "Starting Account Keeper");

    let db_pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Connected to database");

    db::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    let store = Arc::new(PgStore::new(db_pool));
    let state = AppState::new(config.clone(), store.clone(), store)?;

    provision_admin_user(&state).await?;

    let app = api::routes::create_router(Arc::new(state))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the configured administrator on first boot.
async fn provision_admin_user(state: &AppState) -> Result<()> {
    let config = &state.config;
    match config.admin_password {
        Some(ref password) => {
            state
                .user_service
                .provision_admin(&config.admin_username, &config.admin_email, password)
                .await?;
        }
        None => {
            tracing::warn!(
                "ADMIN_PASSWORD not set; no administrator is provisioned automatically"
            );
        }
    }
    Ok(())
}

/// Whitelisted origins with credentials in development, anything otherwise.
fn cors_layer(config: &Config) -> CorsLayer {
    if !config.is_development() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}
