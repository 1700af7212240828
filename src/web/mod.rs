// src/web/mod.rs
// HTTP presentation layer over the assistant flows

pub mod api;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerSettings;
use crate::error::{MuseoError, Result};
pub use crate::web::state::{AppState, AudioStore};

/// Create the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/status", get(api::status))
        .route("/itinerary", post(api::itinerary))
        .route("/speech", post(api::speech))
        .route("/audio/{id}", get(api::audio))
        .route("/question", post(api::question))
        .route("/exit-ticket", post(api::exit_ticket))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve until the process is stopped
pub async fn run(settings: &ServerSettings, state: AppState) -> Result<()> {
    let listener = bind(settings).await?;
    let app = create_router(state);
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Bind the configured host and port; host names are resolved
pub async fn bind(settings: &ServerSettings) -> Result<TcpListener> {
    TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .map_err(|e| {
            MuseoError::Configuration(format!(
                "cannot listen on {}:{}: {e}",
                settings.host, settings.port
            ))
        })
}
