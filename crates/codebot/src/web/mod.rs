//! HTTP server behind the mini app
//!
//! JSON endpoints for generation and the project store, the mini app page
//! itself, and the Telegram webhook route.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use codecore::config::TelegramConfig;
use codecore::{Pipeline, ProjectStore};
use tower_http::cors::{Any, CorsLayer};

use crate::telegram::BotLink;

pub use error::ApiError;

/// Shared state of the web server
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub store: ProjectStore,
    pub telegram: Arc<TelegramConfig>,
    /// Absent when no bot token is configured; chat delivery is then unavailable
    pub bot: Option<BotLink>,
}

/// Builds the router with all routes
pub fn create_router(state: AppState) -> Router {
    // The mini app runs inside Telegram's webview on another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/generate", post(handlers::generate))
        .route("/projects/save", post(handlers::save_project))
        .route("/projects/list/{user_id}", get(handlers::list_projects))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/delete", post(handlers::delete_project))
        .route("/projects/send_to_chat", post(handlers::send_to_chat))
        .route("/webhook", post(handlers::webhook))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves `router` on `0.0.0.0:<port>` until Ctrl+C.
pub async fn run_server(port: u16, router: Router) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    log::info!("🌐 Starting Code Studio web server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Shutting down web server"),
                Err(e) => {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    Ok(())
}
