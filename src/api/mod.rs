//! REST API server for NoteGenius.
//!
//! Provides HTTP endpoints for:
//! - Submitting audio or meeting notes
//! - Observing session stage, progress and result
//! - Resetting the session
//! - Exporting results as text

pub mod error;
pub mod routes;

use crate::config::Config;
use crate::session::SessionMachine;
use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;

pub use routes::session::SessionRouteState;

pub struct ApiServer {
    port: u16,
    session_state: SessionRouteState,
}

impl ApiServer {
    pub fn new(machine: Arc<SessionMachine>, config: &Config) -> Self {
        Self {
            port: config.server.port,
            session_state: SessionRouteState { machine },
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(status))
            .route("/version", get(version))
            .merge(routes::session::router(self.session_state.clone()))
            .layer(ServiceBuilder::new())
    }

    pub async fn start(self) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /               - Service info");
        info!("  GET  /version        - Get version info");
        info!("  POST /submit/audio   - Submit audio file metadata");
        info!("  POST /submit/text    - Submit meeting notes");
        info!("  POST /reset          - Reset the session");
        info!("  GET  /status         - Get session stage, progress and result");
        info!("  GET  /result/export  - Export result (?section=summary|actions)");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "notegenius",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "notegenius"
    }))
}
