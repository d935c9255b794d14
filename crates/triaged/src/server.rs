//! HTTP server for triaged.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use triage_common::TriageConfig;

use crate::auth::SessionStore;
use crate::routes;

/// Application state shared across handlers.
///
/// There is deliberately no cached mapping set here: every triage request
/// loads its own table so concurrent requests cannot observe each other.
pub struct AppState {
    pub config: TriageConfig,
    pub sessions: SessionStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: TriageConfig) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
            start_time: Instant::now(),
        }
    }
}

/// Build the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload = state.config.max_upload_bytes;

    // Credentialed CORS cannot use wildcards; mirror the caller's origin.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // Unknown paths fall through to the frontend bundle.
    let frontend = ServeDir::new(&static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::auth_routes())
        .merge(routes::triage_routes())
        .with_state(state)
        .fallback_service(frontend)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr.clone();
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
