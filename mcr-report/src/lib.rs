//! mcr-report library - Missing contacts report service
//!
//! Pulls client tasks from the upstream project-management API, keeps the
//! ones missing a phone number or email, sorts them by segmentation and
//! serves the result as a PDF.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod services;

pub use config::{Credentials, ReportSettings};
pub use services::{AsanaClient, RecordSource, SourceError};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream record provider
    pub source: Arc<dyn RecordSource>,
    /// Read-only settings built at startup
    pub settings: Arc<ReportSettings>,
}

impl AppState {
    /// Create new application state
    pub fn new(source: Arc<dyn RecordSource>, settings: ReportSettings) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/generatePDF", get(api::generate_pdf))
        .route("/api/missing-contacts", get(api::list_missing_contacts))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
