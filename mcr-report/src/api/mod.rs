//! HTTP API handlers for mcr-report

pub mod health;
pub mod missing;
pub mod report;

pub use health::health_routes;
pub use missing::list_missing_contacts;
pub use report::{generate_pdf, NO_RESULTS_MESSAGE};
