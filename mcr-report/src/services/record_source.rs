//! Record source abstraction
//!
//! The aggregator only sees this trait. The production implementation is
//! [`AsanaClient`](super::asana_client::AsanaClient); tests substitute
//! in-memory sources.

use async_trait::async_trait;
use mcr_common::{Container, Record};
use thiserror::Error;

/// Upstream data source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid container {0}: {1}")]
    InvalidContainer(String, String),
}

/// Provider of containers and their records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// List the containers belonging to a collection (portfolio)
    async fn list_containers(&self, collection_id: &str) -> Result<Vec<Container>, SourceError>;

    /// Fetch every record of one container
    ///
    /// Implementations consume all upstream pages before returning.
    async fn fetch_records(&self, container: &Container) -> Result<Vec<Record>, SourceError>;
}
