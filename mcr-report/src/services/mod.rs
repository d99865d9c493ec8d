//! Upstream service integrations

pub mod asana_client;
pub mod record_source;

pub use asana_client::AsanaClient;
pub use record_source::{RecordSource, SourceError};
