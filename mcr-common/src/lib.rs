//! # MCR Common Library
//!
//! Shared code for the missing-contacts report service:
//! - Data model for upstream records and classified report rows
//! - Configuration loading (TOML file discovery and parsing)
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{ClassifiedRecord, Container, CustomField, Record};
