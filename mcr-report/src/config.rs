//! Service settings assembled at startup
//!
//! Combines the required credentials (command line or environment) with the
//! optional TOML configuration. Handlers receive the result through
//! [`AppState`](crate::AppState) and never read the environment themselves.

use mcr_common::config::{is_valid_value, ReportConfig, TomlConfig};
use mcr_common::{Error, Result};

use crate::pipeline::AggregateOptions;

/// Upstream credentials; both are required to start
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub portfolio_id: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, portfolio_id: impl Into<String>) -> Result<Self> {
        let credentials = Self {
            access_token: access_token.into(),
            portfolio_id: portfolio_id.into(),
        };

        if !is_valid_value(&credentials.access_token) {
            return Err(Error::Config(
                "Missing environment variable: ASANA_PAT".to_string(),
            ));
        }
        if !is_valid_value(&credentials.portfolio_id) {
            return Err(Error::Config(
                "Missing environment variable: PORTFOLIO_ID".to_string(),
            ));
        }
        if credentials.portfolio_id.contains('/') {
            return Err(Error::InvalidInput(format!(
                "PORTFOLIO_ID is not a valid identifier: {}",
                credentials.portfolio_id
            )));
        }

        Ok(credentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("portfolio_id", &self.portfolio_id)
            .finish()
    }
}

/// Per-request pipeline and report settings
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub portfolio_id: String,
    pub aggregate: AggregateOptions,
    pub report: ReportConfig,
}

impl ReportSettings {
    pub fn new(portfolio_id: impl Into<String>, config: &TomlConfig) -> Self {
        Self {
            portfolio_id: portfolio_id.into(),
            aggregate: AggregateOptions::from_config(config),
            report: config.report.clone(),
        }
    }

    /// `Content-Disposition` header value for the PDF download
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.report.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_required() {
        assert!(Credentials::new("", "123").is_err());
        assert!(Credentials::new("token", "   ").is_err());
        assert!(Credentials::new("token", "12/34").is_err());
        assert!(Credentials::new("token", "1211037518855167").is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = Credentials::new("secret-token", "42").unwrap();
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("42"));
    }

    #[test]
    fn test_content_disposition_uses_filename() {
        let settings = ReportSettings::new("42", &TomlConfig::default());
        assert_eq!(
            settings.content_disposition(),
            "attachment; filename=missing_clients.pdf"
        );
    }
}
