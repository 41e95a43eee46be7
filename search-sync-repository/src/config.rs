//! Configuration for the search index client.

use std::time::Duration;

use url::Url;

use crate::errors::IndexClientError;

/// Configuration for the search index client.
///
/// Credentials and endpoint are supplied by the caller and validated here at
/// startup; nothing is baked into the synchronization logic.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Search service endpoint, e.g. "http://localhost:9200".
    pub endpoint: String,
    /// Optional basic-auth username.
    pub username: Option<String>,
    /// Optional basic-auth password.
    pub password: Option<String>,
    /// Alias under which the live index is served.
    pub alias: String,
    /// Per-call timeout. Calls exceeding it are classified transient.
    pub request_timeout: Duration,
    /// Maximum number of documents allowed in a single batch operation.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9200".to_string(),
            username: None,
            password: None,
            alias: "packages".to_string(),
            request_timeout: Duration::from_secs(30),
            max_batch_size: Some(1000),
        }
    }
}

impl SearchIndexConfig {
    /// Validate the configuration.
    ///
    /// Checks that the endpoint parses as a URL, the alias is non-empty, and
    /// credentials are either both present or both absent.
    pub fn validate(&self) -> Result<(), IndexClientError> {
        Url::parse(&self.endpoint)
            .map_err(|e| IndexClientError::validation(format!("Invalid endpoint: {}", e)))?;

        if self.alias.trim().is_empty() {
            return Err(IndexClientError::validation("alias is required"));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(IndexClientError::validation(
                "username and password must be provided together",
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(IndexClientError::validation(
                "request_timeout must be non-zero",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SearchIndexConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = SearchIndexConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_alias() {
        let config = SearchIndexConfig {
            alias: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_partial_credentials() {
        let config = SearchIndexConfig {
            username: Some("admin".to_string()),
            password: None,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
