//! Diagnostic service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::http::{HttpApiConfig, DEFAULT_MALFORMED_REPLY_MARKER};

/// Remote diagnostic service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Detail substrings identifying the service's known reply defect
    #[serde(default = "default_malformed_reply_markers")]
    pub malformed_reply_markers: Vec<String>,
}

impl ApiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the HTTP adapter configuration
    pub fn http_config(&self) -> HttpApiConfig {
        HttpApiConfig::new(self.base_url.clone())
            .with_timeout(self.timeout())
            .with_malformed_reply_markers(self.malformed_reply_markers.clone())
    }

    /// Validate service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("API__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            malformed_reply_markers: default_malformed_reply_markers(),
        }
    }
}

fn default_base_url() -> String {
    "https://medbot-bknd.onrender.com".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_malformed_reply_markers() -> Vec<String> {
    vec![DEFAULT_MALFORMED_REPLY_MARKER.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_empty_url() {
        let config = ApiConfig {
            base_url: " ".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("API__BASE_URL"))
        );
    }

    #[test]
    fn rejects_non_http_url() {
        let config = ApiConfig {
            base_url: "ftp://medbot".to_string(),
            ..ApiConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBaseUrl));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ApiConfig {
            timeout_secs: 0,
            ..ApiConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTimeout));
    }

    #[test]
    fn http_config_carries_markers() {
        let config = ApiConfig {
            malformed_reply_markers: vec!["boom".to_string()],
            ..ApiConfig::default()
        };
        assert_eq!(config.http_config().malformed_reply_markers, vec!["boom"]);
    }
}
