//! History deduplication configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::history::{HistoryDeduplicator, DOCTOR_SUMMARY_TITLE};

/// History configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Summaries closer than this many seconds count as one episode
    #[serde(default = "default_window")]
    pub dedup_window_secs: i64,

    /// Title that wins when near-duplicate summaries collide
    #[serde(default = "default_preferred_title")]
    pub preferred_summary_title: String,
}

impl HistoryConfig {
    pub fn deduplicator(&self) -> HistoryDeduplicator {
        HistoryDeduplicator::new(
            chrono::Duration::seconds(self.dedup_window_secs),
            self.preferred_summary_title.clone(),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dedup_window_secs <= 0 {
            return Err(ValidationError::InvalidDedupWindow);
        }
        Ok(())
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: default_window(),
            preferred_summary_title: default_preferred_title(),
        }
    }
}

fn default_window() -> i64 {
    300
}

fn default_preferred_title() -> String {
    DOCTOR_SUMMARY_TITLE.to_string()
}
