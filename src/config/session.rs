//! Session persistence configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Session configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// JSON file holding the logged-in session; in-memory when unset
    #[serde(default)]
    pub credential_file: Option<PathBuf>,
}
