//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `MEDBOT` prefix and
//! nested values are separated by double underscores. Every value has a
//! default, so an empty environment yields a working configuration.
//!
//! # Example
//!
//! ```no_run
//! use medbot_client::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Talking to {}", config.api.base_url);
//! ```

mod api;
mod dialogue;
mod error;
mod history;
mod logging;
mod session;

pub use api::ApiConfig;
pub use dialogue::DialogueConfig;
pub use error::{ConfigError, ValidationError};
pub use history::HistoryConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use session::SessionConfig;

use serde::Deserialize;

use crate::application::ControllerSettings;
use crate::domain::summary::SummaryParser;

/// Keys whose values are `|`-separated lists.
const LIST_KEYS: [&str; 4] = [
    "dialogue.terminal_steps",
    "dialogue.completion_markers",
    "dialogue.continuation_phrases",
    "api.malformed_reply_markers",
];

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Diagnostic service endpoint and failure classification
    #[serde(default)]
    pub api: ApiConfig,

    /// Step ids, trigger phrases and pacing of the dialogue
    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// History deduplication
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the logged-in session is persisted
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present
    /// 2. Reads environment variables with `MEDBOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits list values on `|`
    ///
    /// # Environment Variable Format
    ///
    /// - `MEDBOT__API__BASE_URL=http://localhost:8000` -> `api.base_url`
    /// - `MEDBOT__DIALOGUE__TERMINAL_STEPS=end|criticality` -> `dialogue.terminal_steps`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = LIST_KEYS.iter().fold(
            config::Environment::default()
                .prefix("MEDBOT")
                .separator("__")
                .list_separator("|")
                .try_parsing(true),
            |env, key| env.with_list_parse_key(key),
        );

        let config = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.dialogue.validate()?;
        self.history.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Controller tunables derived from the dialogue and history sections.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            vocabulary: self.dialogue.vocabulary(),
            exchange_ceiling: self.dialogue.exchange_ceiling(),
            early_stage_exchanges: self.dialogue.early_stage_exchanges,
            auto_continue_delay: self.dialogue.auto_continue_delay(),
            fallback_delay: self.dialogue.fallback_delay(),
            welcome_message: self.dialogue.welcome_message.clone(),
            parser: SummaryParser::default(),
            deduplicator: self.history.deduplicator(),
        }
    }
}
