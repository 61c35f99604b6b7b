//! Dialogue vocabulary and pacing configuration
//!
//! Step ids and trigger phrases are defined by the remote service and only
//! observed from traffic, so they live here rather than in code.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::DEFAULT_WELCOME_MESSAGE;
use crate::domain::conversation::{DialogueVocabulary, ExchangeCeiling, MarkerGroup, StepId};

/// Dialogue configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Step the service reports before the first exchange
    #[serde(default = "default_initial_step")]
    pub initial_step: String,

    /// Steps after which no further input is expected
    #[serde(default = "default_terminal_steps")]
    pub terminal_steps: Vec<String>,

    /// Text markers that signal completion; `A+B` requires both
    #[serde(default = "default_completion_markers")]
    pub completion_markers: Vec<String>,

    /// Phrases announcing an analysis, answered with an auto-continuation
    #[serde(default = "default_continuation_phrases")]
    pub continuation_phrases: Vec<String>,

    /// Exchanges after which a diagnosis is forced
    #[serde(default = "default_exchange_ceiling")]
    pub exchange_ceiling: u32,

    /// Continuations before this many exchanges drop service context
    #[serde(default = "default_early_stage_exchanges")]
    pub early_stage_exchanges: u32,

    #[serde(default = "default_delay_ms")]
    pub auto_continue_delay_ms: u64,

    #[serde(default = "default_delay_ms")]
    pub fallback_delay_ms: u64,

    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl DialogueConfig {
    pub fn auto_continue_delay(&self) -> Duration {
        Duration::from_millis(self.auto_continue_delay_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn exchange_ceiling(&self) -> ExchangeCeiling {
        ExchangeCeiling::new(self.exchange_ceiling)
    }

    /// Builds the domain vocabulary. Phrases not configured here keep their
    /// built-in values.
    pub fn vocabulary(&self) -> DialogueVocabulary {
        DialogueVocabulary {
            initial_step: StepId::new(self.initial_step.as_str()).unwrap_or_default(),
            terminal_steps: self
                .terminal_steps
                .iter()
                .filter_map(|s| StepId::new(s.as_str()).ok())
                .collect(),
            completion_markers: self
                .completion_markers
                .iter()
                .map(|m| MarkerGroup::parse(m))
                .collect(),
            continuation_phrases: self.continuation_phrases.clone(),
            ..DialogueVocabulary::default()
        }
    }

    /// Validate dialogue configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.exchange_ceiling == 0 {
            return Err(ValidationError::InvalidExchangeCeiling);
        }
        if self.terminal_steps.is_empty() {
            return Err(ValidationError::NoTerminalSteps);
        }
        if self.initial_step.trim().is_empty()
            || self.terminal_steps.iter().any(|s| s.trim().is_empty())
        {
            return Err(ValidationError::BlankStepId);
        }
        Ok(())
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            initial_step: default_initial_step(),
            terminal_steps: default_terminal_steps(),
            completion_markers: default_completion_markers(),
            continuation_phrases: default_continuation_phrases(),
            exchange_ceiling: default_exchange_ceiling(),
            early_stage_exchanges: default_early_stage_exchanges(),
            auto_continue_delay_ms: default_delay_ms(),
            fallback_delay_ms: default_delay_ms(),
            welcome_message: default_welcome_message(),
        }
    }
}

fn default_initial_step() -> String {
    StepId::START.to_string()
}

fn default_terminal_steps() -> Vec<String> {
    DialogueVocabulary::default()
        .terminal_steps
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_completion_markers() -> Vec<String> {
    DialogueVocabulary::default()
        .completion_markers
        .iter()
        .map(|group| group.markers().join("+"))
        .collect()
}

fn default_continuation_phrases() -> Vec<String> {
    DialogueVocabulary::default().continuation_phrases
}

fn default_exchange_ceiling() -> u32 {
    ExchangeCeiling::DEFAULT_LIMIT
}

fn default_early_stage_exchanges() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}
