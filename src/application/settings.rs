//! Tunables of the conversation controller.

use std::time::Duration;

use crate::domain::conversation::{DialogueVocabulary, ExchangeCeiling};
use crate::domain::history::HistoryDeduplicator;
use crate::domain::summary::SummaryParser;

/// First message of every lifetime.
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Hello! I am your medical assistant. How can I help you today?";

/// Everything the controller needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub vocabulary: DialogueVocabulary,
    pub exchange_ceiling: ExchangeCeiling,
    /// Continuations before this many exchanges ask the service to drop context.
    pub early_stage_exchanges: u32,
    pub auto_continue_delay: Duration,
    /// Delay before a recovery diagnosis fires.
    pub fallback_delay: Duration,
    pub welcome_message: String,
    pub parser: SummaryParser,
    pub deduplicator: HistoryDeduplicator,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            vocabulary: DialogueVocabulary::default(),
            exchange_ceiling: ExchangeCeiling::default(),
            early_stage_exchanges: 3,
            auto_continue_delay: Duration::from_millis(1500),
            fallback_delay: Duration::from_millis(1500),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            parser: SummaryParser::default(),
            deduplicator: HistoryDeduplicator::default(),
        }
    }
}

impl ControllerSettings {
    /// Removes every scheduling delay. Useful in tests and scripted runs.
    pub fn without_delays(mut self) -> Self {
        self.auto_continue_delay = Duration::ZERO;
        self.fallback_delay = Duration::ZERO;
        self
    }
}
