//! Auto-continuation and forced-diagnosis policies.

use super::{ConversationState, DialogueVocabulary, Message};
use crate::domain::foundation::MessageId;

/// Decides when to nudge the service forward without user input.
///
/// Fires at most once per assistant message, no matter how often the same
/// message is evaluated.
#[derive(Debug, Clone, Default)]
pub struct AutoContinuationTrigger {
    last_fired: Option<MessageId>,
}

impl AutoContinuationTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `content` announces an analysis.
    pub fn should_continue(vocabulary: &DialogueVocabulary, content: &str) -> bool {
        vocabulary.has_continuation_phrase(content)
    }

    /// Evaluates the latest message, remembering it if the trigger fires.
    pub fn evaluate(&mut self, vocabulary: &DialogueVocabulary, latest: &Message) -> bool {
        if !latest.is_assistant() || latest.is_transient() {
            return false;
        }
        if self.last_fired == Some(latest.id()) {
            return false;
        }
        if Self::should_continue(vocabulary, latest.content()) {
            self.last_fired = Some(latest.id());
            return true;
        }
        false
    }

    /// Forgets the last fired message (new lifetime).
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

/// Backstop forcing a diagnosis for dialogues that never reach a terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeCeiling {
    limit: u32,
}

impl ExchangeCeiling {
    pub const DEFAULT_LIMIT: u32 = 5;

    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns true once the ceiling is hit on an unfinished, non-initial dialogue.
    pub fn is_reached(&self, state: &ConversationState) -> bool {
        state.exchange_count() >= self.limit && !state.is_complete() && !state.is_at_initial_step()
    }
}

impl Default for ExchangeCeiling {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::StepId;

    mod trigger {
        use super::*;

        #[test]
        fn fires_once_per_message() {
            let vocab = DialogueVocabulary::default();
            let mut trigger = AutoContinuationTrigger::new();
            let msg = Message::assistant("I'll now analyze your symptoms.");

            assert!(trigger.evaluate(&vocab, &msg));
            assert!(!trigger.evaluate(&vocab, &msg));
        }

        #[test]
        fn fires_again_for_a_new_message() {
            let vocab = DialogueVocabulary::default();
            let mut trigger = AutoContinuationTrigger::new();
            assert!(trigger.evaluate(&vocab, &Message::assistant("I'll now analyze your symptoms.")));
            assert!(trigger.evaluate(
                &vocab,
                &Message::assistant("Thank you for sharing these additional symptoms.")
            ));
        }

        #[test]
        fn ignores_user_and_placeholder_messages() {
            let vocab = DialogueVocabulary::default();
            let mut trigger = AutoContinuationTrigger::new();
            assert!(!trigger.evaluate(&vocab, &Message::user("I'll now analyze your symptoms")));
            assert!(!trigger.evaluate(
                &vocab,
                &Message::placeholder("I'll now analyze your symptoms")
            ));
        }

        #[test]
        fn ordinary_questions_do_not_fire() {
            let vocab = DialogueVocabulary::default();
            let mut trigger = AutoContinuationTrigger::new();
            assert!(!trigger.evaluate(&vocab, &Message::assistant("Do you have a fever?")));
        }
    }

    mod ceiling {
        use super::*;

        fn state_with(exchanges: u32, step: &str) -> ConversationState {
            let mut state = ConversationState::default();
            for _ in 0..exchanges {
                state.record_exchange(Some(StepId::new(step).unwrap()));
            }
            state
        }

        #[test]
        fn reached_at_limit() {
            let ceiling = ExchangeCeiling::default();
            assert!(!ceiling.is_reached(&state_with(4, "symptoms")));
            assert!(ceiling.is_reached(&state_with(5, "symptoms")));
        }

        #[test]
        fn not_reached_at_initial_step() {
            assert!(!ExchangeCeiling::default().is_reached(&state_with(7, "start")));
        }

        #[test]
        fn not_reached_once_complete() {
            let mut state = state_with(6, "symptoms");
            state.mark_complete();
            assert!(!ExchangeCeiling::default().is_reached(&state));
        }
    }
}
