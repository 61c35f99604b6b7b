//! Service-defined dialogue vocabulary.
//!
//! Terminal step ids, completion markers and trigger phrases are observed from
//! the diagnostic service's traffic. They are data, loaded from configuration,
//! so they can be corrected without touching the dialogue logic.

use super::{Message, StepId};

/// A set of substrings that must all appear for the group to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerGroup(Vec<String>);

impl MarkerGroup {
    /// Separator used in the textual form, e.g. `LIKELY CONDITION+ACTION STEPS`.
    pub const SEPARATOR: char = '+';

    /// Creates a group from its markers. Blank markers are dropped.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.trim().is_empty())
                .collect(),
        )
    }

    /// Parses the `A+B` textual form.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split(Self::SEPARATOR).map(str::trim))
    }

    /// Returns true if every marker occurs in `content`. Empty groups never match.
    pub fn matches(&self, content: &str) -> bool {
        !self.0.is_empty() && self.0.iter().all(|m| content.contains(m.as_str()))
    }

    pub fn markers(&self) -> &[String] {
        &self.0
    }
}

/// Display hints for one assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHints {
    /// The service rejected the patient's answer as off-topic.
    pub invalid_feedback: bool,
    /// The service asked for the rest of a partially answered question.
    pub partial_answer: bool,
    /// The service announced an analysis the patient may need to nudge.
    pub needs_continuation: bool,
}

impl MessageHints {
    /// Returns true if the "continue anyway" action should be offered.
    pub fn offers_continue_anyway(&self) -> bool {
        self.invalid_feedback || self.partial_answer
    }
}

/// All service-defined strings the dialogue logic matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueVocabulary {
    pub initial_step: StepId,
    pub terminal_steps: Vec<StepId>,
    pub completion_markers: Vec<MarkerGroup>,
    pub continuation_phrases: Vec<String>,
    pub invalid_feedback_phrases: Vec<String>,
    pub partial_answer_phrases: Vec<String>,
    pub needs_continuation_phrases: Vec<String>,
    /// Exchanges before invalid-feedback and partial-answer hints apply.
    pub hint_after_exchanges: u32,
}

impl DialogueVocabulary {
    /// Returns true if `step` is one of the terminal steps.
    pub fn is_terminal_step(&self, step: &StepId) -> bool {
        self.terminal_steps.iter().any(|t| t == step)
    }

    /// Returns true if `content` matches any completion marker group.
    pub fn has_completion_marker(&self, content: &str) -> bool {
        self.completion_markers.iter().any(|g| g.matches(content))
    }

    /// Returns true if `content` contains an auto-continuation phrase.
    pub fn has_continuation_phrase(&self, content: &str) -> bool {
        contains_any(content, &self.continuation_phrases)
    }

    /// Computes display hints for a message given the current exchange count.
    pub fn hints_for(&self, message: &Message, exchange_count: u32) -> MessageHints {
        if !message.is_assistant() {
            return MessageHints::default();
        }
        let content = message.content();
        let settled = exchange_count >= self.hint_after_exchanges;
        MessageHints {
            invalid_feedback: settled && contains_any(content, &self.invalid_feedback_phrases),
            partial_answer: settled && contains_any(content, &self.partial_answer_phrases),
            needs_continuation: contains_any(content, &self.needs_continuation_phrases),
        }
    }
}

impl Default for DialogueVocabulary {
    fn default() -> Self {
        let steps = |ids: &[&str]| {
            ids.iter()
                .filter_map(|id| StepId::new(*id).ok())
                .collect::<Vec<_>>()
        };
        let phrases = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            initial_step: StepId::start(),
            terminal_steps: steps(&["end", "criticality", "criticality_node"]),
            completion_markers: vec![
                MarkerGroup::parse("URGENCY LEVEL"),
                MarkerGroup::parse("PRECAUTIONS"),
                MarkerGroup::parse("TIMEFRAME"),
                MarkerGroup::parse("LIKELY CONDITION+ACTION STEPS"),
            ],
            continuation_phrases: phrases(&[
                "I'll now analyze your symptoms",
                "analyze all your symptoms and provide a preliminary diagnosis",
                "Thank you for sharing these additional symptoms",
            ]),
            invalid_feedback_phrases: phrases(&["doesn't seem to address my question"]),
            partial_answer_phrases: phrases(&[
                "Could you please also tell me about",
                "You mentioned seeing a doctor",
                "also share what diagnosis",
            ]),
            needs_continuation_phrases: phrases(&[
                "I'll now analyze your symptoms",
                "provide a preliminary diagnosis",
            ]),
            hint_after_exchanges: 3,
        }
    }
}

fn contains_any(content: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| content.contains(p.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod marker_group {
        use super::*;

        #[test]
        fn parse_splits_on_plus() {
            let group = MarkerGroup::parse("LIKELY CONDITION + ACTION STEPS");
            assert_eq!(group.markers(), &["LIKELY CONDITION", "ACTION STEPS"]);
        }

        #[test]
        fn requires_all_markers() {
            let group = MarkerGroup::parse("LIKELY CONDITION+ACTION STEPS");
            assert!(!group.matches("LIKELY CONDITION: flu"));
            assert!(group.matches("LIKELY CONDITION: flu\nACTION STEPS: rest"));
        }

        #[test]
        fn empty_group_never_matches() {
            assert!(!MarkerGroup::parse(" + ").matches("anything"));
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn terminal_steps() {
            let vocab = DialogueVocabulary::default();
            for id in ["end", "criticality", "criticality_node"] {
                assert!(vocab.is_terminal_step(&StepId::new(id).unwrap()));
            }
            assert!(!vocab.is_terminal_step(&StepId::new("diagnosis").unwrap()));
        }

        #[test]
        fn single_markers_are_enough() {
            let vocab = DialogueVocabulary::default();
            assert!(vocab.has_completion_marker("URGENCY LEVEL: moderate"));
            assert!(vocab.has_completion_marker("Take these PRECAUTIONS"));
            assert!(vocab.has_completion_marker("TIMEFRAME: 2 days"));
            assert!(!vocab.has_completion_marker("LIKELY CONDITION: flu"));
        }

        #[test]
        fn continuation_phrases() {
            let vocab = DialogueVocabulary::default();
            assert!(vocab.has_continuation_phrase(
                "Thanks. I'll now analyze your symptoms and get back to you."
            ));
            assert!(!vocab.has_continuation_phrase("How long have you had the fever?"));
        }
    }

    mod hints {
        use super::*;

        #[test]
        fn invalid_feedback_only_after_threshold() {
            let vocab = DialogueVocabulary::default();
            let msg = Message::assistant("That doesn't seem to address my question.");
            assert!(!vocab.hints_for(&msg, 2).invalid_feedback);
            assert!(vocab.hints_for(&msg, 3).invalid_feedback);
            assert!(vocab.hints_for(&msg, 3).offers_continue_anyway());
        }

        #[test]
        fn partial_answer_only_after_threshold() {
            let vocab = DialogueVocabulary::default();
            let msg = Message::assistant("You mentioned seeing a doctor. What did they say?");
            assert!(!vocab.hints_for(&msg, 0).partial_answer);
            assert!(vocab.hints_for(&msg, 4).partial_answer);
        }

        #[test]
        fn needs_continuation_ignores_threshold() {
            let vocab = DialogueVocabulary::default();
            let msg = Message::assistant("Next I will provide a preliminary diagnosis.");
            assert!(vocab.hints_for(&msg, 0).needs_continuation);
        }

        #[test]
        fn user_messages_have_no_hints() {
            let vocab = DialogueVocabulary::default();
            let msg = Message::user("doesn't seem to address my question");
            assert_eq!(vocab.hints_for(&msg, 10), MessageHints::default());
        }
    }
}
