//! Consultation completion detection.
//!
//! Two independent signals decide whether a consultation is finished: the
//! step the service reports, and terminal markers in the transcript text. The
//! service's step id is not always reliable, so either one is sufficient.

use super::{DialogueVocabulary, Message, StepId};

/// Pure completion predicates over a vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct CompletionDetector<'a> {
    vocabulary: &'a DialogueVocabulary,
}

impl<'a> CompletionDetector<'a> {
    pub fn new(vocabulary: &'a DialogueVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Returns true if the reported step is terminal.
    pub fn step_is_terminal(&self, step: &StepId) -> bool {
        self.vocabulary.is_terminal_step(step)
    }

    /// Returns true if any message carries a terminal textual marker.
    pub fn transcript_has_terminal_markers<'m, I>(&self, messages: I) -> bool
    where
        I: IntoIterator<Item = &'m Message>,
    {
        messages
            .into_iter()
            .any(|m| self.vocabulary.has_completion_marker(m.content()))
    }

    /// Returns true if either signal reports completion.
    pub fn is_complete<'m, I>(&self, step: &StepId, messages: I) -> bool
    where
        I: IntoIterator<Item = &'m Message>,
    {
        self.step_is_terminal(step) || self.transcript_has_terminal_markers(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str) -> StepId {
        StepId::new(id).unwrap()
    }

    fn plain_transcript() -> Vec<Message> {
        vec![
            Message::assistant("Hello! How can I help?"),
            Message::user("I have a headache"),
            Message::assistant("How long has it lasted?"),
        ]
    }

    mod step_signal {
        use super::*;

        #[test]
        fn terminal_step_alone_completes() {
            let vocab = DialogueVocabulary::default();
            let detector = CompletionDetector::new(&vocab);
            assert!(detector.step_is_terminal(&step("criticality_node")));
            assert!(detector.is_complete(&step("end"), &plain_transcript()));
        }

        #[test]
        fn non_terminal_step_does_not() {
            let vocab = DialogueVocabulary::default();
            let detector = CompletionDetector::new(&vocab);
            assert!(!detector.step_is_terminal(&step("symptoms")));
        }
    }

    mod text_signal {
        use super::*;

        #[test]
        fn marker_alone_completes() {
            let vocab = DialogueVocabulary::default();
            let detector = CompletionDetector::new(&vocab);
            let mut messages = plain_transcript();
            messages.push(Message::assistant("URGENCY LEVEL: low"));

            assert!(detector.transcript_has_terminal_markers(&messages));
            assert!(detector.is_complete(&step("symptoms"), &messages));
        }

        #[test]
        fn paired_markers_must_co_occur_in_one_message() {
            let vocab = DialogueVocabulary::default();
            let detector = CompletionDetector::new(&vocab);
            let messages = vec![
                Message::assistant("LIKELY CONDITION: migraine"),
                Message::assistant("ACTION STEPS: rest"),
            ];
            assert!(!detector.transcript_has_terminal_markers(&messages));

            let messages = vec![Message::assistant("LIKELY CONDITION: migraine\nACTION STEPS: rest")];
            assert!(detector.transcript_has_terminal_markers(&messages));
        }
    }

    #[test]
    fn neither_signal_means_incomplete() {
        let vocab = DialogueVocabulary::default();
        let detector = CompletionDetector::new(&vocab);
        assert!(!detector.is_complete(&step("symptoms"), &plain_transcript()));
    }
}
