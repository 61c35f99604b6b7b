//! Message entity and the visible transcript.
//!
//! Messages are the user/assistant turns shown to the patient. Each assistant
//! message is classified once, at construction, into a [`MessageKind`] so the
//! display layer never has to sniff raw strings to pick a rendering.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::MessageId;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Patient input.
    User,
    /// Reply from the diagnostic service, or a locally generated notice.
    Assistant,
}

/// One `##`-headed section of a plain-text diagnosis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisSection {
    pub heading: String,
    pub body: String,
}

/// How a message should be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageKind {
    /// Render the content as-is.
    #[default]
    PlainText,
    /// Plain-text diagnosis split into headed sections.
    DiagnosisBlock(Vec<DiagnosisSection>),
    /// Content is already a document fragment (markup).
    DocumentFragment,
}

impl MessageKind {
    /// Classifies message content.
    ///
    /// User messages are always plain text. Markup wins over the diagnosis
    /// heuristic, so a formatted summary that mentions a likely condition is
    /// still treated as a fragment.
    pub fn classify(role: Role, content: &str) -> Self {
        if role == Role::User {
            return MessageKind::PlainText;
        }
        if content.contains("<div class=") || content.contains("</div>") {
            return MessageKind::DocumentFragment;
        }
        if content.contains("LIKELY CONDITION") {
            return MessageKind::DiagnosisBlock(split_diagnosis(content));
        }
        MessageKind::PlainText
    }

    /// Returns true for pre-rendered markup.
    pub fn is_fragment(&self) -> bool {
        matches!(self, MessageKind::DocumentFragment)
    }
}

fn split_diagnosis(content: &str) -> Vec<DiagnosisSection> {
    // Text before the first `##` is not part of any section.
    content
        .split("##")
        .skip(1)
        .map(|section| {
            let mut lines = section.split('\n');
            let heading = lines.next().unwrap_or_default().trim().to_string();
            let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
            DiagnosisSection { heading, body }
        })
        .collect()
}

/// A single transcript entry.
///
/// # Invariants
///
/// - `kind` is derived from `role` and `content` at construction and never
///   recomputed
/// - only `role` and `content` cross the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireMessage")]
pub struct Message {
    #[serde(skip_serializing)]
    id: MessageId,
    role: Role,
    content: String,
    #[serde(skip_serializing)]
    transient: bool,
    #[serde(skip_serializing)]
    kind: MessageKind,
}

#[derive(Deserialize)]
struct WireMessage {
    role: Role,
    content: String,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::new(wire.role, wire.content)
    }
}

impl Message {
    /// Creates a message, classifying its content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let kind = MessageKind::classify(role, &content);
        Self {
            id: MessageId::new(),
            role,
            content,
            transient: false,
            kind,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a transient assistant placeholder ("thinking...").
    pub fn placeholder(content: impl Into<String>) -> Self {
        Self {
            transient: true,
            ..Self::assistant(content)
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Returns true if this is an assistant message.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered list of visible messages.
///
/// # Invariants
///
/// - at most one transient message exists
/// - a transient message, if present, is the last entry
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a permanent message, dropping any pending placeholder first.
    pub fn push(&mut self, message: Message) {
        self.clear_transient();
        self.messages.push(Message {
            transient: false,
            ..message
        });
    }

    /// Shows a placeholder, replacing any previous one.
    pub fn push_transient(&mut self, content: impl Into<String>) {
        self.clear_transient();
        self.messages.push(Message::placeholder(content));
    }

    /// Removes the pending placeholder, if any.
    pub fn clear_transient(&mut self) {
        if self.has_transient() {
            self.messages.pop();
        }
    }

    /// Returns true while a placeholder is shown.
    pub fn has_transient(&self) -> bool {
        self.messages.last().map_or(false, Message::is_transient)
    }

    /// Replaces the whole transcript with the given messages.
    pub fn replace(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.clear();
        for message in messages {
            self.push(message);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod classification {
        use super::*;

        #[test]
        fn markup_is_a_document_fragment() {
            let msg = Message::assistant("<div class=\"diagnosis-card\">x</div>");
            assert_eq!(msg.kind(), &MessageKind::DocumentFragment);
        }

        #[test]
        fn closing_div_alone_is_a_fragment() {
            let msg = Message::assistant("text</div>");
            assert!(msg.kind().is_fragment());
        }

        #[test]
        fn likely_condition_is_split_into_sections() {
            let msg = Message::assistant(
                "Here is my view.\n## LIKELY CONDITION\nFlu\n## ACTION STEPS\nRest\nDrink water",
            );
            match msg.kind() {
                MessageKind::DiagnosisBlock(sections) => {
                    assert_eq!(sections.len(), 2);
                    assert_eq!(sections[0].heading, "LIKELY CONDITION");
                    assert_eq!(sections[0].body, "Flu");
                    assert_eq!(sections[1].body, "Rest\nDrink water");
                }
                other => panic!("expected diagnosis block, got {:?}", other),
            }
        }

        #[test]
        fn markup_wins_over_diagnosis() {
            let msg = Message::assistant("<div class=\"x\">LIKELY CONDITION</div>");
            assert!(msg.kind().is_fragment());
        }

        #[test]
        fn user_messages_are_plain() {
            let msg = Message::user("</div> LIKELY CONDITION");
            assert_eq!(msg.kind(), &MessageKind::PlainText);
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn only_role_and_content_are_serialized() {
            let json = serde_json::to_value(Message::placeholder("...")).unwrap();
            assert_eq!(json, serde_json::json!({"role": "assistant", "content": "..."}));
        }

        #[test]
        fn deserialized_messages_are_classified() {
            let msg: Message =
                serde_json::from_str(r#"{"role":"assistant","content":"<div class=\"a\"></div>"}"#)
                    .unwrap();
            assert!(msg.kind().is_fragment());
            assert!(!msg.is_transient());
        }
    }

    mod transcript {
        use super::*;

        #[test]
        fn push_removes_pending_placeholder() {
            let mut transcript = Transcript::new();
            transcript.push(Message::user("hi"));
            transcript.push_transient("...");
            assert!(transcript.has_transient());

            transcript.push(Message::assistant("hello"));
            assert_eq!(transcript.len(), 2);
            assert!(!transcript.has_transient());
        }

        #[test]
        fn at_most_one_placeholder() {
            let mut transcript = Transcript::new();
            transcript.push_transient("...");
            transcript.push_transient("Generating...");
            assert_eq!(transcript.len(), 1);
            assert_eq!(transcript.last().unwrap().content(), "Generating...");
        }

        #[test]
        fn clear_transient_keeps_permanent_messages() {
            let mut transcript = Transcript::new();
            transcript.push(Message::user("hi"));
            transcript.clear_transient();
            assert_eq!(transcript.len(), 1);
        }

        #[test]
        fn pushed_placeholders_become_permanent() {
            let mut transcript = Transcript::new();
            transcript.push(Message::placeholder("x"));
            assert!(!transcript.has_transient());
        }

        #[test]
        fn replace_resets_content() {
            let mut transcript = Transcript::new();
            transcript.push(Message::user("old"));
            transcript.replace(vec![Message::assistant("welcome")]);
            assert_eq!(transcript.len(), 1);
            assert_eq!(transcript.messages()[0].content(), "welcome");
        }
    }
}
