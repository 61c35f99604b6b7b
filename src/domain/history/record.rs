//! History record entity.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::Message;
use crate::domain::foundation::{HistoryRecordId, Timestamp};
use crate::domain::summary::SummaryParser;

/// Title of summaries produced by the summary action.
pub const DOCTOR_SUMMARY_TITLE: &str = "Doctor Summary";

/// Title of diagnoses stored after a forced diagnosis.
pub const MEDICAL_RECOMMENDATION_TITLE: &str = "Medical Recommendation";

const TITLE_CHARS: usize = 20;
const PREVIEW_CHARS: usize = 50;

static MARKUP_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"<[^>]*>").ok());

/// What a history record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// One user/assistant exchange.
    #[default]
    Conversation,
    /// A generated diagnosis or case summary.
    Summary,
}

/// A saved exchange or summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: HistoryRecordId,
    pub title: String,
    pub kind: RecordKind,
    pub messages: Vec<Message>,
    pub timestamp: Timestamp,
}

impl HistoryRecord {
    /// Record of a single completed exchange, titled after the user's text.
    pub fn conversation(
        id: HistoryRecordId,
        timestamp: Timestamp,
        user_text: &str,
        reply: &str,
    ) -> Self {
        Self {
            id,
            title: truncate(user_text, TITLE_CHARS),
            kind: RecordKind::Conversation,
            messages: vec![Message::user(user_text), Message::assistant(reply)],
            timestamp,
        }
    }

    /// Summary record holding one assistant message.
    pub fn summary(
        id: HistoryRecordId,
        timestamp: Timestamp,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            kind: RecordKind::Summary,
            messages: vec![Message::assistant(content)],
            timestamp,
        }
    }

    pub fn is_summary(&self) -> bool {
        self.kind == RecordKind::Summary
    }

    /// Summary kind, or a conversation carrying one of the summary titles.
    pub fn is_summary_like(&self) -> bool {
        self.is_summary()
            || self.title == DOCTOR_SUMMARY_TITLE
            || self.title == MEDICAL_RECOMMENDATION_TITLE
    }

    /// Plain-text preview of the last message, at most 50 characters.
    pub fn preview(&self) -> String {
        let content = self.messages.last().map(Message::content).unwrap_or_default();
        let text = if SummaryParser::is_preformatted(content) {
            strip_markup(content)
        } else {
            content.to_string()
        };
        truncate(&text, PREVIEW_CHARS)
    }

    /// Header line shown above a record being viewed.
    pub fn view_header(&self) -> String {
        format!("{} from {}:", self.title, self.timestamp.date_label())
    }
}

/// Cuts `text` to `max` characters, appending `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

/// Removes tags and decodes the basic entities.
pub fn strip_markup(html: &str) -> String {
    let text = match MARKUP_TAG.as_ref() {
        Some(regex) => regex.replace_all(html, "").into_owned(),
        None => html.to_string(),
    };
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(ms: i64) -> HistoryRecordId {
        HistoryRecordId::from_millis(ms)
    }

    fn ts(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms).unwrap()
    }

    #[test]
    fn conversation_title_is_truncated_to_twenty_chars() {
        let record = HistoryRecord::conversation(
            id(1),
            ts(1),
            "I have had a headache for days",
            "How severe is it?",
        );
        assert_eq!(record.title, "I have had a headach...");
        assert_eq!(record.messages.len(), 2);
        assert_eq!(record.kind, RecordKind::Conversation);
    }

    #[test]
    fn short_title_is_kept() {
        let record = HistoryRecord::conversation(id(1), ts(1), "Fever", "Since when?");
        assert_eq!(record.title, "Fever");
    }

    #[test]
    fn preview_strips_markup() {
        let record = HistoryRecord::summary(
            id(1),
            ts(1),
            DOCTOR_SUMMARY_TITLE,
            "<div class=\"diagnosis-card\"><h3>MEDICAL CASE SUMMARY</h3><p>BP &lt; 120</p></div>",
        );
        assert_eq!(record.preview(), "MEDICAL CASE SUMMARYBP < 120");
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "a".repeat(60);
        let record = HistoryRecord::summary(id(1), ts(1), MEDICAL_RECOMMENDATION_TITLE, long);
        assert_eq!(record.preview(), format!("{}...", "a".repeat(50)));
    }

    #[test]
    fn view_header_uses_date() {
        let record = HistoryRecord::summary(id(1), ts(1_705_314_600_000), DOCTOR_SUMMARY_TITLE, "x");
        assert_eq!(record.view_header(), "Doctor Summary from 2024-01-15:");
    }

    #[test]
    fn summary_titles_make_conversations_summary_like() {
        let mut record = HistoryRecord::conversation(id(1), ts(1), "hi", "hello");
        assert!(!record.is_summary_like());
        record.title = DOCTOR_SUMMARY_TITLE.to_string();
        assert!(record.is_summary_like());
        assert!(!record.is_summary());
    }
}
