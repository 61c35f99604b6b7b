//! Wire shapes of the diagnostic service's JSON API.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Message, StepId};
use crate::domain::foundation::{HistoryRecordId, Timestamp};
use crate::domain::history::{HistoryRecord, RecordKind};
use crate::ports::{ApiError, ChatHints, ForceDiagnosisOptions, ServiceReply, SummaryReply};

fn is_false(value: &bool) -> bool {
    !*value
}

/// Body of `POST /chat`.
///
/// Submissions carry the three first-exchange hints; continuations carry only
/// `preserve_context`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub user_id: &'a str,
    pub response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_conversation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_context: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_previous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_context: Option<bool>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(user_id: &'a str, response: &'a str, hints: ChatHints) -> Self {
        match hints.preserve_context {
            Some(preserve) => Self {
                user_id,
                response,
                new_conversation: None,
                reset_context: None,
                ignore_previous: None,
                preserve_context: Some(preserve),
            },
            None => Self {
                user_id,
                response,
                new_conversation: Some(hints.new_conversation),
                reset_context: Some(hints.reset_context),
                ignore_previous: Some(hints.ignore_previous),
                preserve_context: None,
            },
        }
    }
}

/// Body of `POST /force_diagnosis`.
#[derive(Debug, Serialize)]
pub(crate) struct ForceDiagnosisRequest<'a> {
    pub user_id: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    pub fallback: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub reset: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub complete_reset: bool,
}

impl<'a> ForceDiagnosisRequest<'a> {
    pub fn new(user_id: &'a str, options: ForceDiagnosisOptions) -> Self {
        Self {
            user_id,
            fallback: options.fallback,
            reset: options.reset,
            complete_reset: options.complete_reset,
        }
    }
}

/// Body of `POST /generate_summary`.
#[derive(Debug, Serialize)]
pub(crate) struct UserRequest<'a> {
    pub user_id: &'a str,
}

/// Body of `POST /save_chat_history`.
#[derive(Debug, Serialize)]
pub(crate) struct SaveHistoryRequest<'a> {
    pub user_id: &'a str,
    pub history_entry: HistoryEntryDto,
}

/// Reply of `/chat` and `/force_diagnosis`.
#[derive(Debug, Deserialize)]
pub(crate) struct DialogueReplyDto {
    #[serde(default)]
    pub next_question: Option<String>,
    #[serde(default)]
    pub current_step: Option<String>,
}

impl DialogueReplyDto {
    pub fn into_reply(self) -> Result<ServiceReply, ApiError> {
        let next_prompt = self
            .next_question
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ApiError::missing_field("next_question"))?;
        // A blank or absent step leaves the local step unchanged.
        let step = self.current_step.and_then(|s| StepId::new(s).ok());
        Ok(ServiceReply::new(next_prompt, step))
    }
}

/// Reply of `/generate_summary`.
#[derive(Debug, Deserialize)]
pub(crate) struct SummaryReplyDto {
    #[serde(default)]
    pub summary: Option<String>,
}

impl SummaryReplyDto {
    pub fn into_reply(self) -> Result<SummaryReply, ApiError> {
        self.summary
            .filter(|text| !text.trim().is_empty())
            .map(|summary_text| SummaryReply { summary_text })
            .ok_or_else(|| ApiError::missing_field("summary"))
    }
}

/// Reply of `/chat_history/{user_id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryListDto {
    #[serde(default)]
    pub chat_history: Option<Vec<HistoryEntryDto>>,
}

/// Reply of `/view_summary/{user_id}/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryViewDto {
    #[serde(default)]
    pub summary: Option<HistoryEntryDto>,
}

/// Stored history entry as the service keeps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct HistoryEntryDto {
    pub id: HistoryRecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<&HistoryRecord> for HistoryEntryDto {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            kind: record.is_summary().then_some(RecordKind::Summary),
            messages: record.messages.clone(),
            timestamp: Some(record.timestamp.to_rfc3339()),
        }
    }
}

impl From<HistoryEntryDto> for HistoryRecord {
    fn from(dto: HistoryEntryDto) -> Self {
        // Older entries carry no timestamp; their id is the creation time.
        let timestamp = dto
            .timestamp
            .as_deref()
            .and_then(Timestamp::parse_rfc3339)
            .or_else(|| dto.id.as_timestamp())
            .unwrap_or_default();
        HistoryRecord {
            id: dto.id,
            title: dto.title,
            kind: dto.kind.unwrap_or_default(),
            messages: dto.messages,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod requests {
        use super::*;

        #[test]
        fn submission_sends_the_three_hints() {
            let body = ChatRequest::new("u1", "fever", ChatHints::submission(true));
            assert_eq!(
                serde_json::to_value(&body).unwrap(),
                json!({
                    "user_id": "u1",
                    "response": "fever",
                    "new_conversation": true,
                    "reset_context": true,
                    "ignore_previous": true
                })
            );
        }

        #[test]
        fn continuation_sends_only_preserve_context() {
            let body = ChatRequest::new("u1", "continue", ChatHints::continuation(true));
            assert_eq!(
                serde_json::to_value(&body).unwrap(),
                json!({"user_id": "u1", "response": "continue", "preserve_context": true})
            );
        }

        #[test]
        fn reset_body() {
            let body = ForceDiagnosisRequest::new("u1", ForceDiagnosisOptions::reset());
            assert_eq!(
                serde_json::to_value(&body).unwrap(),
                json!({"user_id": "u1", "reset": true, "complete_reset": true})
            );
        }

        #[test]
        fn diagnosis_body() {
            let body = ForceDiagnosisRequest::new("u1", ForceDiagnosisOptions::diagnosis());
            assert_eq!(
                serde_json::to_value(&body).unwrap(),
                json!({"user_id": "u1", "fallback": true})
            );
        }
    }

    mod replies {
        use super::*;

        #[test]
        fn dialogue_reply_maps_step() {
            let dto: DialogueReplyDto = serde_json::from_value(
                json!({"next_question": "Any allergies?", "current_step": "medications"}),
            )
            .unwrap();
            let reply = dto.into_reply().unwrap();
            assert_eq!(reply.next_prompt, "Any allergies?");
            assert_eq!(reply.step.unwrap().as_str(), "medications");
        }

        #[test]
        fn missing_next_question_is_invalid_shape() {
            let dto: DialogueReplyDto =
                serde_json::from_value(json!({"current_step": "end"})).unwrap();
            assert_eq!(
                dto.into_reply().unwrap_err(),
                ApiError::missing_field("next_question")
            );
        }

        #[test]
        fn blank_step_is_absent() {
            let dto: DialogueReplyDto =
                serde_json::from_value(json!({"next_question": "Hi", "current_step": ""}))
                    .unwrap();
            assert!(dto.into_reply().unwrap().step.is_none());
        }

        #[test]
        fn missing_summary_is_invalid_shape() {
            let dto: SummaryReplyDto = serde_json::from_value(json!({})).unwrap();
            assert!(dto.into_reply().is_err());
        }
    }

    mod history {
        use super::*;

        #[test]
        fn entry_without_timestamp_uses_id() {
            let dto: HistoryEntryDto = serde_json::from_value(json!({
                "id": 1_705_314_600_000i64,
                "title": "Fever",
                "messages": [{"role": "user", "content": "Fever"}]
            }))
            .unwrap();
            let record = HistoryRecord::from(dto);
            assert_eq!(record.timestamp.as_millis(), 1_705_314_600_000);
            assert_eq!(record.kind, RecordKind::Conversation);
            assert_eq!(record.messages.len(), 1);
        }

        #[test]
        fn summary_entry_carries_type() {
            let record = HistoryRecord::summary(
                HistoryRecordId::from_millis(5),
                Timestamp::from_millis(5).unwrap(),
                "Doctor Summary",
                "text",
            );
            let value = serde_json::to_value(HistoryEntryDto::from(&record)).unwrap();
            assert_eq!(value["type"], "summary");
            assert_eq!(value["messages"][0]["role"], "assistant");
            assert_eq!(value["timestamp"], "1970-01-01T00:00:00.005Z");
        }

        #[test]
        fn conversation_entry_omits_type() {
            let record = HistoryRecord::conversation(
                HistoryRecordId::from_millis(5),
                Timestamp::from_millis(5).unwrap(),
                "hi",
                "hello",
            );
            let value = serde_json::to_value(HistoryEntryDto::from(&record)).unwrap();
            assert!(value.get("type").is_none());
        }
    }
}
