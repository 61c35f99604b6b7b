//! Mock Diagnostic API for testing.
//!
//! Queue-driven implementation of the `DiagnosticApi` port. Each operation has
//! its own queue of results consumed in order; every call is recorded so tests
//! can assert what was sent.
//!
//! # Example
//!
//! ```ignore
//! let api = MockDiagnosticApi::new()
//!     .with_chat_reply("How long have you had the fever?", Some("symptoms"))
//!     .with_chat_error(ApiError::Unauthenticated);
//!
//! controller.submit("I have a fever").await;
//! assert_eq!(api.calls().len(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::conversation::{PatientProfile, StepId};
use crate::domain::foundation::{Credential, HistoryRecordId, SessionIdentity, UserId};
use crate::domain::history::HistoryRecord;
use crate::ports::{
    ApiError, ChatHints, DiagnosticApi, ForceDiagnosisOptions, ServiceReply, SummaryReply,
};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Chat {
        session: SessionIdentity,
        text: String,
        hints: ChatHints,
    },
    ForceDiagnosis {
        session: SessionIdentity,
        options: ForceDiagnosisOptions,
    },
    GenerateSummary {
        session: SessionIdentity,
    },
    FetchProfile {
        session: SessionIdentity,
    },
    SaveHistoryRecord {
        user: UserId,
        record: HistoryRecord,
    },
    FetchHistory {
        user: UserId,
    },
    ViewHistoryRecord {
        user: UserId,
        id: HistoryRecordId,
    },
}

impl RecordedCall {
    /// Returns true for the dialogue-driving calls (chat and forced diagnosis).
    pub fn is_dialogue(&self) -> bool {
        matches!(
            self,
            RecordedCall::Chat { .. } | RecordedCall::ForceDiagnosis { .. }
        )
    }
}

#[derive(Debug, Default)]
struct Queues {
    chat: VecDeque<Result<ServiceReply, ApiError>>,
    force_diagnosis: VecDeque<Result<ServiceReply, ApiError>>,
    summary: VecDeque<Result<SummaryReply, ApiError>>,
    profile: VecDeque<Result<PatientProfile, ApiError>>,
    save: VecDeque<Result<(), ApiError>>,
    history: VecDeque<Result<Vec<HistoryRecord>, ApiError>>,
    view: VecDeque<Result<HistoryRecord, ApiError>>,
}

/// Mock diagnostic service.
///
/// Unconfigured dialogue calls reply with a generic prompt; unconfigured
/// history and profile calls succeed with empty data.
#[derive(Debug, Clone, Default)]
pub struct MockDiagnosticApi {
    queues: Arc<Mutex<Queues>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

// A panicking test thread must not hide the recorded calls from the others.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn reply(text: &str, step: Option<&str>) -> ServiceReply {
    ServiceReply::new(text, step.and_then(|s| StepId::new(s).ok()))
}

impl MockDiagnosticApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful chat reply.
    pub fn with_chat_reply(self, text: &str, step: Option<&str>) -> Self {
        lock(&self.queues).chat.push_back(Ok(reply(text, step)));
        self
    }

    /// Queues a failing chat call.
    pub fn with_chat_error(self, error: ApiError) -> Self {
        lock(&self.queues).chat.push_back(Err(error));
        self
    }

    /// Queues a successful forced-diagnosis reply.
    pub fn with_diagnosis_reply(self, text: &str, step: Option<&str>) -> Self {
        lock(&self.queues)
            .force_diagnosis
            .push_back(Ok(reply(text, step)));
        self
    }

    /// Queues a failing forced-diagnosis call.
    pub fn with_diagnosis_error(self, error: ApiError) -> Self {
        lock(&self.queues).force_diagnosis.push_back(Err(error));
        self
    }

    /// Queues a summary result.
    pub fn with_summary(self, result: Result<&str, ApiError>) -> Self {
        let result = result.map(|text| SummaryReply {
            summary_text: text.to_string(),
        });
        lock(&self.queues).summary.push_back(result);
        self
    }

    /// Queues a profile result.
    pub fn with_profile(self, result: Result<PatientProfile, ApiError>) -> Self {
        lock(&self.queues).profile.push_back(result);
        self
    }

    /// Queues a history-save result.
    pub fn with_save_result(self, result: Result<(), ApiError>) -> Self {
        lock(&self.queues).save.push_back(result);
        self
    }

    /// Queues a history-list result.
    pub fn with_history(self, result: Result<Vec<HistoryRecord>, ApiError>) -> Self {
        lock(&self.queues).history.push_back(result);
        self
    }

    /// Queues a single-record result.
    pub fn with_view(self, result: Result<HistoryRecord, ApiError>) -> Self {
        lock(&self.queues).view.push_back(result);
        self
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Returns the number of chat and forced-diagnosis calls.
    pub fn dialogue_call_count(&self) -> usize {
        lock(&self.calls).iter().filter(|c| c.is_dialogue()).count()
    }

    /// Returns the recorded forced-diagnosis options, in order.
    pub fn force_diagnosis_calls(&self) -> Vec<ForceDiagnosisOptions> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                RecordedCall::ForceDiagnosis { options, .. } => Some(*options),
                _ => None,
            })
            .collect()
    }

    /// Returns the records passed to `save_history_record`, in order.
    pub fn saved_records(&self) -> Vec<HistoryRecord> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                RecordedCall::SaveHistoryRecord { record, .. } => Some(record.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn record(&self, call: RecordedCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl DiagnosticApi for MockDiagnosticApi {
    async fn chat(
        &self,
        _credential: &Credential,
        session: &SessionIdentity,
        text: &str,
        hints: ChatHints,
    ) -> Result<ServiceReply, ApiError> {
        self.record(RecordedCall::Chat {
            session: session.clone(),
            text: text.to_string(),
            hints,
        });
        lock(&self.queues)
            .chat
            .pop_front()
            .unwrap_or_else(|| Ok(reply("Mock question", None)))
    }

    async fn force_diagnosis(
        &self,
        _credential: &Credential,
        session: &SessionIdentity,
        options: ForceDiagnosisOptions,
    ) -> Result<ServiceReply, ApiError> {
        self.record(RecordedCall::ForceDiagnosis {
            session: session.clone(),
            options,
        });
        // Resets never consume a queued diagnosis.
        if options.reset {
            return Ok(reply("Conversation reset", Some(StepId::START)));
        }
        lock(&self.queues)
            .force_diagnosis
            .pop_front()
            .unwrap_or_else(|| Ok(reply("Mock diagnosis", Some(StepId::DIAGNOSIS))))
    }

    async fn generate_summary(
        &self,
        _credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<SummaryReply, ApiError> {
        self.record(RecordedCall::GenerateSummary {
            session: session.clone(),
        });
        lock(&self.queues).summary.pop_front().unwrap_or_else(|| {
            Ok(SummaryReply {
                summary_text: "Mock summary".to_string(),
            })
        })
    }

    async fn fetch_profile(
        &self,
        _credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<PatientProfile, ApiError> {
        self.record(RecordedCall::FetchProfile {
            session: session.clone(),
        });
        lock(&self.queues)
            .profile
            .pop_front()
            .unwrap_or_else(|| Ok(PatientProfile::default()))
    }

    async fn save_history_record(
        &self,
        _credential: &Credential,
        user: &UserId,
        record: &HistoryRecord,
    ) -> Result<(), ApiError> {
        self.record(RecordedCall::SaveHistoryRecord {
            user: user.clone(),
            record: record.clone(),
        });
        lock(&self.queues).save.pop_front().unwrap_or(Ok(()))
    }

    async fn fetch_history(
        &self,
        _credential: &Credential,
        user: &UserId,
    ) -> Result<Vec<HistoryRecord>, ApiError> {
        self.record(RecordedCall::FetchHistory { user: user.clone() });
        lock(&self.queues)
            .history
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn view_history_record(
        &self,
        _credential: &Credential,
        user: &UserId,
        id: HistoryRecordId,
    ) -> Result<HistoryRecord, ApiError> {
        self.record(RecordedCall::ViewHistoryRecord {
            user: user.clone(),
            id,
        });
        lock(&self.queues)
            .view
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::server(404, Some("Summary not found".to_string()))))
    }
}
