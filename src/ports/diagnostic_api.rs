//! Diagnostic API Port - Interface for the remote intake service.
//!
//! The remote service owns the dialogue graph, the patient profile and the
//! saved history. This port abstracts its operations so the controller can be
//! driven against an HTTP client or an in-memory mock.
//!
//! # Design
//!
//! - Every call carries the bearer credential explicitly
//! - Dialogue calls are keyed by the per-consultation `SessionIdentity`
//! - History calls are keyed by the stable `UserId`, which the service checks
//!   against the credential's owner
//! - `ApiError` classifies failures into the four categories the controller
//!   reacts to

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{PatientProfile, StepId};
use crate::domain::foundation::{Credential, HistoryRecordId, SessionIdentity, UserId};
use crate::domain::history::HistoryRecord;

/// Port for the remote diagnostic service.
#[async_trait]
pub trait DiagnosticApi: Send + Sync {
    /// Sends one patient answer (or the `continue` pseudo-message).
    async fn chat(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
        text: &str,
        hints: ChatHints,
    ) -> Result<ServiceReply, ApiError>;

    /// Asks for a diagnosis regardless of dialogue position, or resets the
    /// service-side state when `options.reset` is set.
    async fn force_diagnosis(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
        options: ForceDiagnosisOptions,
    ) -> Result<ServiceReply, ApiError>;

    /// Generates a medical case summary of the consultation.
    async fn generate_summary(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<SummaryReply, ApiError>;

    /// Fetches what the service has gathered about the patient.
    async fn fetch_profile(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<PatientProfile, ApiError>;

    /// Stores a history record.
    async fn save_history_record(
        &self,
        credential: &Credential,
        user: &UserId,
        record: &HistoryRecord,
    ) -> Result<(), ApiError>;

    /// Lists the user's stored history records.
    async fn fetch_history(
        &self,
        credential: &Credential,
        user: &UserId,
    ) -> Result<Vec<HistoryRecord>, ApiError>;

    /// Fetches one stored history record.
    async fn view_history_record(
        &self,
        credential: &Credential,
        user: &UserId,
        id: HistoryRecordId,
    ) -> Result<HistoryRecord, ApiError>;
}

/// Context hints sent with a chat call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatHints {
    pub new_conversation: bool,
    pub reset_context: bool,
    pub ignore_previous: bool,
    /// Only set on continuation calls.
    pub preserve_context: Option<bool>,
}

impl ChatHints {
    /// Hints for a user submission; all set only on the first exchange.
    pub fn submission(first_exchange: bool) -> Self {
        Self {
            new_conversation: first_exchange,
            reset_context: first_exchange,
            ignore_previous: first_exchange,
            preserve_context: None,
        }
    }

    /// Hints for an auto-continuation call.
    pub fn continuation(preserve_context: bool) -> Self {
        Self {
            preserve_context: Some(preserve_context),
            ..Self::default()
        }
    }
}

/// Options for a forced-diagnosis call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForceDiagnosisOptions {
    /// Ask the service to degrade gracefully on model errors.
    pub fallback: bool,
    /// Reset service-side state instead of diagnosing.
    pub reset: bool,
    pub complete_reset: bool,
}

impl ForceDiagnosisOptions {
    /// Options for an actual diagnosis.
    pub fn diagnosis() -> Self {
        Self {
            fallback: true,
            ..Self::default()
        }
    }

    /// Options for a full service-side reset.
    pub fn reset() -> Self {
        Self {
            reset: true,
            complete_reset: true,
            ..Self::default()
        }
    }
}

/// Reply to a dialogue call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceReply {
    /// Text to show the patient.
    pub next_prompt: String,
    /// Step the service moved to, if it reported one.
    pub step: Option<StepId>,
}

impl ServiceReply {
    pub fn new(next_prompt: impl Into<String>, step: Option<StepId>) -> Self {
        Self {
            next_prompt: next_prompt.into(),
            step,
        }
    }
}

/// Reply to a summary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReply {
    pub summary_text: String,
}

/// Failure category the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Unauthenticated,
    MalformedServiceReply,
    TransportOrServerError,
    InvalidResponseShape,
}

/// Remote service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Missing or rejected credential.
    #[error("Session expired. Please login again.")]
    Unauthenticated,

    /// The service hit its known model-reply defect.
    #[error("The AI model encountered an error processing your information. Please try again with a simpler query.")]
    MalformedServiceReply {
        /// Detail text reported by the service.
        detail: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-2xx response without a recognised shape.
    #[error("{}", server_message(*.status, .detail.as_deref()))]
    Server {
        status: u16,
        detail: Option<String>,
    },

    /// 2xx response missing an expected field.
    #[error("Invalid response format from server")]
    InvalidResponseShape {
        /// Name of the missing field.
        field: String,
    },
}

fn server_message(status: u16, detail: Option<&str>) -> String {
    match detail {
        Some(detail) if !detail.trim().is_empty() => detail.to_string(),
        _ => format!("Server error: {}", status),
    }
}

impl ApiError {
    /// Creates a server error.
    pub fn server(status: u16, detail: Option<String>) -> Self {
        Self::Server { status, detail }
    }

    /// Creates an invalid-shape error for a missing field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::InvalidResponseShape {
            field: field.into(),
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Unauthenticated => ApiErrorKind::Unauthenticated,
            Self::MalformedServiceReply { .. } => ApiErrorKind::MalformedServiceReply,
            Self::Transport(_) | Self::Server { .. } => ApiErrorKind::TransportOrServerError,
            Self::InvalidResponseShape { .. } => ApiErrorKind::InvalidResponseShape,
        }
    }

    /// Returns true if the user has to log in again.
    pub fn requires_reauthentication(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_hints_follow_first_exchange() {
        let first = ChatHints::submission(true);
        assert!(first.new_conversation && first.reset_context && first.ignore_previous);
        assert_eq!(ChatHints::submission(false), ChatHints::default());
    }

    #[test]
    fn continuation_hints_only_carry_preserve_context() {
        let hints = ChatHints::continuation(false);
        assert_eq!(hints.preserve_context, Some(false));
        assert!(!hints.new_conversation);
    }

    #[test]
    fn reset_options() {
        let reset = ForceDiagnosisOptions::reset();
        assert!(reset.reset && reset.complete_reset && !reset.fallback);
        assert!(ForceDiagnosisOptions::diagnosis().fallback);
    }

    #[test]
    fn kinds_cover_the_taxonomy() {
        assert_eq!(ApiError::Unauthenticated.kind(), ApiErrorKind::Unauthenticated);
        assert_eq!(
            ApiError::Transport("reset".into()).kind(),
            ApiErrorKind::TransportOrServerError
        );
        assert_eq!(
            ApiError::server(500, None).kind(),
            ApiErrorKind::TransportOrServerError
        );
        assert_eq!(
            ApiError::missing_field("next_question").kind(),
            ApiErrorKind::InvalidResponseShape
        );
        assert!(ApiError::Unauthenticated.requires_reauthentication());
    }

    #[test]
    fn server_error_prefers_detail() {
        assert_eq!(
            ApiError::server(500, Some("User ID is required".into())).to_string(),
            "User ID is required"
        );
        assert_eq!(ApiError::server(502, None).to_string(), "Server error: 502");
        assert_eq!(ApiError::server(502, Some(" ".into())).to_string(), "Server error: 502");
    }
}
