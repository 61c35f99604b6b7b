//! HTTP Diagnostic API - reqwest implementation of the `DiagnosticApi` port.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpApiConfig::new("https://medbot.example.com")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let api = HttpDiagnosticApi::new(config)?;
//! ```
//!
//! # Failure classification
//!
//! Non-2xx responses are classified from the status code and the `detail`
//! field of the JSON body:
//!
//! - 401 becomes `ApiError::Unauthenticated`
//! - a detail containing a known defect marker becomes
//!   `ApiError::MalformedServiceReply`
//! - anything else becomes `ApiError::Server`
//!
//! A 2xx body that does not decode becomes `ApiError::InvalidResponseShape`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::wire::{
    ChatRequest, DialogueReplyDto, ForceDiagnosisRequest, HistoryEntryDto, HistoryListDto,
    HistoryViewDto, SaveHistoryRequest, SummaryReplyDto, UserRequest,
};
use crate::domain::conversation::PatientProfile;
use crate::domain::foundation::{Credential, HistoryRecordId, SessionIdentity, UserId};
use crate::domain::history::HistoryRecord;
use crate::ports::{
    ApiError, ChatHints, DiagnosticApi, ForceDiagnosisOptions, ServiceReply, SummaryReply,
};

/// Detail text of the service's known model-reply defect.
pub const DEFAULT_MALFORMED_REPLY_MARKER: &str = "AIMessage' object has no attribute 'strip";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// Base URL of the service, without trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Detail substrings that identify a malformed service reply.
    pub malformed_reply_markers: Vec<String>,
}

impl HttpApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(60),
            malformed_reply_markers: vec![DEFAULT_MALFORMED_REPLY_MARKER.to_string()],
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the malformed-reply markers.
    pub fn with_malformed_reply_markers(mut self, markers: Vec<String>) -> Self {
        self.malformed_reply_markers = markers;
        self
    }
}

/// Diagnostic service client.
pub struct HttpDiagnosticApi {
    config: HttpApiConfig,
    client: Client,
}

impl HttpDiagnosticApi {
    /// Creates a client with the given configuration.
    pub fn new(config: HttpApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        credential: &Credential,
    ) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(credential.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Transport(format!(
                        "Request timed out after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    ApiError::Transport(format!("Connection failed: {}", e))
                } else {
                    ApiError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status.as_u16(), &body, &self.config.malformed_reply_markers);
        warn!(status = status.as_u16(), error = %error, "Diagnostic service call failed");
        Err(error)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response: {}", e)))?;
        decode_body(&body)
    }
}

/// Decodes a 2xx body; a body of the wrong shape is not a transport failure.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Diagnostic service reply has an unexpected shape");
        ApiError::missing_field("response body")
    })
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Maps a non-2xx status and body onto the error taxonomy.
pub fn classify_failure(status: u16, body: &str, malformed_markers: &[String]) -> ApiError {
    if status == 401 {
        return ApiError::Unauthenticated;
    }

    // `detail` is usually a string but validation errors send a list.
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .map(|d| match d {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });

    match detail {
        Some(detail)
            if malformed_markers
                .iter()
                .any(|marker| !marker.is_empty() && detail.contains(marker.as_str())) =>
        {
            ApiError::MalformedServiceReply { detail }
        }
        detail => ApiError::server(status, detail),
    }
}

#[async_trait]
impl DiagnosticApi for HttpDiagnosticApi {
    async fn chat(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
        text: &str,
        hints: ChatHints,
    ) -> Result<ServiceReply, ApiError> {
        debug!(session = %session, ?hints, "POST /chat");
        let body = ChatRequest::new(session.as_str(), text, hints);
        let response = self
            .send(self.client.post(self.url("/chat")).json(&body), credential)
            .await?;
        Self::read_json::<DialogueReplyDto>(response)
            .await?
            .into_reply()
    }

    async fn force_diagnosis(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
        options: ForceDiagnosisOptions,
    ) -> Result<ServiceReply, ApiError> {
        debug!(session = %session, ?options, "POST /force_diagnosis");
        let body = ForceDiagnosisRequest::new(session.as_str(), options);
        let response = self
            .send(
                self.client.post(self.url("/force_diagnosis")).json(&body),
                credential,
            )
            .await?;
        Self::read_json::<DialogueReplyDto>(response)
            .await?
            .into_reply()
    }

    async fn generate_summary(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<SummaryReply, ApiError> {
        debug!(session = %session, "POST /generate_summary");
        let body = UserRequest {
            user_id: session.as_str(),
        };
        let response = self
            .send(
                self.client.post(self.url("/generate_summary")).json(&body),
                credential,
            )
            .await?;
        Self::read_json::<SummaryReplyDto>(response)
            .await?
            .into_reply()
    }

    async fn fetch_profile(
        &self,
        credential: &Credential,
        session: &SessionIdentity,
    ) -> Result<PatientProfile, ApiError> {
        let path = format!("/user/{}", session);
        let response = self
            .send(self.client.get(self.url(&path)), credential)
            .await?;
        Self::read_json::<PatientProfile>(response).await
    }

    async fn save_history_record(
        &self,
        credential: &Credential,
        user: &UserId,
        record: &HistoryRecord,
    ) -> Result<(), ApiError> {
        debug!(user = %user, record = %record.id, "POST /save_chat_history");
        let body = SaveHistoryRequest {
            user_id: user.as_str(),
            history_entry: HistoryEntryDto::from(record),
        };
        self.send(
            self.client.post(self.url("/save_chat_history")).json(&body),
            credential,
        )
        .await?;
        Ok(())
    }

    async fn fetch_history(
        &self,
        credential: &Credential,
        user: &UserId,
    ) -> Result<Vec<HistoryRecord>, ApiError> {
        let path = format!("/chat_history/{}", user);
        let response = self
            .send(self.client.get(self.url(&path)), credential)
            .await?;
        let list = Self::read_json::<HistoryListDto>(response).await?;
        let entries = list
            .chat_history
            .ok_or_else(|| ApiError::missing_field("chat_history"))?;
        Ok(entries.into_iter().map(HistoryRecord::from).collect())
    }

    async fn view_history_record(
        &self,
        credential: &Credential,
        user: &UserId,
        id: HistoryRecordId,
    ) -> Result<HistoryRecord, ApiError> {
        let path = format!("/view_summary/{}/{}", user, id);
        let response = self
            .send(self.client.get(self.url(&path)), credential)
            .await?;
        let view = Self::read_json::<HistoryViewDto>(response).await?;
        view.summary
            .map(HistoryRecord::from)
            .ok_or_else(|| ApiError::missing_field("summary"))
    }
}
