//! Conversation controller - the orchestrator of a consultation.
//!
//! Owns the conversation state, the visible transcript and the local history
//! list, and mediates every call to the diagnostic service.
//!
//! # Guarantees
//!
//! - at most one exchange is in flight: operations take `&mut self` and refuse
//!   to start while a placeholder is shown
//! - state changes only after a fully parsed success reply
//! - every failure ends as a visible assistant message and an
//!   `ExchangeOutcome`; nothing propagates to the caller
//! - completion is one-way within a lifetime

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::follow_up::{FollowUpAction, FollowUpScheduler, ScheduledFollowUp};
use super::outcome::{ExchangeOutcome, IgnoreReason};
use super::session_context::SessionContext;
use super::settings::ControllerSettings;
use crate::domain::conversation::{
    AutoContinuationTrigger, CompletionDetector, ConversationState, Message, MessageHints,
    PatientProfile, ProgressSnapshot, StepId, Transcript,
};
use crate::domain::foundation::{
    Credential, HistoryRecordId, RecordIdGenerator, SessionIdentity, Timestamp, UserId,
};
use crate::domain::history::{
    HistoryRecord, DOCTOR_SUMMARY_TITLE, MEDICAL_RECOMMENDATION_TITLE,
};
use crate::ports::{
    ApiError, ApiErrorKind, ChatHints, DiagnosticApi, ForceDiagnosisOptions, ServiceReply,
};

/// Pseudo-message sent on auto-continuation.
pub const CONTINUE_MESSAGE: &str = "continue";

const THINKING_PLACEHOLDER: &str = "...";
const DIAGNOSIS_PLACEHOLDER: &str = "Generating medical diagnosis based on our conversation...";
const SUMMARY_PLACEHOLDER: &str = "Generating medical case summary...";

const SESSION_EXPIRED_NOTICE: &str = "Session expired. Please login again.";
const MALFORMED_REPLY_NOTICE: &str = "I'm having trouble processing your input. Let me try to provide a diagnosis based on what I know so far.";
const CONTINUE_ANYWAY_NOTICE: &str = "I notice we're having some trouble with the conversation flow. Let me try to provide a diagnosis based on the information so far.";
const CONTINUATION_APOLOGY: &str = "Sorry, I couldn't continue automatically. As an alternative, please try the \"Get Diagnosis\" button to generate a diagnosis based on our conversation so far.";
const PREVIOUS_CONVERSATION_HEADER: &str = "Here is a previous conversation:";

/// Which kind of dialogue call failed.
#[derive(Debug, Clone, Copy)]
enum Exchange {
    Submission,
    Continuation,
}

/// Drives one consultation at a time against the diagnostic service.
pub struct ConversationController {
    api: Arc<dyn DiagnosticApi>,
    session: SessionContext,
    settings: ControllerSettings,
    state: ConversationState,
    transcript: Transcript,
    profile: PatientProfile,
    trigger: AutoContinuationTrigger,
    scheduler: FollowUpScheduler,
    records: Vec<HistoryRecord>,
    record_ids: RecordIdGenerator,
}

impl ConversationController {
    /// Creates a controller showing the welcome message.
    pub fn new(
        api: Arc<dyn DiagnosticApi>,
        session: SessionContext,
        settings: ControllerSettings,
    ) -> Self {
        let state = ConversationState::new(settings.vocabulary.initial_step.clone());
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(settings.welcome_message.clone()));

        Self {
            api,
            session,
            settings,
            state,
            transcript,
            profile: PatientProfile::default(),
            trigger: AutoContinuationTrigger::new(),
            scheduler: FollowUpScheduler::new(),
            records: Vec::new(),
            record_ids: RecordIdGenerator::new(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Dialogue operations
    // ════════════════════════════════════════════════════════════════════════

    /// Sends one patient answer.
    pub async fn submit(&mut self, text: &str) -> ExchangeOutcome {
        if text.trim().is_empty() {
            return ExchangeOutcome::Ignored(IgnoreReason::EmptyInput);
        }
        let (credential, identity) = match self.dialogue_access() {
            Ok(access) => access,
            Err(reason) => return Self::ignored(reason),
        };

        // A user answer supersedes any pending follow-up.
        self.scheduler.cancel();
        let hints = ChatHints::submission(self.state.is_first_exchange());
        self.transcript.push(Message::user(text));
        self.transcript.push_transient(THINKING_PLACEHOLDER);

        debug!(session = %identity, first = hints.new_conversation, "Submitting message");
        let result = self.api.chat(&credential, &identity, text, hints).await;
        self.transcript.clear_transient();

        match result {
            Ok(reply) => {
                let (id, now) = self.next_record_slot();
                let record = HistoryRecord::conversation(id, now, text, &reply.next_prompt);
                self.store_record(record).await;
                self.settle_reply(reply).await
            }
            Err(error) => self.handle_exchange_failure(error, Exchange::Submission).await,
        }
    }

    /// Asks the service for a diagnosis regardless of dialogue position.
    ///
    /// Completes the lifetime whatever the result, so a failing service can
    /// never trap the user in a retry loop.
    pub async fn force_diagnosis(&mut self) -> ExchangeOutcome {
        let (credential, identity) = match self.dialogue_access() {
            Ok(access) => access,
            Err(reason) => return Self::ignored(reason),
        };

        self.scheduler.cancel();
        self.transcript.push_transient(DIAGNOSIS_PLACEHOLDER);
        info!(session = %identity, "Requesting forced diagnosis");
        let result = self
            .api
            .force_diagnosis(&credential, &identity, ForceDiagnosisOptions::diagnosis())
            .await;
        self.transcript.clear_transient();

        match result {
            Ok(reply) => {
                let terminal = reply
                    .step
                    .as_ref()
                    .map_or(false, |step| self.settings.vocabulary.is_terminal_step(step));
                let content = reply.next_prompt;

                self.transcript.push(Message::assistant(content.clone()));
                self.state.set_step(reply.step.unwrap_or_else(StepId::diagnosis));
                self.complete_lifetime();
                self.refresh_profile().await;

                if terminal {
                    let (id, now) = self.next_record_slot();
                    let record =
                        HistoryRecord::summary(id, now, MEDICAL_RECOMMENDATION_TITLE, content);
                    self.store_record(record).await;
                }
                ExchangeOutcome::Completed
            }
            Err(error) => {
                self.state.mark_complete();
                if error.requires_reauthentication() {
                    return self.reauthenticate().await;
                }
                warn!(error = %error, "Forced diagnosis failed");
                self.transcript.push(Message::assistant(format!(
                    "I apologize, but I'm having trouble generating a complete diagnosis due to a technical issue: {}. You can try starting a new consultation with more specific symptoms or try again later.",
                    error
                )));
                ExchangeOutcome::Failed
            }
        }
    }

    /// Lets the service advance without new user input.
    pub async fn request_auto_continuation(&mut self) -> ExchangeOutcome {
        let (credential, identity) = match self.dialogue_access() {
            Ok(access) => access,
            Err(reason) => return Self::ignored(reason),
        };

        self.scheduler.cancel();
        let hints = ChatHints::continuation(
            self.state
                .preserve_context(self.settings.early_stage_exchanges),
        );
        self.transcript.push_transient(THINKING_PLACEHOLDER);

        debug!(session = %identity, ?hints, "Continuing automatically");
        let result = self
            .api
            .chat(&credential, &identity, CONTINUE_MESSAGE, hints)
            .await;
        self.transcript.clear_transient();

        match result {
            Ok(reply) => self.settle_reply(reply).await,
            Err(error) => self.handle_exchange_failure(error, Exchange::Continuation).await,
        }
    }

    /// Generates and shows the medical case summary.
    pub async fn request_summary(&mut self) -> ExchangeOutcome {
        if self.transcript.has_transient() {
            return Self::ignored(IgnoreReason::RequestInFlight);
        }
        let Some((credential, identity)) = self.credentials() else {
            return Self::ignored(IgnoreReason::NotAuthenticated);
        };

        self.scheduler.cancel();
        self.transcript.push_transient(SUMMARY_PLACEHOLDER);
        let result = self.api.generate_summary(&credential, &identity).await;
        self.transcript.clear_transient();

        match result {
            Ok(summary) => {
                let formatted = self.settings.parser.format(&summary.summary_text);
                self.transcript.push(Message::assistant(formatted.clone()));
                self.state.mark_complete();
                self.state.withdraw_summary_action();

                let (id, now) = self.next_record_slot();
                let record = HistoryRecord::summary(id, now, DOCTOR_SUMMARY_TITLE, formatted);
                self.store_record(record).await;
                ExchangeOutcome::Completed
            }
            Err(error) if error.requires_reauthentication() => self.reauthenticate().await,
            Err(error) => {
                warn!(error = %error, "Summary generation failed");
                self.transcript.push(Message::assistant(format!(
                    "Sorry, I encountered an error generating the summary: {}",
                    error
                )));
                ExchangeOutcome::Failed
            }
        }
    }

    /// Starts a fresh lifetime under a newly minted session identity.
    ///
    /// The service-side reset is best-effort; its failure is only logged.
    pub async fn start_new_consultation(&mut self) {
        self.scheduler.new_lifetime();
        self.state = ConversationState::new(self.settings.vocabulary.initial_step.clone());
        self.profile = PatientProfile::default();
        self.trigger.reset();
        self.transcript
            .replace([Message::assistant(self.settings.welcome_message.clone())]);

        let identity = self.session.reseed().clone();
        info!(session = %identity, "New consultation started");

        let Some(credential) = self.session.credential().cloned() else {
            return;
        };
        if let Err(error) = self
            .api
            .force_diagnosis(&credential, &identity, ForceDiagnosisOptions::reset())
            .await
        {
            warn!(error = %error, "Failed to reset service-side conversation state");
        }
    }

    /// The "Continue Anyway" action shown on unhelpful replies.
    pub fn continue_anyway(&mut self) -> ExchangeOutcome {
        if self.state.is_complete() {
            return Self::ignored(IgnoreReason::ConversationComplete);
        }
        if self.transcript.has_transient() {
            return Self::ignored(IgnoreReason::RequestInFlight);
        }
        self.transcript
            .push(Message::assistant(CONTINUE_ANYWAY_NOTICE));
        let scheduled = self
            .scheduler
            .schedule(FollowUpAction::ForceDiagnosis, self.settings.fallback_delay);
        ExchangeOutcome::Degraded {
            scheduled: Some(scheduled),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Follow-ups
    // ════════════════════════════════════════════════════════════════════════

    /// Fires a scheduled follow-up unless it went stale in the meantime.
    pub async fn fire(&mut self, follow_up: ScheduledFollowUp) -> ExchangeOutcome {
        if !self.scheduler.take(follow_up.token) || self.state.is_complete() {
            debug!(action = ?follow_up.action, "Dropping stale follow-up");
            return ExchangeOutcome::Ignored(IgnoreReason::StaleSchedule);
        }
        match follow_up.action {
            FollowUpAction::AutoContinue => self.request_auto_continuation().await,
            FollowUpAction::ForceDiagnosis => self.force_diagnosis().await,
        }
    }

    /// Waits for and fires follow-ups until an outcome schedules nothing.
    pub async fn run_follow_ups(&mut self, mut outcome: ExchangeOutcome) -> ExchangeOutcome {
        while let Some(follow_up) = outcome.scheduled() {
            if !follow_up.delay.is_zero() {
                tokio::time::sleep(follow_up.delay).await;
            }
            outcome = self.fire(follow_up).await;
        }
        outcome
    }

    // ════════════════════════════════════════════════════════════════════════
    // History
    // ════════════════════════════════════════════════════════════════════════

    /// Replaces the local history list with the stored records.
    pub async fn load_history(&mut self) -> Result<usize, ApiError> {
        let Some((credential, user)) = self.history_access() else {
            return Err(ApiError::Unauthenticated);
        };
        match self.api.fetch_history(&credential, &user).await {
            Ok(records) => {
                debug!(count = records.len(), "History loaded");
                self.records = records;
                Ok(self.records.len())
            }
            Err(error) => {
                if error.requires_reauthentication() {
                    self.clear_session().await;
                }
                warn!(error = %error, "Failed to load history");
                Err(error)
            }
        }
    }

    /// Deduplicated history, newest first.
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.settings.deduplicator.dedup(self.records.iter().cloned())
    }

    /// Deduplicated summaries only, newest first.
    pub fn summary_history(&self) -> Vec<HistoryRecord> {
        self.settings.deduplicator.dedup(
            self.records
                .iter()
                .filter(|r| r.is_summary_like())
                .cloned(),
        )
    }

    /// Forgets the local history list. Stored records are untouched.
    pub fn clear_history(&mut self) {
        self.records.clear();
    }

    /// Shows a stored record read-only, in a completed lifetime.
    ///
    /// Falls back to the local copy when the service cannot deliver it.
    pub async fn view_history_record(&mut self, id: HistoryRecordId) -> ExchangeOutcome {
        if self.transcript.has_transient() {
            return Self::ignored(IgnoreReason::RequestInFlight);
        }
        let Some((credential, user)) = self.history_access() else {
            return Self::ignored(IgnoreReason::NotAuthenticated);
        };

        let record = match self.api.view_history_record(&credential, &user, id).await {
            Ok(record) => record,
            Err(error) if error.requires_reauthentication() => {
                return self.reauthenticate().await;
            }
            Err(error) => match self.records.iter().find(|r| r.id == id).cloned() {
                Some(local) => {
                    warn!(record = %id, error = %error, "Showing local copy of history record");
                    local
                }
                None => {
                    warn!(record = %id, error = %error, "History record unavailable");
                    self.transcript.push(Message::assistant(format!(
                        "Sorry, I couldn't load that record: {}",
                        error
                    )));
                    return ExchangeOutcome::Failed;
                }
            },
        };

        let header = if record.is_summary_like() {
            record.view_header()
        } else {
            PREVIOUS_CONVERSATION_HEADER.to_string()
        };

        self.scheduler.new_lifetime();
        self.trigger.reset();
        self.state = ConversationState::new(self.settings.vocabulary.initial_step.clone());
        self.state.mark_complete();
        self.transcript.replace(
            std::iter::once(Message::assistant(header)).chain(record.messages),
        );
        ExchangeOutcome::Completed
    }

    // ════════════════════════════════════════════════════════════════════════
    // Read models
    // ════════════════════════════════════════════════════════════════════════

    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot::capture(&self.state, &self.profile)
    }

    /// Display hints for a message at the current exchange count.
    pub fn hints_for(&self, message: &Message) -> MessageHints {
        self.settings
            .vocabulary
            .hints_for(message, self.state.exchange_count())
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn profile(&self) -> &PatientProfile {
        &self.profile
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Mutable access for login and logout.
    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Returns true while a follow-up is waiting to fire.
    pub fn has_pending_follow_up(&self) -> bool {
        self.scheduler.has_pending()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════════

    fn ignored(reason: IgnoreReason) -> ExchangeOutcome {
        debug!(?reason, "Operation ignored");
        ExchangeOutcome::Ignored(reason)
    }

    fn credentials(&self) -> Option<(Credential, SessionIdentity)> {
        self.session
            .credential()
            .map(|credential| (credential.clone(), self.session.identity().clone()))
    }

    fn history_access(&self) -> Option<(Credential, UserId)> {
        match (self.session.credential(), self.session.user()) {
            (Some(credential), Some(user)) => Some((credential.clone(), user.id.clone())),
            _ => None,
        }
    }

    /// Checks that a dialogue call may start now.
    fn dialogue_access(&self) -> Result<(Credential, SessionIdentity), IgnoreReason> {
        if self.state.is_complete() {
            return Err(IgnoreReason::ConversationComplete);
        }
        if self.transcript.has_transient() {
            return Err(IgnoreReason::RequestInFlight);
        }
        self.credentials().ok_or(IgnoreReason::NotAuthenticated)
    }

    fn next_record_slot(&mut self) -> (HistoryRecordId, Timestamp) {
        let now = Timestamp::now();
        (self.record_ids.next_at(now), now)
    }

    fn complete_lifetime(&mut self) {
        self.state.mark_complete();
        self.state.offer_summary_action();
        self.scheduler.cancel();
    }

    /// Applies a successful dialogue reply and decides what happens next.
    async fn settle_reply(&mut self, reply: ServiceReply) -> ExchangeOutcome {
        self.transcript.push(Message::assistant(reply.next_prompt));
        self.state.record_exchange(reply.step);

        let detector = CompletionDetector::new(&self.settings.vocabulary);
        if detector.is_complete(self.state.step(), self.transcript.iter()) {
            info!(step = %self.state.step(), "Consultation complete");
            self.complete_lifetime();
            self.refresh_profile().await;
            return ExchangeOutcome::Completed;
        }

        if self.settings.exchange_ceiling.is_reached(&self.state) {
            info!(
                exchanges = self.state.exchange_count(),
                "Exchange ceiling reached, forcing diagnosis"
            );
            return self.force_diagnosis().await;
        }

        let fires = match self.transcript.last() {
            Some(latest) => self.trigger.evaluate(&self.settings.vocabulary, latest),
            None => false,
        };
        let delay = self.settings.auto_continue_delay;
        let scheduled = fires.then(|| self.scheduler.schedule(FollowUpAction::AutoContinue, delay));
        ExchangeOutcome::Replied { scheduled }
    }

    async fn handle_exchange_failure(
        &mut self,
        error: ApiError,
        exchange: Exchange,
    ) -> ExchangeOutcome {
        match error.kind() {
            ApiErrorKind::Unauthenticated => self.reauthenticate().await,
            ApiErrorKind::MalformedServiceReply => {
                warn!(error = %error, "Malformed service reply, falling back to diagnosis");
                self.transcript
                    .push(Message::assistant(MALFORMED_REPLY_NOTICE));
                let scheduled = self
                    .scheduler
                    .schedule(FollowUpAction::ForceDiagnosis, self.settings.fallback_delay);
                ExchangeOutcome::Degraded {
                    scheduled: Some(scheduled),
                }
            }
            ApiErrorKind::TransportOrServerError | ApiErrorKind::InvalidResponseShape => {
                warn!(error = %error, ?exchange, "Exchange failed");
                let apology = match exchange {
                    Exchange::Submission => format!(
                        "Sorry, I encountered an error: {}. Let's try to get a diagnosis based on what we know so far.",
                        error
                    ),
                    Exchange::Continuation => CONTINUATION_APOLOGY.to_string(),
                };
                self.transcript.push(Message::assistant(apology));
                self.state.offer_summary_action();
                ExchangeOutcome::Failed
            }
        }
    }

    async fn reauthenticate(&mut self) -> ExchangeOutcome {
        warn!("Credential rejected by the service");
        self.clear_session().await;
        self.scheduler.cancel();
        self.transcript
            .push(Message::assistant(SESSION_EXPIRED_NOTICE));
        ExchangeOutcome::Reauthenticate
    }

    async fn clear_session(&mut self) {
        if let Err(error) = self.session.clear().await {
            warn!(error = %error, "Failed to clear stored session");
        }
    }

    async fn refresh_profile(&mut self) {
        let Some((credential, identity)) = self.credentials() else {
            return;
        };
        match self.api.fetch_profile(&credential, &identity).await {
            Ok(profile) => self.profile = profile,
            Err(error) => warn!(error = %error, "Profile refresh failed"),
        }
    }

    /// Keeps the record locally and saves it remotely, best-effort.
    async fn store_record(&mut self, record: HistoryRecord) {
        if let Some((credential, user)) = self.history_access() {
            if let Err(error) = self
                .api
                .save_history_record(&credential, &user, &record)
                .await
            {
                warn!(record = %record.id, error = %error, "Failed to save history record");
            }
        }
        self.records.push(record);
    }
}
