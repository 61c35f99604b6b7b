//! Results of controller operations.

use super::follow_up::ScheduledFollowUp;

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Submitted text was empty or whitespace.
    EmptyInput,
    /// The lifetime is already complete.
    ConversationComplete,
    /// Another exchange is still waiting for its reply.
    RequestInFlight,
    /// No credential is available.
    NotAuthenticated,
    /// The follow-up belongs to an earlier lifetime or was superseded.
    StaleSchedule,
}

/// What happened during one controller operation.
///
/// Failures never escape the controller; they arrive here after being turned
/// into a visible assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Nothing was sent and nothing changed.
    Ignored(IgnoreReason),
    /// The service replied; the dialogue continues.
    Replied { scheduled: Option<ScheduledFollowUp> },
    /// The lifetime is now complete.
    Completed,
    /// The service hit a known defect; a recovery may be scheduled.
    Degraded { scheduled: Option<ScheduledFollowUp> },
    /// The call failed; an apology was shown and the user can still act.
    Failed,
    /// The credential was rejected and has been cleared.
    Reauthenticate,
}

impl ExchangeOutcome {
    /// Returns the follow-up the caller should fire, if any.
    pub fn scheduled(&self) -> Option<ScheduledFollowUp> {
        match self {
            ExchangeOutcome::Replied { scheduled } | ExchangeOutcome::Degraded { scheduled } => {
                *scheduled
            }
            _ => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, ExchangeOutcome::Ignored(_))
    }

    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, ExchangeOutcome::Reauthenticate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::follow_up::{FollowUpAction, FollowUpScheduler};
    use std::time::Duration;

    #[test]
    fn scheduled_is_exposed_for_replied_and_degraded() {
        let mut scheduler = FollowUpScheduler::new();
        let follow_up = scheduler.schedule(FollowUpAction::AutoContinue, Duration::ZERO);

        let replied = ExchangeOutcome::Replied {
            scheduled: Some(follow_up),
        };
        let degraded = ExchangeOutcome::Degraded {
            scheduled: Some(follow_up),
        };

        assert_eq!(replied.scheduled(), Some(follow_up));
        assert_eq!(degraded.scheduled(), Some(follow_up));
        assert_eq!(ExchangeOutcome::Completed.scheduled(), None);
    }

    #[test]
    fn predicates() {
        assert!(ExchangeOutcome::Ignored(IgnoreReason::EmptyInput).is_ignored());
        assert!(ExchangeOutcome::Reauthenticate.requires_reauthentication());
        assert!(!ExchangeOutcome::Failed.is_ignored());
    }
}
