//! Scheduled follow-up calls with staleness tokens.
//!
//! The controller never sleeps on its own. It hands back a
//! `ScheduledFollowUp`; the caller waits for `delay` and passes it to
//! `ConversationController::fire`, which checks the token first. A token is
//! current only while it is the most recent one issued in the current
//! lifetime, so resets and newer schedules silently cancel older ones.

use std::time::Duration;

/// What a follow-up does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAction {
    /// Send the `continue` pseudo-message.
    AutoContinue,
    /// Ask for a diagnosis regardless of dialogue position.
    ForceDiagnosis,
}

/// Identity of one scheduled follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduleToken {
    generation: u64,
    sequence: u64,
}

impl ScheduleToken {
    /// Lifetime the token was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A follow-up the caller should fire after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFollowUp {
    pub token: ScheduleToken,
    pub action: FollowUpAction,
    pub delay: Duration,
}

/// Issues and validates schedule tokens.
#[derive(Debug, Clone, Default)]
pub struct FollowUpScheduler {
    generation: u64,
    sequence: u64,
    active: Option<ScheduleToken>,
}

impl FollowUpScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an action, superseding any pending one.
    pub fn schedule(&mut self, action: FollowUpAction, delay: Duration) -> ScheduledFollowUp {
        self.sequence += 1;
        let token = ScheduleToken {
            generation: self.generation,
            sequence: self.sequence,
        };
        self.active = Some(token);
        ScheduledFollowUp {
            token,
            action,
            delay,
        }
    }

    /// Returns true if `token` is the pending follow-up of this lifetime.
    pub fn is_current(&self, token: ScheduleToken) -> bool {
        self.active == Some(token)
    }

    /// Consumes the pending follow-up if `token` is current.
    pub fn take(&mut self, token: ScheduleToken) -> bool {
        if self.is_current(token) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Drops the pending follow-up without starting a new lifetime.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Starts a new lifetime; every earlier token becomes stale.
    pub fn new_lifetime(&mut self) {
        self.generation += 1;
        self.active = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending(&self) -> bool {
        self.active.is_some()
    }
}
