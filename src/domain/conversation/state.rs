//! Conversation state for one consultation lifetime.

use serde::{Deserialize, Serialize};

use super::StepId;
use crate::domain::foundation::StateMachine;

/// Lifecycle of a consultation.
///
/// Completion is one-way: a lifetime never leaves `Complete`. Only a reset
/// (a new [`ConversationState`]) starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    /// Dialogue in progress; user input accepted.
    #[default]
    Active,

    /// Diagnosis or recommendations reached; input closed.
    Complete,
}

impl StateMachine for ConsultationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConsultationStatus::*;
        matches!((self, target), (Active, Complete))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConsultationStatus::*;
        match self {
            Active => vec![Complete],
            Complete => vec![],
        }
    }
}

/// Dialogue progress owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    initial_step: StepId,
    step: StepId,
    exchange_count: u32,
    status: ConsultationStatus,
    awaiting_summary_action: bool,
}

impl ConversationState {
    /// Starts a new lifetime at the given initial step.
    pub fn new(initial_step: StepId) -> Self {
        Self {
            step: initial_step.clone(),
            initial_step,
            exchange_count: 0,
            status: ConsultationStatus::Active,
            awaiting_summary_action: false,
        }
    }

    pub fn step(&self) -> &StepId {
        &self.step
    }

    pub fn exchange_count(&self) -> u32 {
        self.exchange_count
    }

    pub fn status(&self) -> ConsultationStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == ConsultationStatus::Complete
    }

    /// Returns true while the summary action is offered to the user.
    pub fn awaiting_summary_action(&self) -> bool {
        self.awaiting_summary_action
    }

    /// Returns true while the service still reports the initial step.
    pub fn is_at_initial_step(&self) -> bool {
        self.step == self.initial_step
    }

    /// Returns true for the very first exchange of the lifetime.
    pub fn is_first_exchange(&self) -> bool {
        self.is_at_initial_step() && self.exchange_count == 0
    }

    /// Whether the service should keep prior context on a continuation call.
    ///
    /// Early in the dialogue the context is reset so the service does not
    /// anchor on the welcome turn.
    pub fn preserve_context(&self, early_stage_exchanges: u32) -> bool {
        !(self.exchange_count < early_stage_exchanges || self.is_at_initial_step())
    }

    /// Records a completed round-trip.
    pub fn record_exchange(&mut self, step: Option<StepId>) {
        self.exchange_count += 1;
        if let Some(step) = step {
            self.step = step;
        }
    }

    /// Moves to a step without counting an exchange.
    pub fn set_step(&mut self, step: StepId) {
        self.step = step;
    }

    /// Marks the lifetime complete. Repeated calls are no-ops.
    pub fn mark_complete(&mut self) {
        if let Ok(next) = self.status.transition_to(ConsultationStatus::Complete) {
            self.status = next;
        }
    }

    /// Makes the summary action available.
    pub fn offer_summary_action(&mut self) {
        self.awaiting_summary_action = true;
    }

    /// Withdraws the summary action once a summary was produced.
    pub fn withdraw_summary_action(&mut self) {
        self.awaiting_summary_action = false;
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new(StepId::start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step(id: &str) -> StepId {
        StepId::new(id).unwrap()
    }

    mod status {
        use super::*;

        #[test]
        fn active_can_complete() {
            assert!(ConsultationStatus::Active.can_transition_to(&ConsultationStatus::Complete));
        }

        #[test]
        fn complete_is_terminal() {
            assert!(ConsultationStatus::Complete.is_terminal());
            assert!(ConsultationStatus::Complete
                .transition_to(ConsultationStatus::Active)
                .is_err());
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&ConsultationStatus::Complete).unwrap();
            assert_eq!(json, "\"complete\"");
        }
    }

    mod exchanges {
        use super::*;

        #[test]
        fn first_exchange_only_at_initial_step_with_no_exchanges() {
            let mut state = ConversationState::default();
            assert!(state.is_first_exchange());

            state.record_exchange(None);
            assert!(!state.is_first_exchange());
            assert!(state.is_at_initial_step());
        }

        #[test]
        fn record_exchange_updates_step() {
            let mut state = ConversationState::default();
            state.record_exchange(Some(step("symptoms")));
            assert_eq!(state.exchange_count(), 1);
            assert_eq!(state.step(), &step("symptoms"));
        }

        #[test]
        fn preserve_context_false_early_or_at_initial_step() {
            let mut state = ConversationState::default();
            state.record_exchange(Some(step("symptoms")));
            state.record_exchange(None);
            assert!(!state.preserve_context(3));

            state.record_exchange(None);
            assert!(state.preserve_context(3));

            state.set_step(StepId::start());
            assert!(!state.preserve_context(3));
        }
    }

    mod completion {
        use super::*;

        #[test]
        fn mark_complete_is_idempotent() {
            let mut state = ConversationState::default();
            state.mark_complete();
            state.mark_complete();
            assert!(state.is_complete());
        }

        #[test]
        fn summary_action_toggles_independently() {
            let mut state = ConversationState::default();
            state.offer_summary_action();
            assert!(state.awaiting_summary_action());
            state.withdraw_summary_action();
            assert!(!state.awaiting_summary_action());
        }

        #[derive(Debug, Clone)]
        enum Op {
            Exchange(Option<String>),
            SetStep(String),
            Complete,
            Offer,
            Withdraw,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                proptest::option::of("[a-z_]{1,12}").prop_map(Op::Exchange),
                "[a-z_]{1,12}".prop_map(Op::SetStep),
                Just(Op::Complete),
                Just(Op::Offer),
                Just(Op::Withdraw),
            ]
        }

        proptest! {
            #[test]
            fn completion_never_reverts(ops in proptest::collection::vec(op(), 0..40)) {
                let mut state = ConversationState::default();
                let mut seen_complete = false;
                for op in ops {
                    match op {
                        Op::Exchange(s) => state.record_exchange(s.map(|s| step(&s))),
                        Op::SetStep(s) => state.set_step(step(&s)),
                        Op::Complete => state.mark_complete(),
                        Op::Offer => state.offer_summary_action(),
                        Op::Withdraw => state.withdraw_summary_action(),
                    }
                    if seen_complete {
                        prop_assert!(state.is_complete());
                    }
                    seen_complete = state.is_complete();
                }
            }
        }
    }
}
