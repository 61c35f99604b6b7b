//! Application layer - the conversation controller and its session context.
//!
//! This layer orchestrates domain rules and coordinates the ports. It is the
//! only place that mutates conversation state.

mod controller;
mod follow_up;
mod outcome;
mod session_context;
mod settings;

pub use controller::{ConversationController, CONTINUE_MESSAGE};
pub use follow_up::{FollowUpAction, FollowUpScheduler, ScheduleToken, ScheduledFollowUp};
pub use outcome::{ExchangeOutcome, IgnoreReason};
pub use session_context::SessionContext;
pub use settings::{ControllerSettings, DEFAULT_WELCOME_MESSAGE};
