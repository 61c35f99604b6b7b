//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, authentication types and error types
//! that form the vocabulary of the intake domain.

mod auth;
mod errors;
mod identity;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{AuthenticatedSession, AuthenticatedUser, Credential};
pub use errors::ValidationError;
pub use identity::SessionIdentity;
pub use ids::{HistoryRecordId, MessageId, RecordIdGenerator, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
