//! Conversation module - dialogue state and the rules that drive it.
//!
//! # Components
//!
//! - `Message` / `Transcript` - visible turns, classified for rendering
//! - `ConversationState` - step, exchange count, one-way completion
//! - `DialogueVocabulary` - service-defined step ids and phrases
//! - `CompletionDetector` - step signal OR text signal
//! - `AutoContinuationTrigger` / `ExchangeCeiling` - follow-up policies
//! - `ProgressSnapshot` - read model for progress display

mod completion;
mod continuation;
mod message;
mod profile;
mod progress;
mod state;
mod step;
mod vocabulary;

pub use completion::CompletionDetector;
pub use continuation::{AutoContinuationTrigger, ExchangeCeiling};
pub use message::{DiagnosisSection, Message, MessageKind, Role, Transcript};
pub use profile::PatientProfile;
pub use progress::{milestones_reached, step_label, Milestone, MilestoneStatus, ProgressSnapshot};
pub use state::{ConsultationStatus, ConversationState};
pub use step::StepId;
pub use vocabulary::{DialogueVocabulary, MarkerGroup, MessageHints};
