//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DiagnosticApi` - the remote intake service (dialogue, summaries, history)
//! - `CredentialStore` - persistence of the authenticated session

mod credential_store;
mod diagnostic_api;

pub use credential_store::{CredentialStore, CredentialStoreError};
pub use diagnostic_api::{
    ApiError, ApiErrorKind, ChatHints, DiagnosticApi, ForceDiagnosisOptions, ServiceReply,
    SummaryReply,
};
