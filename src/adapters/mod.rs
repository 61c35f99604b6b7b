//! Adapters - Implementations of port interfaces.
//!
//! - `http` - reqwest client for the remote diagnostic service
//! - `mock` - queue-driven test double of the same service
//! - `session` - credential stores (in-memory, JSON file)

pub mod http;
pub mod mock;
pub mod session;

pub use http::{HttpApiConfig, HttpDiagnosticApi};
pub use mock::{MockDiagnosticApi, RecordedCall};
pub use session::{FileCredentialStore, InMemoryCredentialStore};
