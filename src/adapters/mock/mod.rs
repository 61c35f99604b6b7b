//! In-memory test doubles for the remote service.

mod diagnostic_api;

pub use diagnostic_api::{MockDiagnosticApi, RecordedCall};
