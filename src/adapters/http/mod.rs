//! HTTP adapter for the remote diagnostic service.

mod diagnostic_client;
mod wire;

pub use diagnostic_client::{
    classify_failure, HttpApiConfig, HttpDiagnosticApi, DEFAULT_MALFORMED_REPLY_MARKER,
};
