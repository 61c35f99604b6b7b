//! MedBot client - conversation orchestration for a medical-intake service
//!
//! The remote diagnostic service asks the questions; this crate tracks where
//! the dialogue stands, decides when it is finished, recovers from service
//! defects, and turns generated summaries into sectioned documents.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
