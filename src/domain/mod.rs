//! Domain layer containing the intake dialogue rules and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, auth)
//! - `conversation` - Dialogue state, completion and continuation policies
//! - `summary` - Clinical summary text to sectioned document
//! - `history` - History records and summary deduplication

pub mod conversation;
pub mod foundation;
pub mod history;
pub mod summary;
