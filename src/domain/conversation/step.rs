//! Dialogue step identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Opaque dialogue position reported by the diagnostic service.
///
/// The set of steps is owned by the service; unrecognized ids are carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Step a new conversation starts at.
    pub const START: &'static str = "start";

    /// Step assumed after a forced diagnosis that reports none.
    pub const DIAGNOSIS: &'static str = "diagnosis";

    /// Creates a step id, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("step"));
        }
        Ok(Self(id.trim().to_string()))
    }

    /// Returns the default starting step.
    pub fn start() -> Self {
        Self(Self::START.to_string())
    }

    /// Returns the fallback step for diagnoses.
    pub fn diagnosis() -> Self {
        Self(Self::DIAGNOSIS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StepId {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
