//! Patient profile read model.
//!
//! Owned by the diagnostic service. The client only replaces its copy with a
//! freshly fetched one.

use serde::{Deserialize, Serialize};

/// What the service has gathered about the patient so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default)]
    pub symptoms: Vec<String>,

    #[serde(default, rename = "previous_history")]
    pub prior_history: String,

    #[serde(default)]
    pub medication_history: String,

    #[serde(default)]
    pub additional_symptoms: String,

    #[serde(default)]
    pub diagnosis: String,

    #[serde(default)]
    pub critical: bool,
}

impl PatientProfile {
    pub fn has_symptoms(&self) -> bool {
        !self.symptoms.is_empty()
    }

    pub fn has_prior_history(&self) -> bool {
        !self.prior_history.trim().is_empty()
    }

    pub fn has_medication_history(&self) -> bool {
        !self.medication_history.trim().is_empty()
    }

    pub fn has_additional_symptoms(&self) -> bool {
        !self.additional_symptoms.trim().is_empty()
    }

    pub fn has_diagnosis(&self) -> bool {
        !self.diagnosis.trim().is_empty()
    }

    /// Returns true if nothing has been gathered yet.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
