//! Progress read model for the display layer.
//!
//! Step labels and milestone tables mirror the step ids the diagnostic
//! service is known to emit. Unknown ids fall back to a generic label and no
//! completed milestones.

use serde::Serialize;

use super::{ConversationState, PatientProfile, StepId};

/// Intake milestones, in dialogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Symptoms,
    MedicalHistory,
    Medications,
    AdditionalSymptoms,
    Diagnosis,
    Recommendations,
}

impl Milestone {
    pub const ALL: [Milestone; 6] = [
        Milestone::Symptoms,
        Milestone::MedicalHistory,
        Milestone::Medications,
        Milestone::AdditionalSymptoms,
        Milestone::Diagnosis,
        Milestone::Recommendations,
    ];

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Milestone::Symptoms => "Symptoms",
            Milestone::MedicalHistory => "Medical History",
            Milestone::Medications => "Medications",
            Milestone::AdditionalSymptoms => "Additional Info",
            Milestone::Diagnosis => "Diagnosis",
            Milestone::Recommendations => "Recommendations",
        }
    }

    /// The step id the service uses while working on this milestone.
    pub fn step_key(&self) -> &'static str {
        match self {
            Milestone::Symptoms => "symptoms",
            Milestone::MedicalHistory => "previous_history",
            Milestone::Medications => "medication_history",
            Milestone::AdditionalSymptoms => "additional_symptoms",
            Milestone::Diagnosis => "diagnosis",
            Milestone::Recommendations => "criticality",
        }
    }
}

/// Label shown for the current step.
pub fn step_label(step: &StepId) -> &'static str {
    match step.as_str() {
        "start" => "Welcome",
        "symptoms" => "Collecting Symptoms",
        "previous_history" => "Medical History",
        "medication_history" => "Medication History",
        "additional_symptoms" => "Additional Symptoms",
        "diagnosis" | "diagnosis_prep" | "diagnosis_node" => "Diagnosis",
        "criticality" | "criticality_node" => "Recommendations",
        "end" => "Consultation Complete",
        _ => "Consultation",
    }
}

/// Milestones a step implies are already done.
pub fn milestones_reached(step: &StepId) -> &'static [Milestone] {
    use Milestone::*;
    const ALL: &[Milestone] = &Milestone::ALL;
    match step.as_str() {
        "initial_assessment" | "dynamic_symptoms" | "injury_assessment"
        | "infection_assessment" | "digestive_assessment" | "respiratory_assessment"
        | "chronic_condition" | "urgent_follow_up" | "emergency_services" => &[Symptoms],
        "previous_history" | "prev_history_node" => &[Symptoms, MedicalHistory],
        "medication_history" | "med_history_node" => &[Symptoms, MedicalHistory, Medications],
        "additional_symptoms" | "additional_symptoms_node" => {
            &[Symptoms, MedicalHistory, Medications, AdditionalSymptoms]
        }
        "diagnosis_prep" | "diagnosis" | "diagnosis_node" => &ALL[..5],
        "criticality" | "criticality_node" | "end" => ALL,
        _ => &[],
    }
}

/// Status of one milestone in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MilestoneStatus {
    pub milestone: Milestone,
    pub completed: bool,
    /// The service is currently on this milestone's step.
    pub current: bool,
}

/// What the display layer needs to draw progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub label: &'static str,
    pub step: StepId,
    pub milestones: Vec<MilestoneStatus>,
    pub is_complete: bool,
    pub awaiting_summary_action: bool,
    pub exchange_count: u32,
}

impl ProgressSnapshot {
    /// Builds a snapshot from the state and the latest profile.
    ///
    /// A milestone also counts as done when the profile already holds data
    /// for it, since the service's step id can lag behind.
    pub fn capture(state: &ConversationState, profile: &PatientProfile) -> Self {
        let reached = milestones_reached(state.step());
        let milestones = Milestone::ALL
            .iter()
            .map(|&milestone| {
                let from_profile = match milestone {
                    Milestone::Symptoms => profile.has_symptoms(),
                    Milestone::MedicalHistory => profile.has_prior_history(),
                    Milestone::Medications => profile.has_medication_history(),
                    Milestone::AdditionalSymptoms => profile.has_additional_symptoms(),
                    Milestone::Diagnosis => profile.has_diagnosis(),
                    Milestone::Recommendations => state.is_complete(),
                };
                MilestoneStatus {
                    milestone,
                    completed: reached.contains(&milestone) || from_profile,
                    current: state.step() == milestone.step_key(),
                }
            })
            .collect();

        let label = if state.is_complete() {
            "Consultation Complete"
        } else {
            step_label(state.step())
        };

        Self {
            label,
            step: state.step().clone(),
            milestones,
            is_complete: state.is_complete(),
            awaiting_summary_action: state.awaiting_summary_action(),
            exchange_count: state.exchange_count(),
        }
    }

    /// Milestones marked completed.
    pub fn completed(&self) -> impl Iterator<Item = Milestone> + '_ {
        self.milestones
            .iter()
            .filter(|m| m.completed)
            .map(|m| m.milestone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(step: &str) -> ConversationState {
        let mut state = ConversationState::default();
        state.record_exchange(Some(StepId::new(step).unwrap()));
        state
    }

    #[test]
    fn labels_known_and_unknown_steps() {
        assert_eq!(step_label(&StepId::start()), "Welcome");
        assert_eq!(step_label(&StepId::new("diagnosis_node").unwrap()), "Diagnosis");
        assert_eq!(step_label(&StepId::new("mystery").unwrap()), "Consultation");
    }

    #[test]
    fn medication_step_implies_three_milestones() {
        let snapshot = ProgressSnapshot::capture(&state_at("med_history_node"), &PatientProfile::default());
        let done: Vec<_> = snapshot.completed().collect();
        assert_eq!(
            done,
            vec![Milestone::Symptoms, Milestone::MedicalHistory, Milestone::Medications]
        );
        assert_eq!(snapshot.label, "Consultation");
    }

    #[test]
    fn profile_data_completes_milestones() {
        let profile = PatientProfile {
            diagnosis: "Flu".to_string(),
            ..PatientProfile::default()
        };
        let snapshot = ProgressSnapshot::capture(&state_at("symptoms"), &profile);
        let done: Vec<_> = snapshot.completed().collect();
        assert_eq!(done, vec![Milestone::Diagnosis]);
        assert!(snapshot.milestones[0].current);
    }

    #[test]
    fn complete_conversation_is_labelled_complete() {
        let mut state = state_at("diagnosis");
        state.mark_complete();
        let snapshot = ProgressSnapshot::capture(&state, &PatientProfile::default());
        assert_eq!(snapshot.label, "Consultation Complete");
        assert_eq!(snapshot.completed().count(), 6);
    }

    #[test]
    fn unknown_step_has_no_milestones() {
        let snapshot = ProgressSnapshot::capture(&state_at("mystery"), &PatientProfile::default());
        assert_eq!(snapshot.completed().count(), 0);
    }
}
