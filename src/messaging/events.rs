/// Wizard event types
///
/// Events describe transitions that already happened (past tense).
/// They are broadcast on the wizard's [`EventBus`](super::EventBus).

/// Wizard lifecycle events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// The wizard arrived at a step
    StepEntered { step_id: String, index: usize },

    /// The user accepted discarding unsaved changes on a step
    StepChangeDiscarded { step_id: String },

    /// The user declined to discard unsaved changes; navigation was aborted
    NavigationAborted { step_id: String },

    /// Form completion was recomputed for a step
    CompletionChanged { step_id: String, percentage: u8 },

    /// The wizard advanced past its last step
    Finished { steps_total: usize },
}

impl WizardEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            WizardEvent::StepEntered { step_id, index } => {
                format!("Entered step {} (#{})", step_id, index + 1)
            }
            WizardEvent::StepChangeDiscarded { step_id } => {
                format!("Discarded changes on {}", step_id)
            }
            WizardEvent::NavigationAborted { step_id } => {
                format!("Stayed on {}", step_id)
            }
            WizardEvent::CompletionChanged {
                step_id,
                percentage,
            } => {
                format!("{} is {}% complete", step_id, percentage)
            }
            WizardEvent::Finished { steps_total } => {
                format!("Finished all {} steps", steps_total)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_description() {
        let event = WizardEvent::StepEntered {
            step_id: "intro".to_string(),
            index: 0,
        };
        assert_eq!(event.description(), "Entered step intro (#1)");

        let event = WizardEvent::CompletionChanged {
            step_id: "details".to_string(),
            percentage: 75,
        };
        assert_eq!(event.description(), "details is 75% complete");
    }
}
