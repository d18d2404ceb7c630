//! Workflow state for a migration run.
//!
//! The state is held in memory only. It describes how far the run has
//! progressed; the preconditions of each step are checked by the
//! orchestrator against the data it holds, not against this value alone.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowState {
    #[default]
    SourceIdle,
    SourceFetched,
    TargetCleared,
    TargetLoaded,
    TargetVerified,
    Complete,
    Error,
}

impl WorkflowState {
    /// True once the load step has written to the target.
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            WorkflowState::TargetLoaded | WorkflowState::TargetVerified | WorkflowState::Complete
        )
    }

    /// States from which `verify` and `complete` may run.
    pub fn can_verify(self) -> bool {
        matches!(
            self,
            WorkflowState::TargetLoaded | WorkflowState::TargetVerified
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::SourceIdle => "source-idle",
            WorkflowState::SourceFetched => "source-fetched",
            WorkflowState::TargetCleared => "target-cleared",
            WorkflowState::TargetLoaded => "target-loaded",
            WorkflowState::TargetVerified => "target-verified",
            WorkflowState::Complete => "complete",
            WorkflowState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Result of a workflow step that may be refused.
///
/// A refusal is workflow misuse (a step invoked before its preconditions
/// hold). It is reported as a warning and leaves the state unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Completed(T),
    Refused(String),
}

impl<T> StepOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed(_))
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, StepOutcome::Refused(_))
    }

    /// The step's value, if it ran.
    pub fn completed(self) -> Option<T> {
        match self {
            StepOutcome::Completed(value) => Some(value),
            StepOutcome::Refused(_) => None,
        }
    }

    /// The refusal reason, if it was refused.
    pub fn refusal(&self) -> Option<&str> {
        match self {
            StepOutcome::Completed(_) => None,
            StepOutcome::Refused(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_are_kebab_case() {
        assert_eq!(WorkflowState::default(), WorkflowState::SourceIdle);
        assert_eq!(WorkflowState::TargetVerified.to_string(), "target-verified");
        assert_eq!(
            serde_json::to_value(WorkflowState::SourceFetched).unwrap(),
            "source-fetched"
        );
        let parsed: WorkflowState = serde_json::from_str("\"target-cleared\"").unwrap();
        assert_eq!(parsed, WorkflowState::TargetCleared);
    }

    #[test]
    fn test_loaded_states() {
        assert!(!WorkflowState::TargetCleared.is_loaded());
        assert!(WorkflowState::TargetLoaded.is_loaded());
        assert!(WorkflowState::Complete.is_loaded());
        assert!(WorkflowState::TargetVerified.can_verify());
        assert!(!WorkflowState::Complete.can_verify());
    }

    #[test]
    fn test_step_outcome_accessors() {
        let done: StepOutcome<u32> = StepOutcome::Completed(3);
        assert!(done.is_completed());
        assert_eq!(done.refusal(), None);
        assert_eq!(done.completed(), Some(3));

        let refused: StepOutcome<u32> = StepOutcome::Refused("no source data".to_string());
        assert!(refused.is_refused());
        assert_eq!(refused.refusal(), Some("no source data"));
        assert_eq!(refused.completed(), None);
    }
}
