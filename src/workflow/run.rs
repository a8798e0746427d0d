//! Run state for a selected workflow.
//!
//! A `WorkflowRun` pairs a catalog definition with per-step execution
//! state and the accumulated context handed to later prompts. Runs are
//! in-memory only; completed step results become documents through the
//! engine's auto-save, never through run persistence.

use std::collections::HashMap;

use super::schema::WorkflowDefinition;

/// Execution status of a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    /// Kebab-case label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutable state of one step.
///
/// `result` is `Some` exactly while `status` is `Completed`.
#[derive(Debug, Clone, Default)]
pub struct StepState {
    pub status: StepStatus,
    pub result: Option<String>,
}

/// In-memory state of one selected workflow.
#[derive(Debug)]
pub struct WorkflowRun {
    definition: &'static WorkflowDefinition,
    steps: Vec<StepState>,
    context: HashMap<String, String>,
}

impl WorkflowRun {
    /// Start a fresh run: every step pending, no context.
    pub fn new(definition: &'static WorkflowDefinition) -> Self {
        Self {
            definition,
            steps: vec![StepState::default(); definition.steps.len()],
            context: HashMap::new(),
        }
    }

    /// The catalog definition this run executes.
    pub fn definition(&self) -> &'static WorkflowDefinition {
        self.definition
    }

    /// Per-step state, index-aligned with the definition's steps.
    pub fn steps(&self) -> &[StepState] {
        &self.steps
    }

    /// State of one step.
    pub fn step(&self, index: usize) -> Option<&StepState> {
        self.steps.get(index)
    }

    /// Accumulated results of completed steps, keyed by step id.
    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Whether a step may be executed now: the first step always, any
    /// later step only once its predecessor has completed.
    pub fn step_executable(&self, index: usize) -> bool {
        if index >= self.steps.len() {
            return false;
        }
        index == 0 || self.steps[index - 1].status == StepStatus::Completed
    }

    /// Whether any step is currently executing.
    pub fn is_busy(&self) -> bool {
        self.steps.iter().any(|step| step.status == StepStatus::InProgress)
    }

    /// Whether every step has completed.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|step| step.status == StepStatus::Completed)
    }

    /// Number of completed steps.
    pub fn completed_count(&self) -> usize {
        self.steps.iter().filter(|step| step.status == StepStatus::Completed).count()
    }

    /// Return the run to its initial state. Idempotent.
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pending;
            step.result = None;
        }
        self.context.clear();
    }

    /// Mark a step as executing. Its previous result is cleared.
    pub(crate) fn begin_step(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            step.status = StepStatus::InProgress;
            step.result = None;
        }
    }

    /// Record a successful result: status, result text, and the context
    /// entry under the step's id. Re-running a completed step overwrites
    /// its earlier result; later steps are left untouched.
    pub(crate) fn complete_step(&mut self, index: usize, result: String) {
        let Some(step) = self.steps.get_mut(index) else {
            return;
        };
        step.status = StepStatus::Completed;
        step.result = Some(result.clone());
        self.context.insert(self.definition.steps[index].id.clone(), result);
    }

    /// Record a failure. Neither the result slot nor the context gains
    /// anything from a failed execution.
    pub(crate) fn fail_step(&mut self, index: usize) {
        if let Some(step) = self.steps.get_mut(index) {
            step.status = StepStatus::Failed;
            step.result = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::catalog::find_definition;

    fn sample_run() -> WorkflowRun {
        WorkflowRun::new(find_definition("bill-of-exchange-discharge").unwrap())
    }

    #[test]
    fn test_new_run_is_all_pending() {
        let run = sample_run();

        assert_eq!(run.steps().len(), 5);
        assert!(run.steps().iter().all(|s| s.status == StepStatus::Pending));
        assert!(run.steps().iter().all(|s| s.result.is_none()));
        assert!(run.context().is_empty());
        assert!(!run.is_busy());
        assert!(!run.is_complete());
    }

    #[test]
    fn test_gating_first_step_always_executable() {
        let run = sample_run();
        assert!(run.step_executable(0));
        assert!(!run.step_executable(1));
        assert!(!run.step_executable(4));
        assert!(!run.step_executable(5));
    }

    #[test]
    fn test_gating_opens_after_predecessor_completes() {
        let mut run = sample_run();
        run.complete_step(0, "analysis".to_string());

        assert!(run.step_executable(1));
        assert!(!run.step_executable(2));
    }

    #[test]
    fn test_failed_predecessor_keeps_gate_closed() {
        let mut run = sample_run();
        run.fail_step(0);

        assert!(!run.step_executable(1));
        assert!(run.step_executable(0));
    }

    #[test]
    fn test_complete_records_result_and_context() {
        let mut run = sample_run();
        run.begin_step(0);
        assert!(run.is_busy());

        run.complete_step(0, "found defects".to_string());

        let step = run.step(0).unwrap();
        assert_eq!(step.status, StepStatus::Completed);
        assert_eq!(step.result.as_deref(), Some("found defects"));
        assert_eq!(run.context().get("debt-analysis").map(String::as_str), Some("found defects"));
        assert!(!run.is_busy());
    }

    #[test]
    fn test_fail_leaves_result_and_context_empty() {
        let mut run = sample_run();
        run.begin_step(0);
        run.fail_step(0);

        let step = run.step(0).unwrap();
        assert_eq!(step.status, StepStatus::Failed);
        assert!(step.result.is_none());
        assert!(run.context().is_empty());
    }

    #[test]
    fn test_rerun_overwrites_without_touching_later_steps() {
        let mut run = sample_run();
        run.complete_step(0, "v1".to_string());
        run.complete_step(1, "instrument".to_string());

        run.begin_step(0);
        run.complete_step(0, "v2".to_string());

        assert_eq!(run.step(0).unwrap().result.as_deref(), Some("v2"));
        assert_eq!(run.context().get("debt-analysis").map(String::as_str), Some("v2"));
        // Step 1 keeps its completed state and context entry.
        assert_eq!(run.step(1).unwrap().status, StepStatus::Completed);
        assert_eq!(run.context().get("instrument-creation").map(String::as_str), Some("instrument"));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut run = sample_run();
        run.complete_step(0, "a".to_string());
        run.complete_step(1, "b".to_string());
        run.fail_step(2);

        run.reset();
        let after_once: Vec<_> = run.steps().iter().map(|s| s.status).collect();
        assert!(after_once.iter().all(|s| *s == StepStatus::Pending));
        assert!(run.context().is_empty());

        run.reset();
        let after_twice: Vec<_> = run.steps().iter().map(|s| s.status).collect();
        assert_eq!(after_once, after_twice);
        assert!(run.steps().iter().all(|s| s.result.is_none()));
    }

    #[test]
    fn test_completed_count() {
        let mut run = sample_run();
        assert_eq!(run.completed_count(), 0);

        run.complete_step(0, "a".to_string());
        run.complete_step(1, "b".to_string());
        assert_eq!(run.completed_count(), 2);
    }
}
