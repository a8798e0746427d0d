//! Workflow execution engine.
//!
//! Owns the selected run and drives step execution: admission checks,
//! prompt synthesis, the gateway call, and result accumulation. Gateway
//! failures never propagate; they fold into the step's failed status and
//! the step stays retryable. Successful results are auto-saved as
//! documents when an account is signed in.

use thiserror::Error;

use crate::ai::{GenerateProvider, GenerateRequest};
use crate::session::{DocumentKind, SessionStore};

use super::catalog::find_definition;
use super::prompts::{synthesize_prompt, PromptInput};
use super::run::WorkflowRun;

/// Errors that can occur selecting a workflow.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested id is not in the catalog.
    #[error("unknown workflow '{0}'")]
    UnknownWorkflow(String),
}

/// Why an execution request was refused before anything ran.
///
/// Refusals mutate nothing; the caller may simply try again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// No workflow is currently selected.
    NoRun,
    /// The step index is outside the selected workflow.
    OutOfRange,
    /// The step's predecessor has not completed.
    GatingViolated,
    /// Another step of this run is mid-execution.
    Busy,
}

/// Outcome of one `execute_step` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed; `result` is the generated text.
    Completed { result: String },
    /// The gateway call failed; the step is marked failed and retryable.
    Failed,
    /// The request was refused without touching any state.
    Refused(RefusalReason),
}

/// Executes steps of one selected workflow at a time.
pub struct WorkflowEngine {
    gateway: Box<dyn GenerateProvider>,
    run: Option<WorkflowRun>,
}

impl WorkflowEngine {
    /// Create an engine over a generation gateway. No workflow is
    /// selected yet.
    pub fn new(gateway: Box<dyn GenerateProvider>) -> Self {
        Self { gateway, run: None }
    }

    /// Select a workflow by catalog id, starting a fresh run.
    ///
    /// Selecting while another run exists discards the old run, exactly
    /// like [`clear`](Self::clear) followed by a new selection.
    pub fn select(&mut self, definition_id: &str) -> Result<&WorkflowRun, EngineError> {
        let definition = find_definition(definition_id)
            .ok_or_else(|| EngineError::UnknownWorkflow(definition_id.to_string()))?;
        Ok(self.run.insert(WorkflowRun::new(definition)))
    }

    /// The current run, if a workflow is selected.
    pub fn run(&self) -> Option<&WorkflowRun> {
        self.run.as_ref()
    }

    /// Return the selected run to its initial state. No-op without a run.
    pub fn reset(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.reset();
        }
    }

    /// Discard the selected run. Nothing is persisted; completed step
    /// results already live in the document store if a session was
    /// active when they completed.
    pub fn clear(&mut self) {
        self.run = None;
    }

    /// Execute one step of the selected run.
    ///
    /// Validates admission first: a missing run, an out-of-range index,
    /// a busy run, or an unsatisfied gate all return
    /// [`StepOutcome::Refused`] without mutating anything. Otherwise the
    /// step goes in-progress, the synthesized prompt is sent to the
    /// gateway, and the call resolves to `Completed` or `Failed`.
    pub async fn execute_step(
        &mut self,
        index: usize,
        session: &mut SessionStore,
    ) -> StepOutcome {
        let Some(run) = self.run.as_mut() else {
            return StepOutcome::Refused(RefusalReason::NoRun);
        };
        if index >= run.steps().len() {
            return StepOutcome::Refused(RefusalReason::OutOfRange);
        }
        if run.is_busy() {
            return StepOutcome::Refused(RefusalReason::Busy);
        }
        if !run.step_executable(index) {
            return StepOutcome::Refused(RefusalReason::GatingViolated);
        }

        let definition = run.definition();
        let step = &definition.steps[index];
        run.begin_step(index);

        let prompt = synthesize_prompt(&PromptInput {
            workflow_name: &definition.name,
            step,
            context: run.context(),
        });
        tracing::debug!(workflow = %definition.id, step = %step.id, "executing step");

        match self.gateway.generate(&GenerateRequest::new(prompt)).await {
            Ok(result) => {
                run.complete_step(index, result.clone());
                Self::auto_save(session, &definition.name, &step.title, &result);
                StepOutcome::Completed { result }
            }
            Err(e) => {
                run.fail_step(index);
                tracing::warn!(workflow = %definition.id, step = %step.id, error = %e, "step failed");
                StepOutcome::Failed
            }
        }
    }

    /// Persist a step result as a workflow document for the signed-in
    /// account. Signed-out sessions skip this; a storage failure is
    /// logged and the step still counts as completed.
    fn auto_save(session: &mut SessionStore, workflow_name: &str, step_title: &str, result: &str) {
        if !session.is_active() {
            return;
        }

        let date = chrono::Utc::now().format("%Y-%m-%d");
        let title = format!("{workflow_name} - {step_title} - {date}");
        if let Err(e) = session.save_document(&title, DocumentKind::Workflow, result) {
            tracing::warn!(error = %e, "could not auto-save step result");
        }
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("gateway", &self.gateway.name())
            .field("run", &self.run)
            .finish()
    }
}
