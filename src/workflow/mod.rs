//! Guided document workflows.
//!
//! The catalog holds immutable workflow definitions; a [`WorkflowRun`]
//! tracks one live execution of a definition; the [`WorkflowEngine`]
//! sequences step execution through the generation gateway.

pub mod catalog;
pub mod engine;
pub mod prompts;
pub mod run;
pub mod schema;

pub use catalog::{catalog, find_definition};
pub use engine::{EngineError, RefusalReason, StepOutcome, WorkflowEngine};
pub use prompts::{synthesize_prompt, PromptInput};
pub use run::{StepState, StepStatus, WorkflowRun};
pub use schema::{StepDefinition, WorkflowCategory, WorkflowDefinition};
