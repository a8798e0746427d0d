//! Workflow schema definitions.
//!
//! Defines the YAML structure for the built-in workflow catalog.

use serde::{Deserialize, Serialize};

/// A guided multi-step workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Stable identifier, e.g. `bill-of-exchange-discharge`
    pub id: String,

    /// Display name
    pub name: String,

    /// What the workflow walks the user through
    pub description: String,

    /// Remedy category
    pub category: WorkflowCategory,

    /// Ordered steps
    pub steps: Vec<StepDefinition>,
}

/// Workflow categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowCategory {
    CreditDispute,
    DebtDischarge,
    CommercialRemedy,
}

/// A single step of a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Stable identifier, unique within its workflow
    pub id: String,

    /// Display title
    pub title: String,

    /// What the step produces
    pub description: String,
}

impl WorkflowDefinition {
    /// Get the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Find a step's index by id.
    #[must_use]
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }
}

impl WorkflowCategory {
    /// Kebab-case label, matching the serialized form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CreditDispute => "credit-dispute",
            Self::DebtDischarge => "debt-discharge",
            Self::CommercialRemedy => "commercial-remedy",
        }
    }
}

impl std::fmt::Display for WorkflowCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
