//! Built-in workflow catalog.
//!
//! Parses the embedded YAML catalog once and serves definitions by id.

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::schema::WorkflowDefinition;

const CATALOG_YAML: &str = include_str!("catalog.yaml");

/// All built-in workflows, in catalog order.
static CATALOG: Lazy<Vec<WorkflowDefinition>> = Lazy::new(|| {
    // The embedded catalog is validated by tests; a parse failure here is
    // a build defect, not a runtime condition.
    match parse_catalog_str(CATALOG_YAML) {
        Ok(workflows) => workflows,
        Err(e) => panic!("embedded workflow catalog is invalid: {e}"),
    }
});

/// Top-level document shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    workflows: Vec<WorkflowDefinition>,
}

/// Get the built-in workflow catalog.
pub fn catalog() -> &'static [WorkflowDefinition] {
    &CATALOG
}

/// Look up a workflow definition by id.
pub fn find_definition(id: &str) -> Option<&'static WorkflowDefinition> {
    CATALOG.iter().find(|workflow| workflow.id == id)
}

/// Parse a workflow catalog from a string.
pub fn parse_catalog_str(content: &str) -> anyhow::Result<Vec<WorkflowDefinition>> {
    let file: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&file.workflows)?;
    Ok(file.workflows)
}

/// Validate a catalog for common errors.
fn validate_catalog(workflows: &[WorkflowDefinition]) -> anyhow::Result<()> {
    if workflows.is_empty() {
        anyhow::bail!("Catalog must contain at least one workflow");
    }

    for (i, workflow) in workflows.iter().enumerate() {
        if workflow.id.is_empty() {
            anyhow::bail!("Workflow {} has no id", i + 1);
        }
        if workflow.name.is_empty() {
            anyhow::bail!("Workflow '{}' has no name", workflow.id);
        }
        if workflow.steps.is_empty() {
            anyhow::bail!("Workflow '{}' has no steps", workflow.id);
        }

        for (j, step) in workflow.steps.iter().enumerate() {
            if step.id.is_empty() {
                anyhow::bail!("Workflow '{}' step {} has no id", workflow.id, j + 1);
            }
            if step.title.is_empty() {
                anyhow::bail!("Workflow '{}' step '{}' has no title", workflow.id, step.id);
            }
        }

        for (j, step) in workflow.steps.iter().enumerate() {
            if workflow.steps[..j].iter().any(|prior| prior.id == step.id) {
                anyhow::bail!("Workflow '{}' has duplicate step id '{}'", workflow.id, step.id);
            }
        }
    }

    for (i, workflow) in workflows.iter().enumerate() {
        if workflows[..i].iter().any(|prior| prior.id == workflow.id) {
            anyhow::bail!("Duplicate workflow id '{}'", workflow.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::schema::WorkflowCategory;

    #[test]
    fn test_builtin_catalog_parses() {
        let workflows = catalog();
        assert_eq!(workflows.len(), 3);
        assert!(workflows.iter().all(|w| w.step_count() == 5));
    }

    #[test]
    fn test_builtin_catalog_ids() {
        assert!(find_definition("comprehensive-credit-dispute").is_some());
        assert!(find_definition("bill-of-exchange-discharge").is_some());
        assert!(find_definition("commercial-lien-process").is_some());
        assert!(find_definition("unknown-workflow").is_none());
    }

    #[test]
    fn test_builtin_catalog_categories() {
        let discharge = find_definition("bill-of-exchange-discharge").unwrap();
        assert_eq!(discharge.category, WorkflowCategory::DebtDischarge);
        assert_eq!(discharge.steps[0].id, "debt-analysis");
        assert_eq!(discharge.steps[1].id, "instrument-creation");
    }

    #[test]
    fn test_parse_empty_catalog_fails() {
        let result = parse_catalog_str("workflows: []\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_workflow_without_steps_fails() {
        let yaml = r#"
workflows:
  - id: empty
    name: Empty
    description: No steps
    category: credit-dispute
    steps: []
"#;

        let result = parse_catalog_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_duplicate_step_ids_fails() {
        let yaml = r#"
workflows:
  - id: doubled
    name: Doubled
    description: Step id repeats
    category: credit-dispute
    steps:
      - id: one
        title: One
        description: first
      - id: one
        title: One Again
        description: second
"#;

        let result = parse_catalog_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_duplicate_workflow_ids_fails() {
        let yaml = r#"
workflows:
  - id: same
    name: First
    description: a
    category: credit-dispute
    steps:
      - id: s1
        title: S1
        description: d
  - id: same
    name: Second
    description: b
    category: debt-discharge
    steps:
      - id: s1
        title: S1
        description: d
"#;

        let result = parse_catalog_str(yaml);
        assert!(result.is_err());
    }
}
