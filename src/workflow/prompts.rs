//! Step prompt synthesis.
//!
//! A strategy table maps step ids to prompt builders. Five step ids carry
//! dedicated prompts; every other step falls back to a generic
//! continuation prompt built from its title and description. All builders
//! receive the accumulated context of earlier completed steps, serialized
//! deterministically (keys sorted).

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use super::schema::StepDefinition;

/// Everything a prompt builder may draw on.
#[derive(Debug)]
pub struct PromptInput<'a> {
    /// Display name of the running workflow.
    pub workflow_name: &'a str,

    /// The step being executed.
    pub step: &'a StepDefinition,

    /// Results of completed steps, keyed by step id.
    pub context: &'a HashMap<String, String>,
}

type PromptBuilder = fn(&PromptInput<'_>) -> String;

/// Step ids with dedicated prompts.
static BUILDERS: Lazy<HashMap<&'static str, PromptBuilder>> = Lazy::new(|| {
    HashMap::from([
        ("initial-analysis", initial_analysis as PromptBuilder),
        ("validation-letters", validation_letters as PromptBuilder),
        ("affidavit-creation", affidavit_creation as PromptBuilder),
        ("debt-analysis", debt_analysis as PromptBuilder),
        ("instrument-creation", instrument_creation as PromptBuilder),
    ])
});

/// Build the prompt for a step.
pub fn synthesize_prompt(input: &PromptInput<'_>) -> String {
    match BUILDERS.get(input.step.id.as_str()) {
        Some(builder) => builder(input),
        None => default_prompt(input),
    }
}

/// Serialize accumulated context as pretty JSON with sorted keys.
fn serialize_context(context: &HashMap<String, String>) -> String {
    let ordered: BTreeMap<&str, &str> =
        context.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    serde_json::to_string_pretty(&ordered).unwrap_or_else(|_| "{}".to_string())
}

fn initial_analysis(input: &PromptInput<'_>) -> String {
    format!(
        r"As a sovereign law expert, perform comprehensive credit report analysis.

WORKFLOW CONTEXT: Beginning comprehensive credit dispute process
PREVIOUS DATA: {}

ANALYSIS REQUIREMENTS:
1. **UCC Article 3 Violations**: Identify negotiable instrument defects
2. **FCRA Section 611 Issues**: Verification requirement failures
3. **Constitutional Violations**: Due process and equal protection issues
4. **Sovereign Remedies**: Available common law and constitutional protections
5. **Strategic Prioritization**: Rank disputes by likelihood of success

FORMAT: Structured analysis with specific legal citations and recommended actions.",
        serialize_context(input.context)
    )
}

fn validation_letters(input: &PromptInput<'_>) -> String {
    format!(
        r"Generate professional validation letters based on analysis.

WORKFLOW CONTEXT: {}
ANALYSIS RESULTS: {}

LETTER REQUIREMENTS:
- FCRA Section 611 compliant validation demands
- UCC Article 3 defect challenges where applicable
- Constitutional due process assertions
- Sovereign capacity declarations
- 30-day response deadlines
- Specific documentation demands

Generate 3-5 customized validation letters for the highest priority disputes.",
        input.workflow_name,
        serialize_context(input.context)
    )
}

fn affidavit_creation(input: &PromptInput<'_>) -> String {
    format!(
        r"Draft comprehensive legal affidavits for disputed items.

WORKFLOW CONTEXT: {}
PREVIOUS STEPS: {}

AFFIDAVIT REQUIREMENTS:
- Legal format suitable for court filing
- Sovereign capacity and constitutional rights assertions
- Specific factual allegations based on analysis
- UCC and FCRA legal basis citations
- Proper verification and notarization requirements
- Demand for specific remedies

Create 1-3 affidavits covering the most significant disputes.",
        input.workflow_name,
        serialize_context(input.context)
    )
}

fn debt_analysis(input: &PromptInput<'_>) -> String {
    format!(
        r"Analyze debt documentation for UCC compliance defects.

WORKFLOW CONTEXT: {}
INPUT DATA: {}

ANALYSIS FOCUS:
1. **Original Contract Review**: Signatures, consideration, meeting of minds
2. **Assignment Chain**: Proper UCC Article 9 assignments and notifications
3. **Standing Issues**: Current creditor's authority to collect
4. **Negotiable Instrument Defects**: UCC Article 3 compliance failures
5. **Statutory Violations**: FDCPA, FCRA, state law infractions

Provide detailed findings with specific UCC citations and recommended challenges.",
        input.workflow_name,
        serialize_context(input.context)
    )
}

fn instrument_creation(input: &PromptInput<'_>) -> String {
    format!(
        r"Create UCC-compliant Bill of Exchange for debt discharge.

WORKFLOW CONTEXT: {}
DEBT ANALYSIS: {}

BILL OF EXCHANGE REQUIREMENTS:
- UCC Article 3 compliance (Sections 3-104, 3-106)
- Proper negotiable instrument format
- Conditional or unconditional payment order
- Specific creditor information and amounts
- Protective endorsement language
- Sovereign capacity assertions

Draft complete bill of exchange ready for execution and tender.",
        input.workflow_name,
        serialize_context(input.context)
    )
}

fn default_prompt(input: &PromptInput<'_>) -> String {
    format!(
        r"Continue {} workflow step: {}

CONTEXT: {}
PREVIOUS DATA: {}

Provide detailed guidance, documentation, and next steps for this phase of the legal process. Include specific actions, timelines, and required documentation.",
        input.workflow_name,
        input.step.title,
        input.step.description,
        serialize_context(input.context)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: &str, title: &str, description: &str) -> StepDefinition {
        StepDefinition {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_specialized_ids_get_dedicated_prompts() {
        let context = HashMap::new();
        let cases = [
            ("initial-analysis", "UCC Article 3 Violations"),
            ("validation-letters", "LETTER REQUIREMENTS"),
            ("affidavit-creation", "AFFIDAVIT REQUIREMENTS"),
            ("debt-analysis", "ANALYSIS FOCUS"),
            ("instrument-creation", "BILL OF EXCHANGE REQUIREMENTS"),
        ];

        for (id, marker) in cases {
            let step = step(id, "Title", "Description");
            let input =
                PromptInput { workflow_name: "Some Process", step: &step, context: &context };
            let prompt = synthesize_prompt(&input);
            assert!(prompt.contains(marker), "{id} missing marker {marker:?}");
        }
    }

    #[test]
    fn test_unknown_id_gets_default_prompt() {
        let context = HashMap::new();
        let step = step("tender-process", "Tender Documentation", "Prepare lawful tender offer");
        let input =
            PromptInput { workflow_name: "Bill of Exchange Debt Discharge", step: &step, context: &context };

        let prompt = synthesize_prompt(&input);

        assert!(prompt
            .contains("Continue Bill of Exchange Debt Discharge workflow step: Tender Documentation"));
        assert!(prompt.contains("CONTEXT: Prepare lawful tender offer"));
    }

    #[test]
    fn test_empty_context_serializes_as_empty_object() {
        let context = HashMap::new();
        let step = step("follow-up-strategy", "Follow-up Strategy", "Plan follow-up");
        let input = PromptInput { workflow_name: "W", step: &step, context: &context };

        assert!(synthesize_prompt(&input).contains("{}"));
    }

    #[test]
    fn test_context_keys_are_sorted() {
        let mut context = HashMap::new();
        context.insert("zebra-step".to_string(), "late".to_string());
        context.insert("alpha-step".to_string(), "early".to_string());

        let step = step("anything", "Anything", "d");
        let input = PromptInput { workflow_name: "W", step: &step, context: &context };
        let prompt = synthesize_prompt(&input);

        let alpha = prompt.find("alpha-step").unwrap();
        let zebra = prompt.find("zebra-step").unwrap();
        assert!(alpha < zebra);
    }

    #[test]
    fn test_context_values_reach_specialized_prompt() {
        let mut context = HashMap::new();
        context.insert("debt-analysis".to_string(), "three defects found".to_string());

        let step = step("instrument-creation", "Create Bill of Exchange", "d");
        let input = PromptInput { workflow_name: "W", step: &step, context: &context };

        assert!(synthesize_prompt(&input).contains("three defects found"));
    }
}
