//! Credit-report dispute flow.
//!
//! One-shot generation outside the step engine: the user's credit report
//! is validated, attached to a fixed expert-analysis prompt, and sent
//! through the gateway. A follow-up call drafts an affidavit of truth
//! from the report plus the produced analysis.

mod report;

pub use report::{ReportFile, MAX_REPORT_BYTES, MAX_REPORT_NAME_CHARS};

use thiserror::Error;

use crate::ai::{AiError, GenerateProvider, GenerateRequest};

/// Result type for dispute operations.
pub type DisputeResult<T> = Result<T, DisputeError>;

/// Errors that can occur in the dispute flow.
#[derive(Debug, Error)]
pub enum DisputeError {
    /// Only `.txt` and `.pdf` reports are accepted.
    #[error("unsupported file type '{0}'; upload a .txt or .pdf file")]
    UnsupportedType(String),

    /// The report exceeds the size cap.
    #[error("file too large ({size} bytes); the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// The report's file name exceeds the length cap.
    #[error("file name too long ({len} characters); the limit is {limit}")]
    NameTooLong { len: usize, limit: usize },

    /// The report could not be read from disk.
    #[error("could not read report file: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    /// The gateway call failed.
    #[error(transparent)]
    Generation(#[from] AiError),
}

const ANALYSIS_PROMPT: &str = r"You are an expert sovereign law analyst specializing in UCC Articles 3, 4, and 9, FCRA compliance, and commercial redemption processes.

ANALYZE this credit report with the following sovereign perspective:

## Legal Framework Analysis
- **UCC Article 3**: Negotiable instruments and lawful tender principles
- **FCRA Sections 604-621**: Verification requirements and dispute procedures
- **15 USC 1692**: Fair Debt Collection Practices
- **Sovereign Status**: Rights under common law and constitutional protections

## Required Analysis Points:
1. **Verification Deficiencies**: Items lacking proper validation under FCRA 611
2. **UCC Violations**: Debts that may be dischargeable through proper endorsement
3. **Statutory Violations**: FDCPA or state law infractions
4. **Sovereign Remedies**: Constitutional rights and common law protections
5. **Commercial Defects**: Missing signatures, improper assignments, lack of consideration

## For Each Disputed Item, Provide:
- **Legal Basis**: Specific statute or common law principle
- **Sovereign Strategy**: How to approach from position of sovereignty
- **Action Steps**: Concrete steps for lawful remedy
- **Documentation**: What evidence to demand from creditors

Format as structured markdown with clear sections and actionable intelligence for someone exercising their sovereign rights within lawful commercial processes.";

const AFFIDAVIT_PROMPT: &str = r"Draft a comprehensive AFFIDAVIT OF TRUTH for credit dispute based on sovereign law principles and the provided analysis.

## Required Legal Structure:

### HEADER
- Title: 'AFFIDAVIT OF TRUTH AND DEMAND FOR VERIFICATION'
- Jurisdiction statement (constitutional)
- Sovereign capacity declaration

### AFFIANT IDENTIFICATION
- Use placeholders: [Your Full Name], [Your Address], [State/County]
- Statement of competency and first-hand knowledge
- Declaration of sovereign capacity and rights reserved

### FACTUAL ALLEGATIONS (Based on Analysis)
For each disputed item, structure as:
- **ITEM [N]**: [Creditor Name - Account]
- **FACTS**: Specific deficiencies found
- **LEGAL BASIS**: UCC/FCRA/Constitutional violation
- **DEMAND**: Specific remedy requested

### VERIFICATION DEMANDS
- Proper UCC-compliant documentation
- Original wet-ink signature instruments
- Chain of title/assignment documentation
- Proof of consideration and standing

### CONSTITUTIONAL PROTECTIONS
- Due process requirements (5th/14th Amendments)
- Right to face accuser and examine evidence
- Presumption of innocence until proven otherwise
- Protection against bills of attainder

### SOVEREIGN DECLARATIONS
- Acting in sovereign capacity, not as debtor
- Rights reserved under common law
- No admission of liability or corporate personhood
- All rights reserved without prejudice

### CLOSING
- Notarization requirements
- Verification under penalty of perjury
- Time limits for response (30 days)
- Statement of remedy if no proper response

Create a professional, legally-sound document ready for notarization and service. Use formal legal language appropriate for court filing if necessary.";

/// Run the expert analysis over a validated report.
pub async fn analyze_report(
    gateway: &dyn GenerateProvider,
    report: &ReportFile,
) -> DisputeResult<String> {
    let request = GenerateRequest::new(ANALYSIS_PROMPT).with_attachment(report.attachment());
    tracing::debug!(file = %report.name(), "analyzing credit report");
    Ok(gateway.generate(&request).await?)
}

/// Draft an affidavit of truth from the report and a prior analysis.
pub async fn draft_affidavit(
    gateway: &dyn GenerateProvider,
    report: &ReportFile,
    analysis: &str,
) -> DisputeResult<String> {
    let prompt = format!("{AFFIDAVIT_PROMPT}\n\nPREVIOUS ANALYSIS:\n---\n{analysis}");
    let request = GenerateRequest::new(prompt).with_attachment(report.attachment());
    tracing::debug!(file = %report.name(), "drafting dispute affidavit");
    Ok(gateway.generate(&request).await?)
}

/// Auto-save title for an analysis of `report`.
pub fn analysis_title(report: &ReportFile) -> String {
    format!("Credit Analysis - {} - {}", report.name(), chrono::Utc::now().format("%Y-%m-%d"))
}

/// Auto-save title for an affidavit drafted from `report`.
pub fn affidavit_title(report: &ReportFile) -> String {
    format!("Dispute Affidavit - {} - {}", report.name(), chrono::Utc::now().format("%Y-%m-%d"))
}
