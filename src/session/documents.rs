//! Saved document records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a saved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Output of a credit-report analysis
    Analysis,
    /// Drafted affidavit
    Affidavit,
    /// Copy of a fill-in template
    Template,
    /// Result of a workflow step
    Workflow,
}

impl DocumentKind {
    /// Stable lowercase label, matching the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Affidavit => "affidavit",
            Self::Template => "template",
            Self::Workflow => "workflow",
        }
    }

    /// Parse a label back into a kind.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "analysis" => Some(Self::Analysis),
            "affidavit" => Some(Self::Affidavit),
            "template" => Some(Self::Template),
            "workflow" => Some(Self::Workflow),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A titled text artifact owned by exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document id
    pub id: String,

    /// Display title
    pub title: String,

    /// Document kind
    pub kind: DocumentKind,

    /// Full document text
    pub content: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last edit time; equals `created_at` until the first update
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document stamped with the current time.
    pub fn new(title: impl Into<String>, kind: DocumentKind, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            kind,
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether title or content matches a case-insensitive search term.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.content.to_lowercase().contains(&needle)
    }
}
