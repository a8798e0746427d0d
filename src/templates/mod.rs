//! Static fill-in document templates.
//!
//! Ready-to-customize legal letter bodies with `[placeholder]` fields.
//! A signed-in user can save a copy of a template into their documents
//! and edit it from there.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const TEMPLATES_YAML: &str = include_str!("templates.yaml");

/// A fill-in document template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    /// Stable identifier, e.g. `bill-of-exchange`
    pub id: String,

    /// Display name
    pub name: String,

    /// What the template is for
    pub description: String,

    /// Template category
    pub category: TemplateCategory,

    /// Full body text with `[placeholder]` fields
    pub content: String,
}

/// Template categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateCategory {
    Credit,
    Commercial,
    Notice,
}

impl TemplateCategory {
    /// Kebab-case label, matching the serialized form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Commercial => "commercial",
            Self::Notice => "notice",
        }
    }
}

impl std::fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    templates: Vec<DocumentTemplate>,
}

static TEMPLATES: Lazy<Vec<DocumentTemplate>> = Lazy::new(|| {
    // The embedded catalog is validated by tests; a parse failure here is
    // a build defect, not a runtime condition.
    match serde_yaml::from_str::<TemplateFile>(TEMPLATES_YAML) {
        Ok(file) => file.templates,
        Err(e) => panic!("embedded template catalog is invalid: {e}"),
    }
});

/// Get all built-in templates, in catalog order.
pub fn templates() -> &'static [DocumentTemplate] {
    &TEMPLATES
}

/// Look up a template by id.
pub fn find_template(id: &str) -> Option<&'static DocumentTemplate> {
    TEMPLATES.iter().find(|template| template.id == id)
}
