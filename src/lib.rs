//! # Remedyflow
//!
//! Guided AI workflows for commercial paperwork - credit disputes,
//! negotiable instruments, and affidavits from your terminal.
//!
//! Remedyflow walks a user through multi-step document generation: pick a
//! workflow from the built-in catalog, execute its steps in order, and
//! each step's generated text feeds the prompts of the steps after it.
//! Results are saved to a local, per-account document store.
//!
//! ## Components
//!
//! - [`store`] - durable string-keyed JSON storage
//! - [`session`] - accounts, sign-in state, and per-account documents
//! - [`workflow`] - workflow catalog, run state, and the execution engine
//! - [`ai`] - generation gateway (Gemini, Ollama, fallback chain)
//! - [`dispute`] - one-shot credit report analysis and affidavit drafting
//! - [`templates`] - static fill-in legal document templates
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install remedyflow
//!
//! # List the guided workflows
//! remedyflow workflows list
//!
//! # Or use the short name
//! remy workflows list
//! ```
//!
//! Generated content is not legal advice; Remedyflow makes no claim that
//! any produced document is correct or effective.

pub mod ai;
pub mod config;
pub mod dispute;
pub mod session;
pub mod store;
pub mod templates;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use session::{Account, Document, DocumentKind, SessionError, SessionStore};
pub use store::{ContentStore, FileStore, MemoryStore, StoreError};
pub use workflow::{EngineError, RefusalReason, StepOutcome, StepStatus, WorkflowEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "remedyflow";

/// Short alias
pub const APP_ALIAS: &str = "remy";
