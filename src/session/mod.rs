//! Accounts, sign-in state, and per-account document storage.

pub mod account;
pub mod documents;
pub mod store;

pub use account::{normalize_email, Account, StoredCredential};
pub use documents::{Document, DocumentKind};
pub use store::{SessionError, SessionResult, SessionStore};
