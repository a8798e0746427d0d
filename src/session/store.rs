//! Session store: the active account and its documents.
//!
//! One `SessionStore` is constructed at startup and passed explicitly to
//! whatever needs it (CLI commands, the workflow engine). There is no
//! ambient global session. Construction restores the persisted active
//! account, mirroring how the app greets a returning user.
//!
//! Every document mutation immediately persists the account's full list;
//! a crash between the in-memory change and the write loses at most that
//! one change, which is this store's accepted durability class.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::{self, ContentStore, StoreError};

use super::account::{normalize_email, Account, StoredCredential};
use super::documents::{Document, DocumentKind};

/// Registry of all credentials, keyed implicitly by normalized email.
const KEY_ACCOUNTS: &str = "accounts";

/// Pointer to the currently signed-in account.
const KEY_SESSION: &str = "session";

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Registration with an email that already exists in the registry.
    #[error("an account with email '{0}' already exists")]
    EmailTaken(String),

    /// Login with an unknown email or a wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Durable storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Filesystem failure while exporting a document.
    #[error("failed to export document: {source}")]
    Export {
        #[source]
        source: std::io::Error,
    },
}

/// The active account and its document list, backed by durable storage.
pub struct SessionStore {
    store: Box<dyn ContentStore>,
    active: Option<Account>,
    documents: Vec<Document>,
}

impl SessionStore {
    /// Open a session store and restore any persisted sign-in.
    ///
    /// A corrupt or unreadable session pointer degrades to signed-out
    /// rather than failing startup.
    pub fn new(store: Box<dyn ContentStore>) -> Self {
        let mut session = Self { store, active: None, documents: Vec::new() };

        match store::read_json::<Account>(session.store.as_ref(), KEY_SESSION) {
            Ok(Some(account)) => {
                session.documents = session.load_documents(&account.id);
                session.active = Some(account);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not restore previous session, starting signed out");
            }
        }

        session
    }

    /// The signed-in account, if any.
    pub fn active_account(&self) -> Option<&Account> {
        self.active.as_ref()
    }

    /// Whether an account is signed in.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    // --- Registration and login ---

    /// Register a new account and sign it in.
    ///
    /// Fails with [`SessionError::EmailTaken`] if the email (after
    /// normalization) is already registered, leaving all state untouched.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> SessionResult<Account> {
        let normalized = normalize_email(email);
        let mut registry = self.load_registry()?;

        if registry.iter().any(|cred| cred.account.email == normalized) {
            return Err(SessionError::EmailTaken(normalized));
        }

        let account = Account::new(name, normalized);
        registry.push(StoredCredential::digest(account.clone(), password));
        store::write_json(self.store.as_mut(), KEY_ACCOUNTS, &registry)?;

        self.activate(account.clone(), Vec::new())?;
        tracing::info!(account = %account.id, "registered new account");
        Ok(account)
    }

    /// Sign in with an email and password.
    ///
    /// The same [`SessionError::InvalidCredentials`] is returned for an
    /// unknown email and for a wrong password; no partial session state is
    /// created on failure.
    pub fn login(&mut self, email: &str, password: &str) -> SessionResult<Account> {
        let normalized = normalize_email(email);
        let registry = self.load_registry()?;

        let credential = registry
            .iter()
            .find(|cred| cred.account.email == normalized)
            .filter(|cred| cred.verify(password))
            .ok_or(SessionError::InvalidCredentials)?;

        let account = credential.account.clone();
        let documents = self.load_documents(&account.id);
        self.activate(account.clone(), documents)?;
        tracing::info!(account = %account.id, "signed in");
        Ok(account)
    }

    /// Sign out: clear the active account and in-memory documents.
    ///
    /// The credential registry and the per-account document storage are
    /// left intact; a later login restores them.
    pub fn logout(&mut self) -> SessionResult<()> {
        if let Some(account) = self.active.take() {
            tracing::info!(account = %account.id, "signed out");
        }
        self.documents.clear();
        self.store.remove(KEY_SESSION)?;
        Ok(())
    }

    // --- Document operations (no-ops while signed out) ---

    /// Documents of the active account, most recent first.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Look up a document by id.
    pub fn find_document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Documents whose title or content matches a case-insensitive term.
    pub fn search_documents(&self, term: &str) -> Vec<&Document> {
        self.documents.iter().filter(|doc| doc.matches(term)).collect()
    }

    /// Save a new document for the active account.
    ///
    /// Returns `Ok(None)` while signed out. Repeated saves with the same
    /// title are allowed and create distinct documents.
    pub fn save_document(
        &mut self,
        title: &str,
        kind: DocumentKind,
        content: &str,
    ) -> SessionResult<Option<Document>> {
        let Some(account_id) = self.active.as_ref().map(|a| a.id.clone()) else {
            return Ok(None);
        };

        let document = Document::new(title, kind, content);
        self.documents.insert(0, document.clone());
        self.persist_documents(&account_id)?;
        tracing::debug!(document = %document.id, kind = %kind, "saved document");
        Ok(Some(document))
    }

    /// Replace a document's title and content and refresh its edit time.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown or no
    /// account is signed in.
    pub fn update_document(&mut self, id: &str, title: &str, content: &str) -> SessionResult<bool> {
        let Some(account_id) = self.active.as_ref().map(|a| a.id.clone()) else {
            return Ok(false);
        };

        let Some(document) = self.documents.iter_mut().find(|doc| doc.id == id) else {
            return Ok(false);
        };

        document.title = title.to_string();
        document.content = content.to_string();
        document.updated_at = chrono::Utc::now();

        self.persist_documents(&account_id)?;
        Ok(true)
    }

    /// Delete a document by id. Returns `false` when nothing matched.
    pub fn delete_document(&mut self, id: &str) -> SessionResult<bool> {
        let Some(account_id) = self.active.as_ref().map(|a| a.id.clone()) else {
            return Ok(false);
        };

        let before = self.documents.len();
        self.documents.retain(|doc| doc.id != id);
        if self.documents.len() == before {
            return Ok(false);
        }

        self.persist_documents(&account_id)?;
        Ok(true)
    }

    /// Write a document's content to `<dir>/<sanitized title>.txt`.
    ///
    /// Returns `Ok(None)` when the id is unknown (or signed out).
    pub fn export_document(&self, id: &str, dir: &Path) -> SessionResult<Option<PathBuf>> {
        let Some(document) = self.find_document(id) else {
            return Ok(None);
        };

        let path = dir.join(format!("{}.txt", filename_stem(&document.title)));
        std::fs::write(&path, &document.content)
            .map_err(|source| SessionError::Export { source })?;
        Ok(Some(path))
    }

    // --- Internals ---

    fn activate(&mut self, account: Account, documents: Vec<Document>) -> SessionResult<()> {
        store::write_json(self.store.as_mut(), KEY_SESSION, &account)?;
        self.active = Some(account);
        self.documents = documents;
        Ok(())
    }

    fn load_registry(&self) -> SessionResult<Vec<StoredCredential>> {
        Ok(store::read_json(self.store.as_ref(), KEY_ACCOUNTS)?.unwrap_or_default())
    }

    /// Load an account's documents, degrading to an empty list on a
    /// missing or corrupt entry.
    fn load_documents(&self, account_id: &str) -> Vec<Document> {
        match store::read_json(self.store.as_ref(), &documents_key(account_id)) {
            Ok(Some(documents)) => documents,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(account = %account_id, error = %e, "document list unreadable, starting empty");
                Vec::new()
            }
        }
    }

    fn persist_documents(&mut self, account_id: &str) -> SessionResult<()> {
        let key = documents_key(account_id);
        store::write_json(self.store.as_mut(), &key, &self.documents)?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("active", &self.active)
            .field("documents", &self.documents.len())
            .finish()
    }
}

fn documents_key(account_id: &str) -> String {
    format!("documents/{account_id}")
}

/// Reduce a title to a filesystem-safe file stem.
fn filename_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') { c } else { '-' })
        .collect();
    let trimmed = stem.trim().to_string();
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn empty_session() -> SessionStore {
        SessionStore::new(Box::new(MemoryStore::new()))
    }

    fn signed_in_session() -> SessionStore {
        let mut session = empty_session();
        session.register("Ada Lovelace", "ada@example.com", "correct horse").unwrap();
        session
    }

    #[test]
    fn test_register_signs_in() {
        let mut session = empty_session();
        let account = session.register("Ada", "ada@example.com", "pw").unwrap();

        assert!(session.is_active());
        assert_eq!(session.active_account().unwrap().id, account.id);
        assert!(session.documents().is_empty());
    }

    #[test]
    fn test_register_duplicate_email_fails() {
        let mut session = empty_session();
        session.register("Ada", "ada@example.com", "pw1").unwrap();

        let result = session.register("Imposter", "ADA@example.com ", "pw2");
        assert!(matches!(result, Err(SessionError::EmailTaken(_))));
    }

    #[test]
    fn test_login_round_trip() {
        let mut session = empty_session();
        let registered = session.register("Ada", "ada@example.com", "pw").unwrap();
        session.logout().unwrap();
        assert!(!session.is_active());

        let logged_in = session.login("ada@example.com", "pw").unwrap();
        assert_eq!(logged_in.id, registered.id);
    }

    #[test]
    fn test_login_wrong_password_fails() {
        let mut session = empty_session();
        session.register("Ada", "ada@example.com", "pw").unwrap();
        session.logout().unwrap();

        assert!(matches!(
            session.login("ada@example.com", "wrong"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(matches!(
            session.login("nobody@example.com", "pw"),
            Err(SessionError::InvalidCredentials)
        ));
        assert!(!session.is_active());
    }

    #[test]
    fn test_documents_are_noops_while_signed_out() {
        let mut session = empty_session();

        assert!(session.save_document("T", DocumentKind::Analysis, "c").unwrap().is_none());
        assert!(!session.update_document("any", "T", "c").unwrap());
        assert!(!session.delete_document("any").unwrap());
        assert!(session.documents().is_empty());
    }

    #[test]
    fn test_save_prepends_most_recent_first() {
        let mut session = signed_in_session();
        session.save_document("first", DocumentKind::Analysis, "1").unwrap();
        session.save_document("second", DocumentKind::Affidavit, "2").unwrap();

        let titles: Vec<_> = session.documents().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_update_changes_fields_and_keeps_id() {
        let mut session = signed_in_session();
        let doc = session.save_document("Draft", DocumentKind::Template, "old").unwrap().unwrap();

        assert!(session.update_document(&doc.id, "Final", "new").unwrap());

        let updated = session.find_document(&doc.id).unwrap();
        assert_eq!(updated.id, doc.id);
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.content, "new");
        assert!(updated.updated_at >= doc.updated_at);
        assert_eq!(updated.created_at, doc.created_at);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut session = signed_in_session();
        session.save_document("Draft", DocumentKind::Template, "x").unwrap();

        assert!(!session.update_document("missing", "T", "c").unwrap());
        assert_eq!(session.documents()[0].title, "Draft");
    }

    #[test]
    fn test_delete_removes_document() {
        let mut session = signed_in_session();
        let doc = session.save_document("Draft", DocumentKind::Template, "x").unwrap().unwrap();

        assert!(session.delete_document(&doc.id).unwrap());
        assert!(session.find_document(&doc.id).is_none());
        assert!(!session.delete_document(&doc.id).unwrap());
    }

    #[test]
    fn test_documents_survive_logout_login() {
        let mut session = signed_in_session();
        session.save_document("Kept", DocumentKind::Workflow, "body").unwrap();

        session.logout().unwrap();
        assert!(session.documents().is_empty());

        session.login("ada@example.com", "correct horse").unwrap();
        assert_eq!(session.documents().len(), 1);
        assert_eq!(session.documents()[0].title, "Kept");
    }

    #[test]
    fn test_documents_are_scoped_per_account() {
        let mut session = empty_session();
        session.register("Ada", "ada@example.com", "pw").unwrap();
        session.save_document("Ada's", DocumentKind::Analysis, "a").unwrap();
        session.logout().unwrap();

        session.register("Grace", "grace@example.com", "pw").unwrap();
        assert!(session.documents().is_empty());

        session.save_document("Grace's", DocumentKind::Analysis, "g").unwrap();
        session.logout().unwrap();

        session.login("ada@example.com", "pw").unwrap();
        let titles: Vec<_> = session.documents().iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Ada's"]);
    }

    #[test]
    fn test_search_documents() {
        let mut session = signed_in_session();
        session.save_document("Validation Letter", DocumentKind::Analysis, "FCRA basis").unwrap();
        session.save_document("Lien Notice", DocumentKind::Workflow, "UCC-1 filing").unwrap();

        let hits = session.search_documents("ucc");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Lien Notice");
    }

    #[test]
    fn test_export_document_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = signed_in_session();
        let doc =
            session.save_document("Tender: Offer #1", DocumentKind::Workflow, "body").unwrap().unwrap();

        let path = session.export_document(&doc.id, dir.path()).unwrap().unwrap();
        assert!(path.ends_with("Tender- Offer -1.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "body");

        assert!(session.export_document("missing", dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_session_restores_from_store() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = crate::store::FileStore::with_root(dir.path());
            let mut session = SessionStore::new(Box::new(store));
            session.register("Ada", "ada@example.com", "pw").unwrap();
            session.save_document("Persisted", DocumentKind::Analysis, "x").unwrap();
        }

        let store = crate::store::FileStore::with_root(dir.path());
        let session = SessionStore::new(Box::new(store));

        assert!(session.is_active());
        assert_eq!(session.active_account().unwrap().email, "ada@example.com");
        assert_eq!(session.documents().len(), 1);
    }

    #[test]
    fn test_logout_keeps_registry() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = crate::store::FileStore::with_root(dir.path());
            let mut session = SessionStore::new(Box::new(store));
            session.register("Ada", "ada@example.com", "pw").unwrap();
            session.logout().unwrap();
        }

        let store = crate::store::FileStore::with_root(dir.path());
        let mut session = SessionStore::new(Box::new(store));

        assert!(!session.is_active());
        assert!(session.login("ada@example.com", "pw").is_ok());
    }
}
