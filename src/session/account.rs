//! Account identity and credential records.
//!
//! An [`Account`] is what the rest of the application sees; credential
//! material only ever lives in [`StoredCredential`] inside the durable
//! registry, as a salted SHA-256 digest. Plaintext passwords are accepted
//! at the register/login boundary and dropped immediately after digesting.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// A registered identity, stripped of any credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account id
    pub id: String,

    /// Display name
    pub name: String,

    /// Normalized (trimmed, lowercased) email; unique across the registry
    pub email: String,

    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh account with a new unique id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: normalize_email(&email.into()),
            created_at: Utc::now(),
        }
    }
}

/// One entry of the durable credential registry.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// The account this credential authenticates
    pub account: Account,

    /// Per-account random salt, hex-encoded
    pub salt: String,

    /// `SHA-256(salt || password)`, hex-encoded
    pub password_hash: String,
}

impl StoredCredential {
    /// Digest a plaintext password into a registry entry for `account`.
    pub fn digest(account: Account, password: &str) -> Self {
        let salt = generate_salt();
        let password_hash = digest_password(&salt, password);
        Self { account, salt, password_hash }
    }

    /// Check a plaintext password against the stored digest.
    pub fn verify(&self, password: &str) -> bool {
        digest_password(&self.salt, password) == self.password_hash
    }
}

// Keep digests out of logs
impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("account", &self.account)
            .field("salt", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Normalize an email for registry lookups: trim and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Generate a 16-byte random salt, hex-encoded.
fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Compute the salted password digest.
fn digest_password(salt: &str, password: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let result = hasher.finalize();

    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_ids_are_unique() {
        let a = Account::new("Ada", "ada@example.com");
        let b = Account::new("Ada", "ada2@example.com");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_email_is_normalized_on_creation() {
        let account = Account::new("Ada", "  Ada@Example.COM ");
        assert_eq!(account.email, "ada@example.com");
    }

    #[test]
    fn test_digest_and_verify() {
        let account = Account::new("Ada", "ada@example.com");
        let cred = StoredCredential::digest(account, "hunter2");

        assert!(cred.verify("hunter2"));
        assert!(!cred.verify("HUNTER2"));
        assert!(!cred.verify(""));
    }

    #[test]
    fn test_salts_differ_between_accounts() {
        let a = StoredCredential::digest(Account::new("A", "a@example.com"), "same");
        let b = StoredCredential::digest(Account::new("B", "b@example.com"), "same");

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn test_debug_redacts_credential_material() {
        let cred = StoredCredential::digest(Account::new("A", "a@example.com"), "secret");
        let rendered = format!("{cred:?}");

        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains(&cred.password_hash));
        assert!(!rendered.contains(&cred.salt));
    }
}
