//! Per-account credential persistence.
//!
//! Token records are keyed by account email. The file-backed store writes
//! one JSON document per account so two accounts never share a record and a
//! record can be revoked by deleting its file.

use crate::errors::{DriveTransferError, DriveTransferResult, StorageError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable naming the token directory.
pub const TOKEN_DIR_ENV: &str = "DRIVE_TOKEN_DIR";

/// Default token directory when `DRIVE_TOKEN_DIR` is unset.
pub const DEFAULT_TOKEN_DIR: &str = ".drive-transfer/tokens";

/// A persisted OAuth credential for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Access token.
    pub access_token: String,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// Refresh token, when the authorization server issued one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated granted scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl StoredCredential {
    /// Creates a record from freshly issued token material.
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_seconds: Option<i64>,
        scope: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            refresh_token,
            expires_at: expires_in_seconds.map(|s| now + Duration::seconds(s)),
            scope,
            updated_at: now,
        }
    }

    /// Returns true if the access token is expired or has no known expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => true,
        }
    }
}

/// Credential store interface, keyed by account email.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persists the credential for an account, replacing any previous record.
    async fn store(&self, account: &str, credential: StoredCredential)
        -> DriveTransferResult<()>;

    /// Retrieves the credential for an account, `None` when absent.
    async fn retrieve(&self, account: &str) -> DriveTransferResult<Option<StoredCredential>>;

    /// Deletes the credential for an account, returning whether one existed.
    async fn delete(&self, account: &str) -> DriveTransferResult<bool>;

    /// Lists accounts with a stored credential.
    async fn list_accounts(&self) -> DriveTransferResult<Vec<String>>;
}

/// In-memory credential store for tests and ephemeral use.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: Mutex<HashMap<String, StoredCredential>>,
}

impl InMemoryTokenStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn store(
        &self,
        account: &str,
        credential: StoredCredential,
    ) -> DriveTransferResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(account.to_ascii_lowercase(), credential);
        Ok(())
    }

    async fn retrieve(&self, account: &str) -> DriveTransferResult<Option<StoredCredential>> {
        let records = self.records.lock().unwrap();
        Ok(records.get(&account.to_ascii_lowercase()).cloned())
    }

    async fn delete(&self, account: &str) -> DriveTransferResult<bool> {
        let mut records = self.records.lock().unwrap();
        Ok(records.remove(&account.to_ascii_lowercase()).is_some())
    }

    async fn list_accounts(&self) -> DriveTransferResult<Vec<String>> {
        let records = self.records.lock().unwrap();
        Ok(records.keys().cloned().collect())
    }
}

/// File-backed credential store, one JSON document per account.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store rooted at `DRIVE_TOKEN_DIR`, or the default directory.
    pub fn from_env() -> Self {
        let dir = std::env::var(TOKEN_DIR_ENV).unwrap_or_else(|_| DEFAULT_TOKEN_DIR.to_string());
        Self::new(dir)
    }

    /// The directory holding token records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, account: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", sanitize_account(account)))
    }
}

/// Restricts an account key to filename-safe characters.
///
/// `@` and `.` survive so the filename stays recognizable and reversible for
/// ordinary account emails.
fn sanitize_account(account: &str) -> String {
    account
        .trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '@' | '.' | '_' | '-' | '+' => c,
            _ => '_',
        })
        .collect()
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn store(
        &self,
        account: &str,
        credential: StoredCredential,
    ) -> DriveTransferResult<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            DriveTransferError::Storage(StorageError::Io(format!(
                "creating token directory {}: {}",
                self.dir.display(),
                e
            )))
        })?;

        let json = serde_json::to_vec_pretty(&credential).map_err(|e| {
            DriveTransferError::Storage(StorageError::Serialization(format!(
                "encoding token record for {}: {}",
                account, e
            )))
        })?;

        let path = self.record_path(account);
        tokio::fs::write(&path, json).await.map_err(|e| {
            DriveTransferError::Storage(StorageError::Io(format!(
                "writing {}: {}",
                path.display(),
                e
            )))
        })
    }

    async fn retrieve(&self, account: &str) -> DriveTransferResult<Option<StoredCredential>> {
        let path = self.record_path(account);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DriveTransferError::Storage(StorageError::Io(format!(
                    "reading {}: {}",
                    path.display(),
                    e
                ))))
            }
        };

        let credential = serde_json::from_slice(&contents).map_err(|e| {
            DriveTransferError::Storage(StorageError::Serialization(format!(
                "parsing {}: {}",
                path.display(),
                e
            )))
        })?;

        Ok(Some(credential))
    }

    async fn delete(&self, account: &str) -> DriveTransferResult<bool> {
        let path = self.record_path(account);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DriveTransferError::Storage(StorageError::Io(format!(
                "removing {}: {}",
                path.display(),
                e
            )))),
        }
    }

    async fn list_accounts(&self) -> DriveTransferResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DriveTransferError::Storage(StorageError::Io(format!(
                    "listing {}: {}",
                    self.dir.display(),
                    e
                ))))
            }
        };

        let mut accounts = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            DriveTransferError::Storage(StorageError::Io(format!(
                "listing {}: {}",
                self.dir.display(),
                e
            )))
        })? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(account) = name.strip_suffix(".json") {
                accounts.push(account.to_string());
            }
        }

        accounts.sort();
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_credential() -> StoredCredential {
        StoredCredential::new(
            "ya29.sample",
            "Bearer",
            Some("1//refresh".to_string()),
            Some(3600),
            Some("https://www.googleapis.com/auth/drive".to_string()),
        )
    }

    #[test]
    fn test_expiry() {
        let fresh = sample_credential();
        assert!(!fresh.is_expired());

        let stale = StoredCredential::new("tok", "Bearer", None, Some(-10), None);
        assert!(stale.is_expired());

        let unknown = StoredCredential::new("tok", "Bearer", None, None, None);
        assert!(unknown.is_expired());
    }

    #[test]
    fn test_sanitize_account() {
        assert_eq!(sanitize_account("User@Example.com"), "user@example.com");
        assert_eq!(sanitize_account("a b/c\\d:e"), "a_b_c_d_e");
    }

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemoryTokenStore::new();
        store.store("a@x.com", sample_credential()).await.unwrap();

        let retrieved = store.retrieve("A@X.COM").await.unwrap();
        assert_eq!(retrieved.unwrap().access_token, "ya29.sample");

        assert!(store.delete("a@x.com").await.unwrap());
        assert!(store.retrieve("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        assert!(store.retrieve("a@x.com").await.unwrap().is_none());

        store.store("a@x.com", sample_credential()).await.unwrap();
        let retrieved = store.retrieve("a@x.com").await.unwrap().unwrap();
        assert_eq!(retrieved.refresh_token.as_deref(), Some("1//refresh"));

        let accounts = store.list_accounts().await.unwrap();
        assert_eq!(accounts, vec!["a@x.com".to_string()]);

        assert!(store.delete("a@x.com").await.unwrap());
        assert!(!store.delete("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_separate_records_per_account() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.store("a@x.com", sample_credential()).await.unwrap();
        let mut other = sample_credential();
        other.access_token = "ya29.other".to_string();
        store.store("b@x.com", other).await.unwrap();

        let a = store.retrieve("a@x.com").await.unwrap().unwrap();
        let b = store.retrieve("b@x.com").await.unwrap().unwrap();
        assert_ne!(a.access_token, b.access_token);
        assert_eq!(store.list_accounts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());

        store.store("a@x.com", sample_credential()).await.unwrap();
        let path = dir.path().join("a@x.com.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = store.retrieve("a@x.com").await.unwrap_err();
        assert!(matches!(
            err,
            DriveTransferError::Storage(StorageError::Serialization(_))
        ));
    }
}
