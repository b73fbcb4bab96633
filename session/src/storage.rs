//! Durable session storage.
//!
//! The session survives process restarts through a small string key/value
//! store holding three entries: the access token, the refresh token and the
//! serialized user identity. [`FileStorage`] keeps them in a JSON file;
//! [`MemoryStorage`] keeps them in process for tests and throwaway sessions.

use expohub_client::{AuthResponse, TokenSource, UserIdentity};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Bearer token.
    pub const ACCESS_TOKEN: &str = "access_token";
    /// Refresh token.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Serialized [`UserIdentity`](expohub_client::UserIdentity).
    pub const USER: &str = "user";

    /// Every key the session owns.
    pub const ALL: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, USER];
}

/// Storage failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Session storage I/O error at {path}: {reason}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        reason: String,
    },

    /// The backing file is not a JSON object of strings.
    #[error("Session storage at {path} is corrupt: {reason}")]
    Corrupt {
        /// File involved.
        path: String,
        /// Parse error.
        reason: String,
    },

    /// A value could not be serialized.
    #[error("Failed to serialize session value: {0}")]
    Serialize(String),
}

/// String key/value store backing the session.
///
/// Implementations are cheap handles: clones share the same underlying data.
pub trait SessionStorage: Send + Sync + Clone + 'static {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ═══════════════════════════════════════════════════════════════════════════
// In-memory storage
// ═══════════════════════════════════════════════════════════════════════════

/// In-process storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no session key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// File storage
// ═══════════════════════════════════════════════════════════════════════════

/// JSON-file storage.
///
/// Every write rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves the previous contents intact. A
/// missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl FileStorage {
    /// Use the file at `path`. Nothing is touched until the first access.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, error: &io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            reason: error.to_string(),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(self.path.as_path()) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(&e)),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `change` to the stored entries and write them back.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Corrupt { path, reason }) => {
                tracing::warn!(%path, %reason, "Discarding corrupt session file");
                BTreeMap::new()
            },
            Err(other) => return Err(other),
        };
        change(&mut entries);

        let body = serde_json::to_string_pretty(&entries)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
        }

        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, body).map_err(|e| self.io_error(&e))?;
        fs::rename(&temp, self.path.as_path()).map_err(|e| self.io_error(&e))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Persisted session
// ═══════════════════════════════════════════════════════════════════════════

/// The session fields that outlive the process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSession {
    /// Access token.
    pub token: Option<String>,
    /// Refresh token.
    pub refresh_token: Option<String>,
    /// Last known identity.
    pub user: Option<UserIdentity>,
}

impl PersistedSession {
    /// Read the persisted session.
    ///
    /// An unreadable identity is dropped with a warning; the tokens still
    /// load.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage itself cannot be read.
    pub fn load<S: SessionStorage>(storage: &S) -> Result<Self, StorageError> {
        let token = non_empty(storage.get(keys::ACCESS_TOKEN)?);
        let refresh_token = non_empty(storage.get(keys::REFRESH_TOKEN)?);
        let user = storage
            .get(keys::USER)?
            .and_then(|raw| match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    tracing::warn!(%error, "Ignoring unreadable stored user");
                    None
                },
            });

        Ok(Self {
            token,
            refresh_token,
            user,
        })
    }

    /// Persist a successful login.
    ///
    /// Either every key is written or none is: on a failed write the keys
    /// already written are cleared again, so a restart never finds a token
    /// without its user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if any field cannot be written.
    pub fn save<S: SessionStorage>(storage: &S, auth: &AuthResponse) -> Result<(), StorageError> {
        let written = storage
            .set(keys::ACCESS_TOKEN, &auth.access)
            .and_then(|()| {
                if auth.refresh.is_empty() {
                    storage.remove(keys::REFRESH_TOKEN)
                } else {
                    storage.set(keys::REFRESH_TOKEN, &auth.refresh)
                }
            })
            .and_then(|()| Self::save_user(storage, &auth.user));

        if let Err(error) = &written {
            tracing::warn!(%error, "Session write failed, rolling back");
            if let Err(cleanup) = Self::clear(storage) {
                tracing::error!(error = %cleanup, "Could not roll back partial session");
            }
        }
        written
    }

    /// Persist an updated identity.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the identity cannot be serialized or written.
    pub fn save_user<S: SessionStorage>(
        storage: &S,
        user: &UserIdentity,
    ) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(user).map_err(|e| StorageError::Serialize(e.to_string()))?;
        storage.set(keys::USER, &raw)
    }

    /// Remove every session key.
    ///
    /// All keys are attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] encountered.
    pub fn clear<S: SessionStorage>(storage: &S) -> Result<(), StorageError> {
        keys::ALL
            .iter()
            .map(|key| storage.remove(key))
            .fold(Ok(()), |first, result| first.and(result))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Bearer token source reading the stored access token on every request.
///
/// Lets the API client and the session share one source of truth: a logout
/// that clears storage is seen by the very next request.
#[derive(Debug, Clone)]
pub struct StoredToken<S>(pub S);

impl<S: SessionStorage> TokenSource for StoredToken<S> {
    fn access_token(&self) -> Option<String> {
        match self.0.get(keys::ACCESS_TOKEN) {
            Ok(token) => non_empty(token),
            Err(error) => {
                tracing::warn!(%error, "Could not read access token");
                None
            },
        }
    }
}
