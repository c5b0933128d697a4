//! Durable storage for the single auth token.
//!
//! DESIGN
//! ======
//! Storage is a capability trait so the HTTP client and the session can share
//! one handle and tests can swap in memory. `FileTokenStore` mimics browser
//! key/value storage: a JSON object on disk where the token lives under
//! [`AUTH_TOKEN_KEY`] and unrelated keys survive writes.
//!
//! TRADE-OFFS
//! ==========
//! `get` is synchronous and infallible. An unreadable file is treated as "no
//! token" rather than failing every request; `set` does report I/O errors.
//! There is no locking between processes: last writer wins.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::config::AUTH_TOKEN_KEY;

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token storage I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("token storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("token storage lock poisoned")]
    Poisoned,
}

/// Get/set surface over wherever the token is persisted.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn get(&self) -> Option<String>;

    /// Persist `token`; `None` or an empty string removes it.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenStoreError`] if the backing storage cannot be written.
    fn set(&self, token: Option<&str>) -> Result<(), TokenStoreError>;
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.is_empty())
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.lock().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, token: Option<&str>) -> Result<(), TokenStoreError> {
        let mut guard = self.token.lock().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = non_empty(token).map(ToOwned::to_owned);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Map<String, Value> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token storage unreadable");
                return Map::new();
            }
        };
        if raw.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => entries,
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "token storage is not a JSON object; ignoring");
                Map::new()
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), TokenStoreError> {
        let io_err = |source| TokenStoreError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let rendered = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, rendered).map_err(io_err)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.read_entries()
            .get(AUTH_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(ToOwned::to_owned)
    }

    fn set(&self, token: Option<&str>) -> Result<(), TokenStoreError> {
        let mut entries = self.read_entries();
        match non_empty(token) {
            Some(token) => {
                entries.insert(AUTH_TOKEN_KEY.to_owned(), Value::String(token.to_owned()));
            }
            None => {
                if entries.remove(AUTH_TOKEN_KEY).is_none() && !self.path.exists() {
                    return Ok(());
                }
            }
        }
        self.write_entries(&entries)
    }
}
