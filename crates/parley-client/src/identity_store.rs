//! Persisted identity.
//!
//! The client remembers the last accepted display name so the next start can
//! log in without a prompt. Records carry an absolute expiry; expired records
//! read as absent.
//!
//! The store is synchronous and only touched from the event loop, between
//! state machine steps.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Record name holding the display name.
pub const IDENTITY_KEY: &str = "username";

/// Days a persisted identity stays valid.
pub const IDENTITY_EXPIRY_DAYS: u32 = 7;

/// Identity store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("identity store I/O error at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Backing file is not a valid record map.
    #[error("identity store {path} is corrupt: {source}")]
    Format {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Named string values with expiry.
///
/// # Invariants
///
/// - `get` never returns an expired or empty value.
/// - `delete` of a missing record succeeds.
pub trait IdentityStore: Send {
    /// Value stored under `name`, if present and unexpired at `now`.
    fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError>;

    /// Store `value` under `name`, expiring `expiry_days` after `now`.
    fn set(
        &mut self,
        name: &str,
        value: &str,
        expiry_days: u32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Remove the record under `name`.
    fn delete(&mut self, name: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Record {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Record {
    fn new(value: &str, expiry_days: u32, now: DateTime<Utc>) -> Self {
        Self { value: value.to_owned(), expires_at: now + Duration::days(i64::from(expiry_days)) }
    }

    fn live_value(&self, now: DateTime<Utc>) -> Option<String> {
        (now < self.expires_at && !self.value.is_empty()).then(|| self.value.clone())
    }
}

type Records = BTreeMap<String, Record>;

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    records: Records,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `value` under `name` for `expiry_days`.
    pub fn with_record(name: &str, value: &str, expiry_days: u32, now: DateTime<Utc>) -> Self {
        let mut records = Records::new();
        records.insert(name.to_owned(), Record::new(value, expiry_days, now));
        Self { records }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(name).and_then(|record| record.live_value(now)))
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        expiry_days: u32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.records.insert(name.to_owned(), Record::new(value, expiry_days, now));
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        self.records.remove(name);
        Ok(())
    }
}

/// JSON file store: `{"<name>": {"value": "...", "expires_at": "<RFC 3339>"}}`.
///
/// The file is read on every access and rewritten whole on every change. A
/// missing file is an empty store; parent directories are created on first
/// write.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Store backed by `path`. The file is not touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Records, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Records::new()),
            Err(source) => return Err(self.io_error(source)),
        };

        if text.trim().is_empty() {
            return Ok(Records::new());
        }

        serde_json::from_str(&text)
            .map_err(|source| StoreError::Format { path: self.path.clone(), source })
    }

    fn save(&self, records: &Records) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let text = serde_json::to_string_pretty(records)
            .map_err(|source| StoreError::Format { path: self.path.clone(), source })?;
        fs::write(&self.path, text).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, name: &str, now: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.get(name).and_then(|record| record.live_value(now)))
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        expiry_days: u32,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut records = self.load()?;
        // Expired records are dropped on every write
        records.retain(|_, record| now < record.expires_at);
        records.insert(name.to_owned(), Record::new(value, expiry_days, now));
        self.save(&records)?;

        tracing::debug!(path = %self.path.display(), name, "identity stored");
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), StoreError> {
        let mut records = self.load()?;
        if records.remove(name).is_some() {
            self.save(&records)?;
            tracing::debug!(path = %self.path.display(), name, "identity deleted");
        }
        Ok(())
    }
}
