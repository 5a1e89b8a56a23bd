//! Persisted session — the state mirror that survives a reload.
//!
//! Three facets are stored as keyed string entries: the CV name list, the
//! job-description display name, and the result snapshot. Loading substitutes
//! defaults for anything missing or unreadable; clearing erases all three
//! facets together. Clearing happens only at explicit session end.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::results::AnalysisRecord;

pub const KEY_FILES: &str = "cv_files";
pub const KEY_JOB_NAME: &str = "job_description_name";
pub const KEY_RESULTS: &str = "analysis_results";

/// Name-only projection of one registry entry, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNameEntry {
    pub name: String,
}

/// Everything the session remembers across a reload. Document contents are
/// never persisted — a reload restores names and results, not bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub file_names: Vec<String>,
    pub job_name: Option<String>,
    pub results: Vec<AnalysisRecord>,
}

/// The persistence seam. Swapped at startup like any other backend.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_file_names(&self, names: &[String]) -> Result<(), AppError>;
    async fn save_job_name(&self, name: &str) -> Result<(), AppError>;
    async fn save_results(&self, records: &[AnalysisRecord]) -> Result<(), AppError>;
    /// Never fails: missing or corrupt facets load as defaults.
    async fn load(&self) -> SessionState;
    /// Erases all three facets together.
    async fn clear(&self) -> Result<(), AppError>;
}

fn encode_file_names(names: &[String]) -> String {
    let entries: Vec<FileNameEntry> = names
        .iter()
        .map(|n| FileNameEntry { name: n.clone() })
        .collect();
    serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
}

fn decode_state(entries: &HashMap<String, String>) -> SessionState {
    let file_names = entries
        .get(KEY_FILES)
        .and_then(|raw| serde_json::from_str::<Vec<FileNameEntry>>(raw).ok())
        .map(|list| list.into_iter().map(|e| e.name).collect())
        .unwrap_or_default();

    let job_name = entries.get(KEY_JOB_NAME).cloned();

    let results = entries
        .get(KEY_RESULTS)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();

    SessionState {
        file_names,
        job_name,
        results,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// File-backed store
// ────────────────────────────────────────────────────────────────────────────

/// On-disk layout: the three keyed entries plus a save stamp.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDocument {
    saved_at: Option<DateTime<Utc>>,
    entries: HashMap<String, String>,
}

/// One JSON document at a configured path. Reads tolerate a missing or
/// corrupt file; each save is a read-modify-write of the whole document.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_document(&self) -> SessionDocument {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Session file unreadable, starting empty: {e}");
                SessionDocument::default()
            }),
            Err(_) => SessionDocument::default(),
        }
    }

    async fn upsert(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut document = self.read_document().await;
        document.entries.insert(key.to_string(), value);
        document.saved_at = Some(Utc::now());

        let raw = serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::Session(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| AppError::Session(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save_file_names(&self, names: &[String]) -> Result<(), AppError> {
        self.upsert(KEY_FILES, encode_file_names(names)).await
    }

    async fn save_job_name(&self, name: &str) -> Result<(), AppError> {
        self.upsert(KEY_JOB_NAME, name.to_string()).await
    }

    async fn save_results(&self, records: &[AnalysisRecord]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records).map_err(|e| AppError::Session(e.to_string()))?;
        self.upsert(KEY_RESULTS, raw).await
    }

    async fn load(&self) -> SessionState {
        decode_state(&self.read_document().await.entries)
    }

    async fn clear(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Session(e.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store
// ────────────────────────────────────────────────────────────────────────────

/// Ephemeral store for sessions that should not outlive the process, and for
/// tests.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save_file_names(&self, names: &[String]) -> Result<(), AppError> {
        self.entries
            .lock()
            .expect("session store mutex poisoned")
            .insert(KEY_FILES.to_string(), encode_file_names(names));
        Ok(())
    }

    async fn save_job_name(&self, name: &str) -> Result<(), AppError> {
        self.entries
            .lock()
            .expect("session store mutex poisoned")
            .insert(KEY_JOB_NAME.to_string(), name.to_string());
        Ok(())
    }

    async fn save_results(&self, records: &[AnalysisRecord]) -> Result<(), AppError> {
        let raw = serde_json::to_string(records).map_err(|e| AppError::Session(e.to_string()))?;
        self.entries
            .lock()
            .expect("session store mutex poisoned")
            .insert(KEY_RESULTS.to_string(), raw);
        Ok(())
    }

    async fn load(&self) -> SessionState {
        decode_state(&self.entries.lock().expect("session store mutex poisoned"))
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.entries
            .lock()
            .expect("session store mutex poisoned")
            .clear();
        Ok(())
    }
}
