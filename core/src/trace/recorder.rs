//! Run recorder implementation

use crate::error::Result;
use crate::trace::RunEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

/// Records pipeline runs for debugging and analysis
#[derive(Debug)]
pub struct RunRecorder {
    name: String,
    entries: RwLock<Vec<RunEntry>>,
    file_path: Option<PathBuf>,
    auto_save: bool,
}

/// Complete recorded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Metadata about the run
    pub metadata: RunMetadata,

    /// All run entries
    pub entries: Vec<RunEntry>,
}

/// Metadata for a recorded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Unique identifier for this run record
    pub id: String,

    /// Display name of the run
    pub name: String,

    /// When the run was started
    pub started_at: DateTime<Utc>,

    /// When the run was completed (if completed)
    pub completed_at: Option<DateTime<Utc>>,

    /// Version of the record format
    pub version: String,

    /// Total number of entries
    pub total_entries: usize,

    /// Total duration in milliseconds
    pub duration_ms: Option<u64>,
}

impl RunRecorder {
    /// Create an in-memory recorder
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
            file_path: None,
            auto_save: false,
        }
    }

    /// Create a recorder that saves to a file after each entry
    pub fn with_file<S: Into<String>, P: AsRef<Path>>(name: S, path: P) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(Vec::new()),
            file_path: Some(path.as_ref().to_path_buf()),
            auto_save: true,
        }
    }

    /// The display name of the run
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record a run entry
    pub async fn record(&self, entry: RunEntry) -> Result<()> {
        {
            let mut entries = self.entries.write().await;
            entries.push(entry);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Get the number of recorded entries
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Get all recorded entries
    pub async fn get_entries(&self) -> Vec<RunEntry> {
        self.entries.read().await.clone()
    }

    /// Save the run to file
    pub async fn save(&self) -> Result<()> {
        if let Some(path) = &self.file_path {
            let run = self.build_run().await;
            let json = serde_json::to_string_pretty(&run)?;

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await?;
            }

            fs::write(path, json).await?;
        }

        Ok(())
    }

    /// Load a recorded run from file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Run> {
        let content = fs::read_to_string(path.as_ref()).await?;
        let run: Run = serde_json::from_str(&content)?;
        Ok(run)
    }

    /// Build a complete run record from recorded entries
    async fn build_run(&self) -> Run {
        let entries = self.entries.read().await.clone();

        let started_at = entries
            .first()
            .map(|e| e.timestamp)
            .unwrap_or_else(Utc::now);

        let completed_at = entries.last().map(|e| e.timestamp);

        let duration_ms = completed_at.map(|end| (end - started_at).num_milliseconds() as u64);

        let metadata = RunMetadata {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.clone(),
            started_at,
            completed_at,
            version: "1.0".to_string(),
            total_entries: entries.len(),
            duration_ms,
        };

        Run { metadata, entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_count() {
        let recorder = RunRecorder::new("test run");
        recorder
            .record(RunEntry::run_start(
                "Sales Manager".to_string(),
                "Write a cold sales email".to_string(),
            ))
            .await
            .unwrap();
        recorder
            .record(RunEntry::run_complete(true, "done".to_string(), 2, 10))
            .await
            .unwrap();

        assert_eq!(recorder.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let recorder = RunRecorder::with_file("saved run", &path);
        recorder
            .record(RunEntry::run_start(
                "Sales Manager".to_string(),
                "instruction".to_string(),
            ))
            .await
            .unwrap();

        let run = RunRecorder::load(&path).await.unwrap();
        assert_eq!(run.metadata.name, "saved run");
        assert_eq!(run.entries.len(), 1);
    }
}
