//! Append-only statistics journal.
//!
//! Each bump becomes one JSON line. Replaying the file with
//! [`StatsJournal::replay`] rebuilds per-question usage.

use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use coursekit_core::statistics::{tally, QuestionUsage, StatBump};
use coursekit_core::traits::StatsSink;

use crate::error::StoreError;

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    #[serde(flatten)]
    bump: StatBump,
    recorded_at: DateTime<Utc>,
}

/// A [`StatsSink`] backed by a JSON-lines file.
pub struct StatsJournal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl StatsJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rebuild usage counters from a journal file. A missing file is empty.
    ///
    /// A line that ends mid-entry is a write cut short and is skipped with a
    /// warning. Any other malformed line is an error.
    pub async fn replay(path: &Path) -> Result<BTreeMap<String, QuestionUsage>, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) if e.is_eof() => {
                    tracing::warn!(
                        "skipping truncated line {} of {}: {e}",
                        i + 1,
                        path.display()
                    );
                }
                Err(e) => {
                    return Err(StoreError::Journal {
                        line: i + 1,
                        message: e.to_string(),
                    })
                }
            }
        }

        Ok(tally(entries.iter().map(|e| (&e.bump, e.recorded_at))))
    }
}

#[async_trait]
impl StatsSink for StatsJournal {
    async fn record(&self, bump: &StatBump) -> anyhow::Result<()> {
        let entry = JournalEntry {
            bump: bump.clone(),
            recorded_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Start on a fresh line if an earlier write was cut short.
        if file.metadata().await?.len() > 0 {
            file.seek(SeekFrom::End(-1)).await?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last).await?;
            if last[0] != b'\n' {
                line.insert(0, '\n');
            }
        }
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
