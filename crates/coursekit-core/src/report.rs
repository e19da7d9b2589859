//! Grading records with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{GradingResult, LessonScope};

/// A graded submission, as stored or returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the submission was graded.
    pub graded_at: DateTime<Utc>,
    pub course_id: String,
    pub lesson_id: String,
    pub result: GradingResult,
}

impl GradingRecord {
    pub fn new(scope: &LessonScope, result: GradingResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            graded_at: Utc::now(),
            course_id: scope.course_id.clone(),
            lesson_id: scope.lesson_id.clone(),
            result,
        }
    }

    /// Save the record as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: GradingRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }

    /// One-line console summary, e.g. `capitals: 7/10 (70%) PASSED [threshold 70%]`.
    pub fn summary_line(&self) -> String {
        let r = &self.result;
        let verdict = if r.passed { "PASSED" } else { "FAILED" };
        let policy = match r.max_wrong_allowed {
            Some(allowed) => format!("max wrong {allowed}, threshold {}%", r.threshold),
            None => format!("threshold {}%", r.threshold),
        };
        format!(
            "{}: {}/{} ({}%) {verdict} [{policy}]",
            self.lesson_id, r.correct_count, r.total_count, r.percentage
        )
    }
}
