//! Question usage statistics.
//!
//! Grading emits [`StatBump`] intents; [`apply_stat_bumps`] pushes them
//! through a [`StatsSink`] on a best-effort basis. Lost or reordered updates
//! are acceptable: these counters are telemetry, not a ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::traits::StatsSink;

/// A request to bump one question's usage counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBump {
    pub question_id: String,
    /// Added to `times_shown`.
    pub shown: u64,
    /// Added to `times_correct`.
    pub correct: u64,
}

impl StatBump {
    /// The bump for one graded answer.
    pub fn graded(question_id: &str, was_correct: bool) -> Self {
        Self {
            question_id: question_id.to_string(),
            shown: 1,
            correct: u64::from(was_correct),
        }
    }
}

/// Rolling usage counters for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionUsage {
    pub times_shown: u64,
    pub times_correct: u64,
    #[serde(default)]
    pub last_shown_at: Option<DateTime<Utc>>,
}

impl QuestionUsage {
    pub fn apply(&mut self, bump: &StatBump, at: DateTime<Utc>) {
        self.times_shown += bump.shown;
        self.times_correct += bump.correct;
        self.last_shown_at = Some(match self.last_shown_at {
            Some(prev) if prev > at => prev,
            _ => at,
        });
    }

    /// Fraction of showings answered correctly, 0.0 if never shown.
    pub fn accuracy(&self) -> f64 {
        if self.times_shown == 0 {
            0.0
        } else {
            self.times_correct as f64 / self.times_shown as f64
        }
    }
}

/// Aggregate a stream of timestamped bumps into per-question usage.
pub fn tally<'a, I>(bumps: I) -> BTreeMap<String, QuestionUsage>
where
    I: IntoIterator<Item = (&'a StatBump, DateTime<Utc>)>,
{
    let mut usage: BTreeMap<String, QuestionUsage> = BTreeMap::new();
    for (bump, at) in bumps {
        usage
            .entry(bump.question_id.clone())
            .or_default()
            .apply(bump, at);
    }
    usage
}

/// How many bumps reached the sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsOutcome {
    pub applied: usize,
    pub failed: usize,
}

/// Apply bumps through `sink` concurrently.
///
/// Failures are logged and counted, never returned.
pub async fn apply_stat_bumps(sink: &dyn StatsSink, bumps: &[StatBump]) -> StatsOutcome {
    let mut pending: FuturesUnordered<_> = bumps
        .iter()
        .map(|bump| async move { (bump, sink.record(bump).await) })
        .collect();

    let mut outcome = StatsOutcome::default();
    while let Some((bump, result)) = pending.next().await {
        match result {
            Ok(()) => outcome.applied += 1,
            Err(e) => {
                tracing::warn!(
                    "failed to update stats for question {}: {e:#}",
                    bump.question_id
                );
                outcome.failed += 1;
            }
        }
    }

    tracing::debug!(
        applied = outcome.applied,
        failed = outcome.failed,
        "question stats dispatched"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;

    struct RecordingSink {
        seen: Mutex<Vec<StatBump>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl StatsSink for RecordingSink {
        async fn record(&self, bump: &StatBump) -> anyhow::Result<()> {
            if self.fail_on.as_deref() == Some(bump.question_id.as_str()) {
                anyhow::bail!("write conflict");
            }
            self.seen.lock().unwrap().push(bump.clone());
            Ok(())
        }
    }

    #[test]
    fn graded_bump() {
        assert_eq!(StatBump::graded("q1", true).correct, 1);
        assert_eq!(StatBump::graded("q1", false).correct, 0);
        assert_eq!(StatBump::graded("q1", false).shown, 1);
    }

    #[test]
    fn usage_accuracy() {
        assert_eq!(QuestionUsage::default().accuracy(), 0.0);
        let usage = QuestionUsage {
            times_shown: 4,
            times_correct: 3,
            last_shown_at: None,
        };
        assert!((usage.accuracy() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn tally_groups_by_question() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let bumps = [
            StatBump::graded("a", true),
            StatBump::graded("b", false),
            StatBump::graded("a", false),
        ];
        let usage = tally([(&bumps[0], late), (&bumps[1], early), (&bumps[2], early)]);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage["a"].times_shown, 2);
        assert_eq!(usage["a"].times_correct, 1);
        // Out-of-order timestamps keep the latest.
        assert_eq!(usage["a"].last_shown_at, Some(late));
        assert_eq!(usage["b"].times_correct, 0);
    }

    #[tokio::test]
    async fn failures_are_counted_not_raised() {
        let sink = RecordingSink {
            seen: Mutex::new(Vec::new()),
            fail_on: Some("b".into()),
        };
        let bumps = vec![
            StatBump::graded("a", true),
            StatBump::graded("b", true),
            StatBump::graded("c", false),
        ];
        let outcome = apply_stat_bumps(&sink, &bumps).await;
        assert_eq!(
            outcome,
            StatsOutcome {
                applied: 2,
                failed: 1
            }
        );
        assert_eq!(sink.seen.lock().unwrap().len(), 2);
    }
}
