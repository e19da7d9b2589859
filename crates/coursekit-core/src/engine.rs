//! Quiz submission service.
//!
//! Wires the pure grader to the question lookup and the statistics sink:
//! validate, resolve, grade, then hand the counter bumps to the sink without
//! letting a statistics failure touch the grading outcome.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::error::GradingError;
use crate::grading::grade;
use crate::model::{LessonScope, QuizConfig, SubmittedAnswer, DEFAULT_SUCCESS_THRESHOLD};
use crate::report::GradingRecord;
use crate::statistics::apply_stat_bumps;
use crate::traits::{QuestionLookup, StatsSink};

/// How statistics updates are dispatched after grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsDispatch {
    /// Await the sink before returning; failures are logged and dropped.
    #[default]
    Inline,
    /// Spawn onto the runtime and return immediately. Pending updates can be
    /// awaited with [`QuizService::flush`].
    Detached,
}

/// Configuration for the quiz service.
#[derive(Debug, Clone)]
pub struct QuizServiceConfig {
    /// Pass mark for lessons that leave `success_threshold` unset.
    pub default_success_threshold: u32,
    pub stats_dispatch: StatsDispatch,
}

impl Default for QuizServiceConfig {
    fn default() -> Self {
        Self {
            default_success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            stats_dispatch: StatsDispatch::Inline,
        }
    }
}

/// Grades submissions against an injected question bank.
pub struct QuizService {
    lookup: Arc<dyn QuestionLookup>,
    sink: Arc<dyn StatsSink>,
    config: QuizServiceConfig,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl QuizService {
    pub fn new(
        lookup: Arc<dyn QuestionLookup>,
        sink: Arc<dyn StatsSink>,
        config: QuizServiceConfig,
    ) -> Self {
        Self {
            lookup,
            sink,
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Grade one submission for a lesson.
    pub async fn submit(
        &self,
        scope: &LessonScope,
        quiz: &QuizConfig,
        answers: &[SubmittedAnswer],
    ) -> Result<GradingRecord, GradingError> {
        if !quiz.enabled {
            return Err(GradingError::QuizNotEnabled {
                lesson_id: scope.lesson_id.clone(),
            });
        }
        if answers.is_empty() {
            return Err(GradingError::NoAnswersProvided);
        }

        let ids: Vec<String> = answers
            .iter()
            .map(|a| a.question_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let questions = self
            .lookup
            .find_questions(scope, &ids)
            .await
            .map_err(|e| GradingError::LookupFailed(format!("{e:#}")))?;

        let graded = grade(
            answers,
            &questions,
            quiz,
            self.config.default_success_threshold,
        )
        .inspect_err(|e| {
            tracing::info!(lesson = %scope.lesson_id, code = e.code(), "submission rejected: {e}")
        })?;

        tracing::info!(
            course = %scope.course_id,
            lesson = %scope.lesson_id,
            correct = graded.result.correct_count,
            total = graded.result.total_count,
            passed = graded.result.passed,
            "graded quiz submission"
        );

        match self.config.stats_dispatch {
            StatsDispatch::Inline => {
                apply_stat_bumps(self.sink.as_ref(), &graded.bumps).await;
            }
            StatsDispatch::Detached => {
                let sink = Arc::clone(&self.sink);
                let bumps = graded.bumps.clone();
                let handle = tokio::spawn(async move {
                    apply_stat_bumps(sink.as_ref(), &bumps).await;
                });
                let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
        }

        Ok(GradingRecord::new(scope, graded.result))
    }

    /// Wait for every detached statistics update spawned so far.
    ///
    /// Returns the number of updates awaited. Short-lived callers must flush
    /// before the runtime shuts down, or in-flight writes are cancelled.
    pub async fn flush(&self) -> usize {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *pending)
        };
        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("statistics update task failed: {e}");
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::model::Question;
    use crate::statistics::StatBump;

    struct FixedBank {
        questions: Vec<Question>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl QuestionLookup for FixedBank {
        async fn find_questions(
            &self,
            scope: &LessonScope,
            ids: &[String],
        ) -> anyhow::Result<Vec<Question>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self
                .questions
                .iter()
                .filter(|q| ids.contains(&q.id) && q.is_eligible(scope))
                .cloned()
                .collect())
        }
    }

    struct BrokenBank;

    #[async_trait]
    impl QuestionLookup for BrokenBank {
        async fn find_questions(&self, _: &LessonScope, _: &[String]) -> anyhow::Result<Vec<Question>> {
            anyhow::bail!("connection refused")
        }
    }

    /// Counts bumps and fails for the listed questions.
    #[derive(Default)]
    struct CountingSink {
        counts: Mutex<HashMap<String, (u64, u64)>>,
        fail_for: Vec<String>,
    }

    #[async_trait]
    impl StatsSink for CountingSink {
        async fn record(&self, bump: &StatBump) -> anyhow::Result<()> {
            if self.fail_for.contains(&bump.question_id) {
                anyhow::bail!("stats store unavailable");
            }
            let mut counts = self.counts.lock().unwrap();
            let entry = counts.entry(bump.question_id.clone()).or_default();
            entry.0 += bump.shown;
            entry.1 += bump.correct;
            Ok(())
        }
    }

    fn question(id: &str, active: bool) -> Question {
        Question {
            id: id.into(),
            course_id: "geo".into(),
            lesson_id: Some("capitals".into()),
            question: format!("{id}?"),
            options: vec!["yes".into(), "no".into()],
            correct_answer: "yes".into(),
            difficulty: "easy".into(),
            category: "general".into(),
            active,
            course_specific: true,
            times_shown: 0,
            times_correct: 0,
        }
    }

    fn bank() -> Arc<FixedBank> {
        Arc::new(FixedBank {
            questions: vec![
                question("q1", true),
                question("q2", true),
                question("q3", true),
                question("q4", true),
                question("retired", false),
            ],
            calls: AtomicU32::new(0),
        })
    }

    fn scope() -> LessonScope {
        LessonScope::new("geo", "capitals")
    }

    #[tokio::test]
    async fn grades_and_records_stats() {
        let bank = bank();
        let sink = Arc::new(CountingSink::default());
        let service = QuizService::new(bank.clone(), sink.clone(), QuizServiceConfig::default());

        let answers = vec![
            SubmittedAnswer::by_value("q1", "yes"),
            SubmittedAnswer::by_index("q2", 0),
            SubmittedAnswer::by_value("q3", "no"),
        ];
        let record = service
            .submit(&scope(), &QuizConfig::default(), &answers)
            .await
            .unwrap();

        assert_eq!(record.result.correct_count, 2);
        assert_eq!(record.result.percentage, 67);
        assert!(!record.result.passed);
        assert_eq!(record.lesson_id, "capitals");

        let counts = sink.counts.lock().unwrap();
        assert_eq!(counts["q1"], (1, 1));
        assert_eq!(counts["q3"], (1, 0));
    }

    #[tokio::test]
    async fn inactive_question_rejects_whole_submission() {
        let sink = Arc::new(CountingSink::default());
        let service = QuizService::new(bank(), sink.clone(), QuizServiceConfig::default());

        let answers = vec![
            SubmittedAnswer::by_value("q1", "yes"),
            SubmittedAnswer::by_value("q2", "yes"),
            SubmittedAnswer::by_value("q3", "yes"),
            SubmittedAnswer::by_value("q4", "yes"),
            SubmittedAnswer::by_value("retired", "yes"),
        ];
        let err = service
            .submit(&scope(), &QuizConfig::default(), &answers)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GradingError::QuestionsNotFound {
                requested: 5,
                found: 4
            }
        );
        assert!(sink.counts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_quiz_and_empty_answers_skip_lookup() {
        let bank = bank();
        let service = QuizService::new(
            bank.clone(),
            Arc::new(CountingSink::default()),
            QuizServiceConfig::default(),
        );

        let disabled = QuizConfig {
            enabled: false,
            ..Default::default()
        };
        let err = service
            .submit(&scope(), &disabled, &[SubmittedAnswer::by_value("q1", "yes")])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "QUIZ_NOT_ENABLED");

        let err = service
            .submit(&scope(), &QuizConfig::default(), &[])
            .await
            .unwrap_err();
        assert_eq!(err, GradingError::NoAnswersProvided);
        assert_eq!(bank.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn lookup_failure_is_reported() {
        let service = QuizService::new(
            Arc::new(BrokenBank),
            Arc::new(CountingSink::default()),
            QuizServiceConfig::default(),
        );
        let err = service
            .submit(&scope(), &QuizConfig::default(), &[SubmittedAnswer::by_value("q1", "yes")])
            .await
            .unwrap_err();
        assert!(matches!(err, GradingError::LookupFailed(ref m) if m.contains("connection refused")));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn stats_failure_does_not_fail_grading() {
        let sink = Arc::new(CountingSink {
            fail_for: vec!["q1".into()],
            ..Default::default()
        });
        let service = QuizService::new(bank(), sink.clone(), QuizServiceConfig::default());

        let answers = vec![
            SubmittedAnswer::by_value("q1", "yes"),
            SubmittedAnswer::by_value("q2", "yes"),
        ];
        let record = service
            .submit(&scope(), &QuizConfig::default(), &answers)
            .await
            .unwrap();
        assert!(record.result.passed);
        assert_eq!(record.result.percentage, 100);

        let counts = sink.counts.lock().unwrap();
        assert!(!counts.contains_key("q1"));
        assert_eq!(counts["q2"], (1, 1));
    }

    #[tokio::test]
    async fn resubmission_is_idempotent_while_stats_advance() {
        let sink = Arc::new(CountingSink::default());
        let service = QuizService::new(bank(), sink.clone(), QuizServiceConfig::default());
        let answers = vec![
            SubmittedAnswer::by_value("q1", "yes"),
            SubmittedAnswer::by_value("q2", "no"),
        ];

        let first = service
            .submit(&scope(), &QuizConfig::default(), &answers)
            .await
            .unwrap();
        let second = service
            .submit(&scope(), &QuizConfig::default(), &answers)
            .await
            .unwrap();

        assert_eq!(first.result, second.result);
        assert_ne!(first.id, second.id);
        assert_eq!(sink.counts.lock().unwrap()["q1"], (2, 2));
    }

    #[tokio::test]
    async fn detached_dispatch_applies_after_flush() {
        let sink = Arc::new(CountingSink::default());
        let config = QuizServiceConfig {
            stats_dispatch: StatsDispatch::Detached,
            ..Default::default()
        };
        let service = QuizService::new(bank(), sink.clone(), config);

        let answers = vec![
            SubmittedAnswer::by_value("q1", "yes"),
            SubmittedAnswer::by_value("q2", "no"),
            SubmittedAnswer::by_index("q3", 0),
        ];
        for _ in 0..3 {
            let record = service
                .submit(&scope(), &QuizConfig::default(), &answers)
                .await
                .unwrap();
            assert_eq!(record.result.correct_count, 2);
        }

        assert!(service.flush().await >= 1);
        let counts = sink.counts.lock().unwrap();
        assert_eq!(counts["q1"], (3, 3));
        assert_eq!(counts["q2"], (3, 0));
        assert_eq!(counts["q3"], (3, 3));
        drop(counts);

        assert_eq!(service.flush().await, 0);
    }

    #[tokio::test]
    async fn inline_dispatch_leaves_nothing_to_flush() {
        let sink = Arc::new(CountingSink::default());
        let service = QuizService::new(bank(), sink.clone(), QuizServiceConfig::default());
        service
            .submit(&scope(), &QuizConfig::default(), &[SubmittedAnswer::by_value("q1", "yes")])
            .await
            .unwrap();
        assert_eq!(service.flush().await, 0);
        assert_eq!(sink.counts.lock().unwrap()["q1"], (1, 1));
    }
}
