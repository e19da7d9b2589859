//! In-memory question bank.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use coursekit_core::model::{Course, LessonScope, Question};
use coursekit_core::statistics::{QuestionUsage, StatBump};
use coursekit_core::traits::{QuestionLookup, StatsSink};

/// A question bank held in memory.
///
/// Serves lookups for the grader and keeps usage counters, seeded from the
/// questions' stored counts.
pub struct InMemoryQuestionBank {
    questions: HashMap<String, Question>,
    usage: Mutex<HashMap<String, QuestionUsage>>,
}

impl InMemoryQuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        let usage = questions
            .iter()
            .map(|q| {
                (
                    q.id.clone(),
                    QuestionUsage {
                        times_shown: q.times_shown,
                        times_correct: q.times_correct,
                        last_shown_at: None,
                    },
                )
            })
            .collect();
        Self {
            questions: questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
            usage: Mutex::new(usage),
        }
    }

    pub fn from_course(course: &Course) -> Self {
        Self::new(course.questions.clone())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Current counters for one question.
    pub fn usage(&self, question_id: &str) -> Option<QuestionUsage> {
        self.usage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(question_id)
            .cloned()
    }

    /// Counters for every question, ordered by id.
    pub fn snapshot(&self) -> BTreeMap<String, QuestionUsage> {
        self.usage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl QuestionLookup for InMemoryQuestionBank {
    async fn find_questions(
        &self,
        scope: &LessonScope,
        ids: &[String],
    ) -> anyhow::Result<Vec<Question>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.questions.get(id))
            .filter(|q| q.is_eligible(scope))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatsSink for InMemoryQuestionBank {
    async fn record(&self, bump: &StatBump) -> anyhow::Result<()> {
        if !self.questions.contains_key(&bump.question_id) {
            anyhow::bail!("unknown question: {}", bump.question_id);
        }
        self.usage
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(bump.question_id.clone())
            .or_default()
            .apply(bump, Utc::now());
        Ok(())
    }
}
