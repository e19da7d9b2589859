//! Storage seams for the grading service.
//!
//! The question bank and its usage counters live outside this crate. These
//! async traits are implemented by `coursekit-store` and by test doubles.

use async_trait::async_trait;

use crate::model::{LessonScope, Question};
use crate::statistics::StatBump;

/// Resolves question ids for a lesson.
#[async_trait]
pub trait QuestionLookup: Send + Sync {
    /// Return the questions among `ids` that are eligible for `scope`.
    ///
    /// Ids that are missing, inactive, or outside the lesson are simply
    /// absent from the result; the grader turns that into a rejection.
    async fn find_questions(
        &self,
        scope: &LessonScope,
        ids: &[String],
    ) -> anyhow::Result<Vec<Question>>;
}

/// Receives question usage counter updates.
#[async_trait]
pub trait StatsSink: Send + Sync {
    /// Apply one bump and touch the question's last-shown timestamp.
    async fn record(&self, bump: &StatBump) -> anyhow::Result<()>;
}

/// Sink that drops every update.
pub struct NoopStatsSink;

#[async_trait]
impl StatsSink for NoopStatsSink {
    async fn record(&self, _: &StatBump) -> anyhow::Result<()> {
        Ok(())
    }
}
