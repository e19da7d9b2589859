//! Grading error types.
//!
//! Every variant carries a stable machine-readable code so the transport
//! layer can map failures to responses without string matching.

use thiserror::Error;

/// Errors that reject a quiz submission before any score is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradingError {
    /// The lesson has its quiz switched off.
    #[error("quiz is not enabled for lesson {lesson_id}")]
    QuizNotEnabled { lesson_id: String },

    /// The submission contained no answers.
    #[error("no answers provided")]
    NoAnswersProvided,

    /// One or more answers referenced a question that is missing, inactive,
    /// or outside the lesson.
    #[error("questions not found: requested {requested}, found {found}")]
    QuestionsNotFound { requested: usize, found: usize },

    /// The question lookup itself failed.
    #[error("question lookup failed: {0}")]
    LookupFailed(String),
}

impl GradingError {
    /// Machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            GradingError::QuizNotEnabled { .. } => "QUIZ_NOT_ENABLED",
            GradingError::NoAnswersProvided => "NO_ANSWERS_PROVIDED",
            GradingError::QuestionsNotFound { .. } => "QUESTIONS_NOT_FOUND",
            GradingError::LookupFailed(_) => "QUESTION_LOOKUP_FAILED",
        }
    }

    /// Returns `true` if the learner's request was at fault.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, GradingError::LookupFailed(_))
    }
}
