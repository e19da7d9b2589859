//! Core data model types for coursekit.
//!
//! Question-bank entries, per-lesson quiz configuration, submitted answers,
//! and the grading result handed back to the caller.

use serde::{Deserialize, Serialize};

/// Pass mark used when a lesson does not set `success_threshold`.
pub const DEFAULT_SUCCESS_THRESHOLD: u32 = 70;

/// A single question-bank entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Opaque identifier.
    pub id: String,
    /// Course this question belongs to.
    pub course_id: String,
    /// Lesson this question is bound to, if any.
    #[serde(default)]
    pub lesson_id: Option<String>,
    /// Prompt text.
    pub question: String,
    /// Answer options in their stored order.
    pub options: Vec<String>,
    /// The correct option, by value.
    pub correct_answer: String,
    /// Difficulty label (free-form, e.g. "easy").
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    /// Category label.
    #[serde(default = "default_category")]
    pub category: String,
    /// Inactive questions never resolve during grading.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Shared-pool questions are not graded against a course.
    #[serde(default = "default_true")]
    pub course_specific: bool,
    /// How many times this question has been graded.
    #[serde(default)]
    pub times_shown: u64,
    /// How many of those gradings were correct.
    #[serde(default)]
    pub times_correct: u64,
}

impl Question {
    /// The correct answer as compared against submissions.
    ///
    /// Only the stored answer is trimmed; submissions are compared verbatim.
    pub fn canonical_answer(&self) -> &str {
        self.correct_answer.trim()
    }

    /// Whether this question may be graded for the given lesson.
    pub fn is_eligible(&self, scope: &LessonScope) -> bool {
        self.active
            && self.course_specific
            && self.course_id == scope.course_id
            && match self.lesson_id.as_deref() {
                Some(lesson) => lesson == scope.lesson_id,
                None => true,
            }
    }
}

pub(crate) fn default_difficulty() -> String {
    "medium".to_string()
}

pub(crate) fn default_category() -> String {
    "general".to_string()
}

fn default_true() -> bool {
    true
}

/// The course and lesson a submission is graded against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LessonScope {
    pub course_id: String,
    pub lesson_id: String,
}

impl LessonScope {
    pub fn new(course_id: impl Into<String>, lesson_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            lesson_id: lesson_id.into(),
        }
    }
}

/// Per-lesson quiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Whether the lesson accepts quiz submissions at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Percentage needed to pass.
    #[serde(default)]
    pub success_threshold: Option<u32>,
    /// Maximum wrong answers tolerated. Overrides the percentage policy
    /// when present and non-negative.
    #[serde(default)]
    pub max_wrong_allowed: Option<i64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            success_threshold: None,
            max_wrong_allowed: None,
        }
    }
}

impl QuizConfig {
    /// Resolve the pass/fail policy for this lesson.
    pub fn policy(&self, default_threshold: u32) -> PassPolicy {
        let threshold = self.success_threshold.unwrap_or(default_threshold);
        match self.max_wrong_allowed {
            Some(allowed) if allowed >= 0 => PassPolicy::MaxWrong {
                allowed: u32::try_from(allowed).unwrap_or(u32::MAX),
                threshold,
            },
            _ => PassPolicy::Threshold { threshold },
        }
    }
}

/// The two mutually exclusive pass/fail policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PassPolicy {
    /// Pass when `wrong <= allowed`. `threshold` is kept for display only.
    MaxWrong { allowed: u32, threshold: u32 },
    /// Pass when `percentage >= threshold`.
    Threshold { threshold: u32 },
}

impl PassPolicy {
    /// The percentage-mode threshold, reported in either mode.
    pub fn threshold(&self) -> u32 {
        match self {
            PassPolicy::MaxWrong { threshold, .. } | PassPolicy::Threshold { threshold } => {
                *threshold
            }
        }
    }

    pub fn passed(&self, correct: usize, total: usize, percentage: u32) -> bool {
        match self {
            PassPolicy::MaxWrong { allowed, .. } => {
                total.saturating_sub(correct) <= *allowed as usize
            }
            PassPolicy::Threshold { threshold } => percentage >= *threshold,
        }
    }
}

/// How a learner referenced their chosen option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerRef {
    /// The literal option text.
    ByValue(String),
    /// A position in the question's option list as presented.
    ByIndex(i64),
    /// Neither form was supplied.
    Unanswered,
}

/// A single answer in a submission.
///
/// On the wire this is `{ "question_id", "selected_option"?, "selected_index"? }`;
/// `selected_option` wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAnswer", into = "RawAnswer")]
pub struct SubmittedAnswer {
    pub question_id: String,
    pub answer: AnswerRef,
}

impl SubmittedAnswer {
    pub fn by_value(question_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            answer: AnswerRef::ByValue(value.into()),
        }
    }

    pub fn by_index(question_id: impl Into<String>, index: i64) -> Self {
        Self {
            question_id: question_id.into(),
            answer: AnswerRef::ByIndex(index),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawAnswer {
    #[serde(alias = "questionId")]
    question_id: String,
    #[serde(default, alias = "selectedOption", skip_serializing_if = "Option::is_none")]
    selected_option: Option<String>,
    #[serde(default, alias = "selectedIndex", skip_serializing_if = "Option::is_none")]
    selected_index: Option<i64>,
}

impl From<RawAnswer> for SubmittedAnswer {
    fn from(raw: RawAnswer) -> Self {
        let answer = match (raw.selected_option, raw.selected_index) {
            (Some(value), _) => AnswerRef::ByValue(value),
            (None, Some(index)) => AnswerRef::ByIndex(index),
            (None, None) => AnswerRef::Unanswered,
        };
        Self {
            question_id: raw.question_id,
            answer,
        }
    }
}

impl From<SubmittedAnswer> for RawAnswer {
    fn from(answer: SubmittedAnswer) -> Self {
        let (selected_option, selected_index) = match answer.answer {
            AnswerRef::ByValue(value) => (Some(value), None),
            AnswerRef::ByIndex(index) => (None, Some(index)),
            AnswerRef::Unanswered => (None, None),
        };
        Self {
            question_id: answer.question_id,
            selected_option,
            selected_index,
        }
    }
}

/// Per-answer grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub question_id: String,
    /// The submission normalized to an option value, if it resolved.
    pub selected: Option<String>,
    /// The canonical correct answer.
    pub correct_answer: String,
    pub is_correct: bool,
}

/// The auditable result of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResult {
    pub answers: Vec<AnswerOutcome>,
    pub correct_count: usize,
    pub total_count: usize,
    /// `round(100 * correct / total)`, or 0 for an empty total.
    pub percentage: u32,
    pub passed: bool,
    /// Percentage-mode threshold, reported even under max-wrong grading.
    pub threshold: u32,
    /// Set when max-wrong grading decided `passed`.
    #[serde(default)]
    pub max_wrong_allowed: Option<u32>,
}

impl GradingResult {
    pub fn wrong_count(&self) -> usize {
        self.total_count - self.correct_count
    }
}

/// A lesson and its quiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quiz: QuizConfig,
}

/// A course: its lessons and question bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Course {
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn scope(&self, lesson_id: &str) -> LessonScope {
        LessonScope::new(self.id.clone(), lesson_id)
    }
}
