//! Pure quiz grading.
//!
//! `grade` validates a submission against the resolved questions, checks each
//! answer by value, and applies the lesson's pass policy. It performs no I/O:
//! counter updates come back as [`StatBump`] intents for the caller to apply.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::GradingError;
use crate::model::{
    AnswerOutcome, AnswerRef, GradingResult, PassPolicy, Question, QuizConfig, SubmittedAnswer,
};
use crate::statistics::StatBump;

/// A grading result plus the statistics updates it asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graded {
    pub result: GradingResult,
    pub bumps: Vec<StatBump>,
}

/// Normalize an answer to the option value it refers to.
///
/// Index answers are looked up in the question's current option list;
/// anything that does not land on an option yields `None`.
pub fn resolve_answer<'a>(question: &'a Question, answer: &'a AnswerRef) -> Option<&'a str> {
    match answer {
        AnswerRef::ByValue(value) => Some(value.as_str()),
        AnswerRef::ByIndex(index) => usize::try_from(*index)
            .ok()
            .and_then(|i| question.options.get(i))
            .map(String::as_str),
        AnswerRef::Unanswered => None,
    }
}

/// Exact value comparison against the canonical answer. No case folding.
pub fn is_correct(question: &Question, answer: &AnswerRef) -> bool {
    resolve_answer(question, answer).is_some_and(|value| value == question.canonical_answer())
}

/// Whole-number percentage, rounded half-up. Zero when `total` is zero.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * correct as f64 / total as f64).round() as u32
}

/// Grade a submission.
///
/// Every answer must reference a distinct question present in `questions`;
/// otherwise the whole submission is rejected with the requested and found
/// counts. Duplicate question ids therefore fail validation too.
pub fn grade(
    answers: &[SubmittedAnswer],
    questions: &[Question],
    config: &QuizConfig,
    default_threshold: u32,
) -> Result<Graded, GradingError> {
    if answers.is_empty() {
        return Err(GradingError::NoAnswersProvided);
    }

    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let found: HashSet<&str> = answers
        .iter()
        .map(|a| a.question_id.as_str())
        .filter(|id| by_id.contains_key(id))
        .collect();
    if found.len() != answers.len() {
        return Err(GradingError::QuestionsNotFound {
            requested: answers.len(),
            found: found.len(),
        });
    }

    let mut outcomes = Vec::with_capacity(answers.len());
    let mut bumps = Vec::with_capacity(answers.len());
    for answer in answers {
        let question = by_id[answer.question_id.as_str()];
        let correct = is_correct(question, &answer.answer);
        outcomes.push(AnswerOutcome {
            question_id: question.id.clone(),
            selected: resolve_answer(question, &answer.answer).map(str::to_string),
            correct_answer: question.canonical_answer().to_string(),
            is_correct: correct,
        });
        bumps.push(StatBump::graded(&question.id, correct));
    }

    let total_count = outcomes.len();
    let correct_count = outcomes.iter().filter(|o| o.is_correct).count();
    let percentage = percentage(correct_count, total_count);

    let policy = config.policy(default_threshold);
    let passed = policy.passed(correct_count, total_count, percentage);
    let max_wrong_allowed = match policy {
        PassPolicy::MaxWrong { allowed, .. } => Some(allowed),
        PassPolicy::Threshold { .. } => None,
    };

    Ok(Graded {
        result: GradingResult {
            answers: outcomes,
            correct_count,
            total_count,
            percentage,
            passed,
            threshold: policy.threshold(),
            max_wrong_allowed,
        },
        bumps,
    })
}
