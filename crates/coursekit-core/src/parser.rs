//! TOML course file parser.
//!
//! Loads courses (lessons, quiz settings, question bank) from TOML files and
//! directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{default_category, default_difficulty, Course, Lesson, Question, QuizConfig};

/// Intermediate TOML structure for parsing course files.
#[derive(Debug, Deserialize)]
struct TomlCourseFile {
    course: TomlCourseHeader,
    #[serde(default)]
    lessons: Vec<TomlLesson>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlCourseHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlLesson {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    quiz: QuizConfig,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    lesson_id: Option<String>,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default = "default_true")]
    course_specific: bool,
    #[serde(default)]
    times_shown: u64,
    #[serde(default)]
    times_correct: u64,
}

fn default_true() -> bool {
    true
}

/// Parse a single TOML file into a `Course`.
pub fn parse_course(path: &Path) -> Result<Course> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read course file: {}", path.display()))?;

    parse_course_str(&content, path)
}

/// Parse a TOML string into a `Course`.
pub fn parse_course_str(content: &str, source_path: &Path) -> Result<Course> {
    let parsed: TomlCourseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let course_id = parsed.course.id;

    let lessons = parsed
        .lessons
        .into_iter()
        .map(|l| Lesson {
            id: l.id,
            title: l.title,
            quiz: l.quiz,
        })
        .collect();

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            course_id: course_id.clone(),
            lesson_id: q.lesson_id,
            question: q.question,
            options: q.options,
            correct_answer: q.correct_answer,
            difficulty: q.difficulty,
            category: q.category,
            active: q.active,
            course_specific: q.course_specific,
            times_shown: q.times_shown,
            times_correct: q.times_correct,
        })
        .collect();

    Ok(Course {
        id: course_id,
        name: parsed.course.name,
        description: parsed.course.description,
        lessons,
        questions,
    })
}

/// Recursively load all `.toml` course files from a directory.
pub fn load_course_directory(dir: &Path) -> Result<Vec<Course>> {
    let mut courses = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            courses.extend(load_course_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_course(&path) {
                Ok(course) => courses.push(course),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(courses)
}

/// A warning from course validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question or lesson ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn on(id: &str, message: impl Into<String>) -> Self {
        Self {
            item_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a course for common authoring mistakes.
pub fn validate_course(course: &Course) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_lessons = HashSet::new();
    for lesson in &course.lessons {
        if !seen_lessons.insert(lesson.id.as_str()) {
            warnings.push(ValidationWarning::on(
                &lesson.id,
                format!("duplicate lesson ID: {}", lesson.id),
            ));
        }
        if lesson.quiz.success_threshold.is_some_and(|t| t > 100) {
            warnings.push(ValidationWarning::on(
                &lesson.id,
                "success_threshold is above 100 and can never be met",
            ));
        }
    }

    let mut seen_questions = HashSet::new();
    for q in &course.questions {
        if !seen_questions.insert(q.id.as_str()) {
            warnings.push(ValidationWarning::on(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning::on(&q.id, "question prompt is empty"));
        }
        if q.options.len() < 2 {
            warnings.push(ValidationWarning::on(
                &q.id,
                format!("only {} option(s); expected at least 2", q.options.len()),
            ));
        }
        if !q.options.iter().any(|o| o == q.canonical_answer()) {
            warnings.push(ValidationWarning::on(
                &q.id,
                format!(
                    "correct answer {:?} does not match any option",
                    q.canonical_answer()
                ),
            ));
        }
        if let Some(lesson_id) = &q.lesson_id {
            if course.lesson(lesson_id).is_none() {
                warnings.push(ValidationWarning::on(
                    &q.id,
                    format!("bound to unknown lesson: {lesson_id}"),
                ));
            }
        }
    }

    for lesson in &course.lessons {
        let scope = course.scope(&lesson.id);
        if lesson.quiz.enabled && !course.questions.iter().any(|q| q.is_eligible(&scope)) {
            warnings.push(ValidationWarning::on(
                &lesson.id,
                "quiz is enabled but no active questions are available",
            ));
        }
    }

    warnings
}
