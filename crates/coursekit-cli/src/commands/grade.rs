//! The `coursekit grade` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use coursekit_core::engine::QuizService;
use coursekit_core::model::SubmittedAnswer;
use coursekit_core::parser;
use coursekit_core::report::GradingRecord;
use coursekit_core::traits::StatsSink;
use coursekit_store::config::load_config_from;
use coursekit_store::{InMemoryQuestionBank, StatsJournal};

pub async fn execute(
    course_path: PathBuf,
    lesson_id: String,
    answers_path: PathBuf,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let course = parser::parse_course(&course_path)?;
    let lesson = course
        .lesson(&lesson_id)
        .with_context(|| format!("lesson '{lesson_id}' not found in course '{}'", course.id))?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers: Vec<SubmittedAnswer> =
        serde_json::from_str(&content).context("failed to parse answers JSON")?;

    let bank = Arc::new(InMemoryQuestionBank::from_course(&course));
    let sink: Arc<dyn StatsSink> = match &config.stats_journal {
        Some(path) => {
            tracing::debug!(journal = %path.display(), "journaling question statistics");
            Arc::new(StatsJournal::new(path))
        }
        None => bank.clone(),
    };
    let service = QuizService::new(bank, sink, config.service_config());

    let record = service
        .submit(&course.scope(&lesson.id), &lesson.quiz, &answers)
        .await
        .map_err(|e| anyhow::anyhow!("[{}] {e}", e.code()))?;
    let flushed = service.flush().await;
    if flushed > 0 {
        tracing::debug!(flushed, "waited for detached statistics updates");
    }

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&record)?),
        _ => print_text(&record),
    }

    let path = output.unwrap_or_else(|| config.output_dir.join(format!("{}.json", record.id)));
    record.save_json(&path)?;
    eprintln!("Record saved to {}", path.display());

    Ok(())
}

fn print_text(record: &GradingRecord) {
    println!("{}", record.summary_line());
    for answer in &record.result.answers {
        let selected = answer.selected.as_deref().unwrap_or("(no answer)");
        if answer.is_correct {
            println!("  [OK]    {}: {selected}", answer.question_id);
        } else {
            println!(
                "  [WRONG] {}: {selected} (expected {})",
                answer.question_id, answer.correct_answer
            );
        }
    }
}
