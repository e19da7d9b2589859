//! The `coursekit stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursekit_store::StatsJournal;

pub async fn execute(journal: PathBuf) -> Result<()> {
    let usage = StatsJournal::replay(&journal).await?;

    if usage.is_empty() {
        println!("No question usage recorded in {}.", journal.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Question", "Shown", "Correct", "Accuracy", "Last shown"]);

    for (question_id, u) in &usage {
        let last = u
            .last_shown_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(question_id),
            Cell::new(u.times_shown),
            Cell::new(u.times_correct),
            Cell::new(format!("{:.1}%", u.accuracy() * 100.0)),
            Cell::new(last),
        ]);
    }

    println!("{table}");
    Ok(())
}
