//! The `coursekit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("coursekit.toml").exists() {
        println!("coursekit.toml already exists, skipping.");
    } else {
        std::fs::write("coursekit.toml", SAMPLE_CONFIG)?;
        println!("Created coursekit.toml");
    }

    std::fs::create_dir_all("courses")?;
    for (path, content) in [
        ("courses/example.toml", EXAMPLE_COURSE),
        ("courses/example-answers.json", EXAMPLE_ANSWERS),
    ] {
        if std::path::Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content)?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Run: coursekit validate --course courses/example.toml");
    println!(
        "  2. Run: coursekit grade --course courses/example.toml --lesson capitals --answers courses/example-answers.json"
    );
    println!("  3. Run: coursekit play --difficulty easy");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# coursekit configuration

default_success_threshold = 70
default_difficulty = "EASY"
stats_journal = "coursekit-results/stats.jsonl"
detach_stats = false
session_ttl_secs = 1800
output_dir = "coursekit-results"
"#;

const EXAMPLE_COURSE: &str = r#"[course]
id = "geo-101"
name = "Geography Basics"
description = "Capitals and rivers of Europe"

[[lessons]]
id = "capitals"
title = "European capitals"

[lessons.quiz]
enabled = true
success_threshold = 70
max_wrong_allowed = 1

[[lessons]]
id = "rivers"
title = "Rivers"

[lessons.quiz]
success_threshold = 70

[[questions]]
id = "q-france"
lesson_id = "capitals"
question = "What is the capital of France?"
options = ["Berlin", "Paris", "Madrid"]
correct_answer = "Paris"
difficulty = "easy"
category = "capitals"

[[questions]]
id = "q-spain"
lesson_id = "capitals"
question = "What is the capital of Spain?"
options = ["Lisbon", "Madrid", "Rome"]
correct_answer = "Madrid"
difficulty = "easy"
category = "capitals"

[[questions]]
id = "q-poland"
lesson_id = "capitals"
question = "What is the capital of Poland?"
options = ["Kraków", "Gdańsk", "Warsaw"]
correct_answer = "Warsaw"
difficulty = "medium"
category = "capitals"

[[questions]]
id = "q-danube"
lesson_id = "rivers"
question = "Which river flows through Vienna?"
options = ["Rhine", "Danube", "Elbe"]
correct_answer = "Danube"
category = "rivers"
"#;

const EXAMPLE_ANSWERS: &str = r#"[
  { "question_id": "q-france", "selected_option": "Paris" },
  { "question_id": "q-spain", "selected_index": 1 },
  { "question_id": "q-poland", "selected_option": "Kraków" }
]
"#;
