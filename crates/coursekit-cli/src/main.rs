//! coursekit CLI: quiz grading and memory-match game from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coursekit", version, about = "Quiz grading and memory-match engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a quiz submission against a course file
    Grade {
        /// Path to the course .toml file
        #[arg(long)]
        course: PathBuf,

        /// Lesson whose quiz is being submitted
        #[arg(long)]
        lesson: String,

        /// JSON array of answers
        #[arg(long)]
        answers: PathBuf,

        /// Write the grading record to this file [default: <output_dir>/<record id>.json]
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate course TOML files
    Validate {
        /// Path to course file or directory
        #[arg(long)]
        course: PathBuf,
    },

    /// List memory-match difficulty tiers
    Tiers,

    /// Play a memory-match game in the terminal
    Play {
        /// Difficulty tier: easy, medium, hard, expert
        #[arg(long)]
        difficulty: Option<String>,

        /// Seed for a reproducible deal
        #[arg(long)]
        seed: Option<u64>,

        /// Play a perfect game automatically
        #[arg(long)]
        auto: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show question usage recorded in a statistics journal
    Stats {
        /// Path to the JSON-lines journal
        #[arg(long)]
        journal: PathBuf,
    },

    /// Create starter config and example course
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursekit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            course,
            lesson,
            answers,
            output,
            format,
            config,
        } => commands::grade::execute(course, lesson, answers, output, format, config).await,
        Commands::Validate { course } => commands::validate::execute(course),
        Commands::Tiers => commands::tiers::execute(),
        Commands::Play {
            difficulty,
            seed,
            auto,
            config,
        } => commands::play::execute(difficulty, seed, auto, config),
        Commands::Stats { journal } => commands::stats::execute(journal).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
