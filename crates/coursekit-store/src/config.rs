//! coursekit configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use coursekit_core::engine::{QuizServiceConfig, StatsDispatch};
use coursekit_core::game::Difficulty;
use coursekit_core::model::DEFAULT_SUCCESS_THRESHOLD;

/// Top-level coursekit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursekitConfig {
    /// Pass mark for lessons without their own `success_threshold`.
    #[serde(default = "default_threshold")]
    pub default_success_threshold: u32,
    /// Tier used by `play` when none is given.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    /// JSON-lines file that receives question usage updates.
    #[serde(default)]
    pub stats_journal: Option<PathBuf>,
    /// Spawn statistics updates instead of awaiting them.
    #[serde(default)]
    pub detach_stats: bool,
    /// Idle lifetime of a game session.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Output directory for grading records.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_threshold() -> u32 {
    DEFAULT_SUCCESS_THRESHOLD
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_session_ttl() -> u64 {
    1800
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./coursekit-results")
}

impl Default for CoursekitConfig {
    fn default() -> Self {
        Self {
            default_success_threshold: default_threshold(),
            default_difficulty: default_difficulty(),
            stats_journal: None,
            detach_stats: false,
            session_ttl_secs: default_session_ttl(),
            output_dir: default_output_dir(),
        }
    }
}

impl CoursekitConfig {
    pub fn service_config(&self) -> QuizServiceConfig {
        QuizServiceConfig {
            default_success_threshold: self.default_success_threshold,
            stats_dispatch: if self.detach_stats {
                StatsDispatch::Detached
            } else {
                StatsDispatch::Inline
            },
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `coursekit.toml` in the current directory
/// 2. `~/.config/coursekit/config.toml`
///
/// Environment variable override: `COURSEKIT_STATS_JOURNAL`.
pub fn load_config() -> Result<CoursekitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CoursekitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("coursekit.toml");
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CoursekitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CoursekitConfig::default(),
    };

    if let Ok(journal) = std::env::var("COURSEKIT_STATS_JOURNAL") {
        config.stats_journal = Some(PathBuf::from(journal));
    }

    anyhow::ensure!(
        config.default_success_threshold <= 100,
        "default_success_threshold must be between 0 and 100"
    );

    config.stats_journal = config.stats_journal.as_deref().map(resolve_path);
    config.output_dir = resolve_path(&config.output_dir);

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("coursekit"))
}
