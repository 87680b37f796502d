use std::num::NonZeroUsize;
use std::path::PathBuf;

use progress_chart::ChartOptions;
use progress_core::DocumentPattern;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTORY_PATH: &str = "data/word_count_history.json";
pub const DEFAULT_CHART_PATH: &str = "assets/tex_progress.svg";
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update LaTeX writing progress";

/// Everything a collection or render run needs besides the credential.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_path: PathBuf,
    pub chart_path: PathBuf,
    /// Account whose repositories are counted; the credential's own login when unset.
    pub account: Option<String>,
    pub pattern: DocumentPattern,
    pub include_forks: bool,
    /// Keep only the newest N entries after each upsert. Zero is rejected
    /// so the entry for the run's own date always survives.
    pub retain_days: Option<NonZeroUsize>,
    pub api_url: Option<String>,
    pub chart: ChartOptions,
    pub publish: PublishConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            account: None,
            pattern: DocumentPattern::default(),
            include_forks: false,
            retain_days: None,
            api_url: None,
            chart: ChartOptions::default(),
            publish: PublishConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    pub commit: bool,
    pub message: String,
    /// Working tree the artifacts are committed in; the process cwd when unset.
    pub repo_dir: Option<PathBuf>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            commit: false,
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            repo_dir: None,
        }
    }
}
