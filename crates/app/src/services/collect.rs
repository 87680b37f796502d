use ingest::{CollectOptions, CollectStats, collect_snapshots};
use progress_core::{NaiveDate, RepositorySource, Upsert};
use progress_store::{Artifact, WriteOutcome, encode_series, load_series, write_artifacts};
use tracing::info;

use crate::error::Result;
use crate::services::{SharedConfig, chart_artifact};

#[derive(Debug, Clone)]
pub struct CollectReport {
    pub date: NaiveDate,
    pub total_words: u64,
    pub upsert: Upsert,
    pub entries: usize,
    pub stats: CollectStats,
    pub history: WriteOutcome,
    pub chart: WriteOutcome,
    pub committed: bool,
}

impl CollectReport {
    pub fn changed(&self) -> bool {
        self.history == WriteOutcome::Written || self.chart == WriteOutcome::Written
    }
}

#[derive(Clone)]
pub struct CollectorService {
    config: SharedConfig,
}

impl CollectorService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Nothing is written unless every repository was counted.
    pub async fn run(&self, source: &dyn RepositorySource, date: NaiveDate) -> Result<CollectReport> {
        let mut series = load_series(&self.config.history_path)?;

        let options = CollectOptions {
            pattern: self.config.pattern.clone(),
            include_forks: self.config.include_forks,
        };
        let stats = collect_snapshots(source, &options).await?;

        let upsert = series.upsert(date, stats.total_words);
        if let Some(days) = self.config.retain_days {
            let dropped = series.retain_latest(days.get());
            if dropped > 0 {
                info!(dropped, retain_days = days.get(), "trimmed history");
            }
        }

        let artifacts = [
            Artifact::new(&self.config.history_path, encode_series(&series)?),
            chart_artifact(&self.config, &series)?,
        ];
        let outcomes = write_artifacts(&artifacts)?;

        info!(
            %date,
            words = stats.total_words,
            entries = series.len(),
            replaced = matches!(upsert, Upsert::Replaced { .. }),
            "recorded daily total"
        );
        Ok(CollectReport {
            date,
            total_words: stats.total_words,
            upsert,
            entries: series.len(),
            stats,
            history: outcomes[0],
            chart: outcomes[1],
            committed: false,
        })
    }
}
