use progress_store::{WriteOutcome, load_series, write_artifacts};
use tracing::info;

use crate::error::Result;
use crate::services::{SharedConfig, chart_artifact};

#[derive(Debug, Clone)]
pub struct RenderReport {
    pub entries: usize,
    pub chart: WriteOutcome,
    pub committed: bool,
}

impl RenderReport {
    pub fn changed(&self) -> bool {
        self.chart == WriteOutcome::Written
    }
}

/// Re-renders the chart from the stored series without counting anything.
#[derive(Clone)]
pub struct RenderService {
    config: SharedConfig,
}

impl RenderService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<RenderReport> {
        let series = load_series(&self.config.history_path)?;
        let outcomes = write_artifacts(&[chart_artifact(&self.config, &series)?])?;
        info!(entries = series.len(), "rendered chart");
        Ok(RenderReport {
            entries: series.len(),
            chart: outcomes[0],
            committed: false,
        })
    }
}
