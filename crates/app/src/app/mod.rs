use progress_core::{NaiveDate, RepositorySource};

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{AppServices, CollectReport, RenderReport};

/// Application state shared by the command-line front end and tests.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    /// Counts every repository behind `source`, records the total under
    /// `date`, then writes the series and chart. With publishing enabled the
    /// artifacts are committed even when unchanged on disk, so a commit that
    /// failed on an earlier run is retried.
    pub async fn collect(
        &self,
        source: &dyn RepositorySource,
        date: NaiveDate,
    ) -> Result<CollectReport> {
        let mut report = self.services.collector.run(source, date).await?;
        report.committed = self.services.publish.run()?;
        Ok(report)
    }

    pub fn render(&self) -> Result<RenderReport> {
        let mut report = self.services.render.run()?;
        report.committed = self.services.publish.run()?;
        Ok(report)
    }
}
