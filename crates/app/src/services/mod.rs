mod collect;
mod publish;
mod render;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use progress_chart::render_svg;
use progress_core::TimeSeries;
use progress_store::Artifact;

pub use collect::{CollectReport, CollectorService};
pub use publish::PublishService;
pub use render::{RenderReport, RenderService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub collector: CollectorService,
    pub render: RenderService,
    pub publish: PublishService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            collector: CollectorService::new(shared.clone()),
            render: RenderService::new(shared.clone()),
            publish: PublishService::new(shared),
        }
    }
}

fn chart_artifact(config: &SharedConfig, series: &TimeSeries) -> Result<Artifact> {
    let svg = render_svg(series, &config.chart)?;
    Ok(Artifact::new(&config.chart_path, svg))
}
