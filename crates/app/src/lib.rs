pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod util;

pub use app::AppState;
pub use config::{AppConfig, PublishConfig};
pub use error::{AppError, Result};
pub use services::{AppServices, CollectReport, RenderReport};
pub use util::time::{parse_date, today_utc};
