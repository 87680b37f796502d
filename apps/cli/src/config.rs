use std::fs;
use std::path::{Path, PathBuf};

use progress_app::AppConfig;
use progress_core::DocumentPattern;

use crate::args::CliArgs;

pub const DEFAULT_CONFIG_FILE: &str = "texprogress.toml";

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: AppConfig,
    /// File the settings came from; `None` when running on defaults.
    pub file: Option<PathBuf>,
}

/// Reads the explicit config file, or `texprogress.toml` in the working
/// directory when it exists. An explicit path must exist.
pub fn load(explicit: Option<&Path>) -> Result<ConfigLoad, String> {
    let file = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return Ok(ConfigLoad {
                    config: AppConfig::default(),
                    file: None,
                });
            }
            default
        }
    };
    let contents = fs::read_to_string(&file)
        .map_err(|err| format!("read config {}: {}", file.display(), err))?;
    let config = parse(&contents).map_err(|err| format!("parse config {}: {}", file.display(), err))?;
    Ok(ConfigLoad {
        config,
        file: Some(file),
    })
}

pub fn parse(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Command-line flags win over the file.
pub fn apply_overrides(config: &mut AppConfig, args: &CliArgs) -> Result<(), String> {
    if let Some(account) = args.account.as_ref() {
        config.account = Some(account.clone());
    }
    if let Some(pattern) = args.pattern.as_deref() {
        config.pattern = DocumentPattern::new(pattern)
            .map_err(|err| format!("invalid pattern {pattern:?}: {err}"))?;
    }
    if args.no_commit {
        config.publish.commit = false;
    }
    Ok(())
}
