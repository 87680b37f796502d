use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::error::{AppError, Result};
use crate::services::SharedConfig;

/// Commits the written artifacts with the local `git` binary.
#[derive(Clone)]
pub struct PublishService {
    config: SharedConfig,
}

impl PublishService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn enabled(&self) -> bool {
        self.config.publish.commit
    }

    /// Returns whether a commit was created.
    pub fn run(&self) -> Result<bool> {
        if !self.enabled() {
            return Ok(false);
        }
        let paths = self.artifact_paths()?;
        if paths.is_empty() {
            return Ok(false);
        }

        self.git(&with_paths(&["add", "--"], &paths))?;

        let staged = with_paths(&["diff", "--cached", "--quiet", "--"], &paths);
        let status = self
            .command(&staged)
            .status()
            .map_err(|err| AppError::Publish(format!("run git diff: {}", err)))?;
        if status.success() {
            info!("artifacts already committed");
            return Ok(false);
        }

        let message = self.config.publish.message.as_str();
        let commit = with_paths(&["commit", "-m", message, "--"], &paths);
        self.git(&commit)?;
        info!(files = paths.len(), "committed artifacts");
        Ok(true)
    }

    fn artifact_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for path in [&self.config.history_path, &self.config.chart_path] {
            if path.exists() {
                paths.push(path.canonicalize()?);
            }
        }
        Ok(paths)
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new("git");
        command.args(args);
        if let Some(dir) = self.config.publish.repo_dir.as_deref() {
            command.current_dir(dir);
        }
        command
    }

    fn git(&self, args: &[String]) -> Result<()> {
        let output = self.command(args).output().map_err(|err| {
            AppError::Publish(format!("run git {}: {}", args[0], err))
        })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(AppError::Publish(format!(
                "git {} failed: {}",
                args[0],
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

fn with_paths(args: &[&str], paths: &[PathBuf]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.to_string())
        .chain(paths.iter().map(|path| path.display().to_string()))
        .collect()
}
