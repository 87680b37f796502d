mod args;
mod config;

use std::env;
use std::process::ExitCode;

use github_api::GitHubClient;
use ingest::LocalSource;
use progress_app::{AppError, AppState, parse_date, today_utc};
use progress_core::{Credential, RepositorySource};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{CliArgs, Command};

const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];
const DEFAULT_LOG_FILTER: &str =
    "texprogress=info,progress_app=info,progress_store=info,ingest=info,github_api=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match args::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            args::print_help();
            return ExitCode::from(2);
        }
    };
    if args.help {
        args::print_help();
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "progress update failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<(), AppError> {
    let loaded = config::load(args.config.as_deref()).map_err(AppError::InvalidInput)?;
    if let Some(file) = loaded.file.as_ref() {
        info!(config = %file.display(), "loaded config");
    }
    let mut app_config = loaded.config;
    config::apply_overrides(&mut app_config, &args).map_err(AppError::InvalidInput)?;
    let app = AppState::new(app_config);

    match args.command {
        Command::Render => {
            let report = app.render()?;
            println!(
                "Rendered {} from {} entries{}",
                app.config.chart_path.display(),
                report.entries,
                if report.changed() { "" } else { " (unchanged)" }
            );
        }
        Command::Collect => {
            let date = match args.date.as_deref() {
                Some(value) => parse_date(value)?,
                None => today_utc(),
            };
            let source = build_source(&app, &args)?;
            let report = app.collect(source.as_ref(), date).await?;
            println!(
                "Recorded {} words for {} across {} repositories ({} entries){}",
                report.total_words,
                report.date,
                report.stats.repositories_scanned,
                report.entries,
                if report.committed { ", committed" } else { "" }
            );
        }
    }
    Ok(())
}

fn build_source(app: &AppState, args: &CliArgs) -> Result<Box<dyn RepositorySource>, AppError> {
    if let Some(root) = args.local.as_ref() {
        let owner = app.config.account.clone().unwrap_or_else(|| "local".to_string());
        info!(root = %root.display(), "counting local checkouts");
        return Ok(Box::new(LocalSource::new(root, owner)));
    }

    let credential = read_credential()?;
    let mut client = GitHubClient::new(credential)?.with_account(app.config.account.clone());
    if let Some(api_url) = app.config.api_url.as_ref() {
        client = client.with_api_url(api_url.clone());
    }
    Ok(Box::new(client))
}

fn read_credential() -> Result<Credential, AppError> {
    TOKEN_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(Credential::new)
        .ok_or_else(|| {
            AppError::Authorization(format!("no access token: set {}", TOKEN_VARS.join(" or ")))
        })
}
