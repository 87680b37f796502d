use std::env;
use std::path::PathBuf;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    #[default]
    Collect,
    Render,
}

#[derive(Debug, Default)]
pub struct CliArgs {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub account: Option<String>,
    pub pattern: Option<String>,
    pub local: Option<PathBuf>,
    pub date: Option<String>,
    pub no_commit: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

pub fn parse_from(args: impl IntoIterator<Item = String>) -> Result<CliArgs, String> {
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();
    let mut command_seen = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "collect" | "render" if !command_seen => {
                parsed.command = if arg == "render" {
                    Command::Render
                } else {
                    Command::Collect
                };
                command_seen = true;
            }
            "--config" => parsed.config = Some(PathBuf::from(value(&mut args, &arg)?)),
            "--account" => parsed.account = Some(value(&mut args, &arg)?),
            "--pattern" => parsed.pattern = Some(value(&mut args, &arg)?),
            "--local" => parsed.local = Some(PathBuf::from(value(&mut args, &arg)?)),
            "--date" => parsed.date = Some(value(&mut args, &arg)?),
            "--no-commit" => {
                parsed.no_commit = true;
            }
            "--help" | "-h" => {
                parsed.help = true;
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    args.next()
        .filter(|value| !value.starts_with("--"))
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub fn print_help() {
    println!(
        "LaTeX writing progress collector\n\n\
Usage:\n  texprogress [collect|render] [options]\n\n\
Commands:\n  collect  Count words across the account's repositories and update the chart (default)\n  render   Re-render the chart from the stored history\n\n\
Options:\n  --config <path>    Read settings from this TOML file (default: ./texprogress.toml if present)\n  --account <name>   Count this account's repositories instead of the token owner's\n  --pattern <glob>   Document pattern (default: *.tex)\n  --local <dir>      Count checked-out repositories under <dir> instead of calling the API\n  --date <YYYY-MM-DD> Record the total under this date instead of today (UTC)\n  --no-commit        Do not commit the artifacts even if publishing is configured\n  -h, --help         Show this help message\n\n\
Environment:\n  GH_TOKEN or GITHUB_TOKEN  Read-only access token (a .env file is honoured)\n  RUST_LOG                  Log filter\n"
    );
}
