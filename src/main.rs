#![forbid(unsafe_code)]
#![deny(warnings, clippy::all, clippy::pedantic)]

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use repostatus::{
    DefaultFsOps, DefaultGitRunner, FsOps, StatusMap,
    config::{Config, default_config_path, load_config},
    github::{GithubClient, RepoFilter, scan_remote},
    output::{TabStyle, format_tab, to_json},
    scan_local,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Tab,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "Reconcile the status of many git repositories.")]
struct Cli {
    /// Config file (default: ~/.config/repostatus/config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: tab (default) or json
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Tab)]
    output: OutputFormat,

    /// Table style to use with --output tab
    #[arg(long, global = true, value_enum, default_value_t = TabStyle::Rounded)]
    tab_style: TabStyle,

    /// Only show repositories with something to act on
    #[arg(long, global = true)]
    actionable: bool,

    /// Show a progress bar while inspecting
    #[arg(long, global = true)]
    progress: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect working copies found under local roots
    Local(LocalArgs),
    /// Inspect repositories owned by the authenticated GitHub user and their orgs
    Github(GithubArgs),
}

#[derive(Args, Debug)]
struct LocalArgs {
    /// Root directories to scan (default: ~/src)
    roots: Vec<PathBuf>,

    /// Directory depth to search below each root (unlimited when omitted)
    #[arg(long)]
    depth: Option<usize>,

    /// Maximum concurrent inspections
    #[arg(long)]
    concurrency: Option<NonZeroUsize>,

    /// Do not refresh remote-tracking refs before inspecting
    #[arg(long)]
    no_fetch: bool,

    /// Seconds to wait for `git fetch` before marking tracking info stale
    #[arg(long, value_name = "SECS")]
    fetch_timeout: Option<u64>,
}

#[derive(Args, Debug)]
struct GithubArgs {
    /// Environment variable holding the API token
    #[arg(long, value_name = "VAR")]
    token_env: Option<String>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Maximum concurrent inspections
    #[arg(long)]
    concurrency: Option<NonZeroUsize>,

    /// Skip forked repositories
    #[arg(long)]
    no_forks: bool,

    /// Only inspect repositories owned by NAME (repeatable)
    #[arg(long = "owner", value_name = "NAME")]
    owners: Vec<String>,
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(explicit: Option<&Path>, fs: &dyn FsOps) -> Result<Config, String> {
    match explicit {
        Some(path) => load_config(&fs.expand_tilde(path)).map_err(|e| e.to_string()),
        None => {
            let path = fs.expand_tilde(&default_config_path());
            if path.is_file() {
                load_config(&path).map_err(|e| e.to_string())
            } else {
                debug!(path = %path.display(), "no config file");
                Ok(Config::default())
            }
        }
    }
}

fn run_local(args: LocalArgs, config: &Config, progress: bool) -> Result<StatusMap, String> {
    let mut opts = config.local_options().map_err(|e| e.to_string())?;
    if !args.roots.is_empty() {
        opts.roots = args.roots;
    }
    if args.depth.is_some() {
        opts.depth = args.depth;
    }
    if let Some(concurrency) = args.concurrency {
        opts.concurrency = concurrency;
    }
    if args.no_fetch {
        opts.refresh_remotes = false;
    }
    match args.fetch_timeout {
        Some(0) => return Err("--fetch-timeout must be positive".to_string()),
        Some(secs) => opts.fetch_timeout = Duration::from_secs(secs),
        None => {}
    }
    opts.progress = progress;
    scan_local(&opts, &DefaultFsOps, &DefaultGitRunner).map_err(|e| e.to_string())
}

fn run_github(args: GithubArgs, config: &Config, progress: bool) -> Result<StatusMap, String> {
    let mut opts = config.remote_options().map_err(|e| e.to_string())?;
    if let Some(concurrency) = args.concurrency {
        opts.concurrency = concurrency;
    }
    opts.progress = progress;

    let mut rules = config.filter_rules();
    if args.no_forks {
        rules.include_forks = false;
    }
    if !args.owners.is_empty() {
        rules.owners = args.owners;
    }

    let token_env = args.token_env.as_deref().unwrap_or_else(|| config.token_env());
    let token = std::env::var(token_env).ok().filter(|t| !t.is_empty());
    if token.is_none() {
        warn!(var = token_env, "no API token set; requests are unauthenticated");
    }
    let api_url = args.api_url.as_deref().unwrap_or_else(|| config.api_url());
    let client = GithubClient::new(api_url, token);

    scan_remote(&client, &RepoFilter::from_rules(rules), &opts).map_err(|e| e.to_string())
}

fn render(
    data: &StatusMap,
    output: OutputFormat,
    style: TabStyle,
    actionable: bool,
) -> Result<String, String> {
    match output {
        OutputFormat::Tab => Ok(format_tab(data, style, actionable)),
        OutputFormat::Json => to_json(data, actionable).map_err(|e| e.to_string()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = read_config(cli.config.as_deref(), &DefaultFsOps).and_then(|config| {
        let data = match cli.command {
            Command::Local(args) => run_local(args, &config, cli.progress)?,
            Command::Github(args) => run_github(args, &config, cli.progress)?,
        };
        render(&data, cli.output, cli.tab_style, cli.actionable)
    });

    match result {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
