//! ecostats - Ecosystem contributor statistics
//!
//! A CLI tool that collects the repositories of a software ecosystem
//! (explicit URLs plus every public repository of its GitHub organizations),
//! fetches weekly contributor statistics for each, and reports the number of
//! distinct active contributors per calendar month.
//!
//! Exit codes:
//!   0 - Success (per-repository failures are logged and skipped)
//!   1 - Startup error (invalid arguments, unreadable manifest or config)

mod analysis;
mod cli;
mod config;
mod github;
mod models;
mod repo;
mod report;

use analysis::{collect_activity, monthly_counts, WeeklyActivity};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use github::{GitHubClient, RetryPolicy, StatsFetcher};
use indicatif::{ProgressBar, ProgressStyle};
use models::{Manifest, Report};
use repo::{parse_repo_reference, RepositorySetBuilder};
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("ecostats v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .ecostats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout only carries the report. `RUST_LOG`
/// overrides the level chosen by --verbose/--quiet.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the ecosystem (or single repository) report.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if args.token.is_none() {
        warn!("No GitHub token supplied; unauthenticated requests are heavily rate limited");
    }

    let client = GitHubClient::new(&config.github, args.token.as_deref())?;
    let fetcher = StatsFetcher::new(&client, RetryPolicy::from(&config.retry));
    debug!("Retry policy: {:?}", fetcher.policy());

    let report = match args.repo.as_deref() {
        Some(url) => inspect_repository(&fetcher, url, args.format).await?,
        None => {
            // Read before the first request.
            let path = &config.general.manifest;
            info!("Loading manifest: {}", path.display());
            let manifest = Manifest::load(path)?;
            ecosystem_report(&manifest, &fetcher, &config, &args).await
        }
    };

    let output = match args.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    println!("{}", output);
    Ok(())
}

/// Build the repository set, collect activity across it and roll it up.
async fn ecosystem_report(
    manifest: &Manifest,
    fetcher: &StatsFetcher<'_, GitHubClient>,
    config: &Config,
    args: &Args,
) -> Report {
    let builder = RepositorySetBuilder::new(fetcher, config.github.per_page);
    let repos = builder.build(manifest).await;
    if repos.is_empty() {
        warn!("Manifest resolved to no repositories");
    }

    let progress = make_progress_bar(repos.len() as u64, args.quiet);
    let mut activity = WeeklyActivity::new();
    let summary = collect_activity(&repos, fetcher, &mut activity, &progress).await;
    progress.finish_and_clear();

    if activity.is_empty() {
        warn!("No contributor activity recorded");
    }

    info!(
        "Processed {} of {} repositories ({} failed, {} skipped), {} active weeks",
        summary.processed,
        summary.repositories,
        summary.failed,
        summary.skipped,
        activity.len()
    );

    Report {
        source: config.general.manifest.display().to_string(),
        generated_at: Utc::now(),
        summary: Some(summary),
        weekly: args.weekly.then(|| activity.weekly_counts()),
        monthly: monthly_counts(&activity),
    }
}

/// Handle --repo: print contributors and activity for one repository.
async fn inspect_repository(
    fetcher: &StatsFetcher<'_, GitHubClient>,
    url: &str,
    format: OutputFormat,
) -> Result<Report> {
    let path = parse_repo_reference(url)
        .with_context(|| format!("Not a repository reference: {}", url))?;

    info!("Inspecting {}", path);
    let stats = fetcher
        .fetch(&path.owner, &path.name)
        .await
        .with_context(|| format!("Failed to fetch statistics for {}", path))?;

    if format == OutputFormat::Text {
        println!("{}\n", report::render_contributors(&stats));
    }

    let mut activity = WeeklyActivity::new();
    activity.fold_repository(&stats);

    Ok(Report {
        source: url.to_string(),
        generated_at: Utc::now(),
        summary: None,
        weekly: Some(activity.weekly_counts()),
        monthly: monthly_counts(&activity),
    })
}

/// Progress bar over the repository loop; hidden in quiet mode.
fn make_progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let template = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
    if let Ok(style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
