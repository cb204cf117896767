use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, WatchInput};
use cli::render;
use config::Config;
use reviewcount::api::{SummaryFetcher, WaniKaniClient};
use reviewcount::connectivity::{probe_reachability, watch_connectivity};
use reviewcount::credentials::{CredentialStore, FileCredentialStore};
use reviewcount::reload_policy::ReloadPolicy;
use reviewcount::review_state::{ReviewCountInfo, ReviewSnapshot};
use reviewcount::scheduler::ReviewScheduler;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reviewcount")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("reviewcount.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let default_level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let fetcher: Arc<dyn SummaryFetcher> = Arc::new(
        WaniKaniClient::new(config.api.client_config()).context("Failed to build API client")?,
    );
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(config.credentials.token_path()));

    match &cli.command {
        None | Some(Commands::Watch) => run_watch(fetcher, credentials, config).await,
        Some(Commands::Login { token }) => handle_login_command(fetcher, credentials, token).await,
        Some(Commands::Logout) => handle_logout_command(credentials.as_ref()),
        Some(Commands::Status) => handle_status_command(fetcher.as_ref(), credentials.as_ref(), cli.is_verbose()).await,
    }
}

async fn run_watch(
    fetcher: Arc<dyn SummaryFetcher>,
    credentials: Arc<dyn CredentialStore>,
    config: &Config,
) -> Result<()> {
    info!("Launching watch mode");
    let scheduler = ReviewScheduler::new(fetcher, credentials);
    let updates = scheduler.subscribe();
    let cancel = CancellationToken::new();

    if config.connectivity.enabled {
        let statuses = probe_reachability(
            config.connectivity.probe_host.clone(),
            Duration::from_millis(config.connectivity.interval_ms),
            Duration::from_millis(config.connectivity.timeout_ms),
        );
        tokio::spawn(watch_connectivity(statuses, scheduler.clone(), cancel.clone()));
    }

    scheduler.start();
    println!(
        "{}",
        "Watching reviews. Commands: start, reload, quit (Ctrl-C also quits)".dimmed()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let result = watch_loop(&scheduler, updates, stdin, tokio::signal::ctrl_c(), &config.reviews_url).await;

    cancel.cancel();
    scheduler.shutdown();
    result
}

/// Print published states and handle stdin commands until `shutdown`
/// completes, the user quits, or the scheduler goes away.
async fn watch_loop<R, F, E>(
    scheduler: &ReviewScheduler,
    mut updates: watch::Receiver<ReviewCountInfo>,
    input: R,
    shutdown: F,
    reviews_url: &str,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::result::Result<(), E>>,
{
    let mut lines = input.lines();
    let mut input_open = true;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let info = updates.borrow_and_update().clone();
                println!("{}", render::colored_line(&info));
            }
            line = lines.next_line(), if input_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => match WatchInput::parse(&line) {
                        Some(WatchInput::Start) => {
                            println!("{} {}", "Review at:".green(), reviews_url);
                            scheduler.signal_user_started_reviewing();
                        }
                        Some(WatchInput::Reload) => scheduler.restart(),
                        Some(WatchInput::Quit) => break,
                        None if line.trim().is_empty() => {}
                        None => println!("{} {}", "Unknown command:".red(), line.trim()),
                    },
                    None => input_open = false,
                }
            }
        }
    }

    Ok(())
}

async fn handle_login_command(
    fetcher: Arc<dyn SummaryFetcher>,
    credentials: Arc<dyn CredentialStore>,
    token: &str,
) -> Result<()> {
    info!("Logging in");
    let scheduler = ReviewScheduler::new(fetcher, credentials);
    let user = scheduler.add_credential(token).await.context("Login failed")?;
    scheduler.shutdown();

    println!("{} {} (level {})", "Logged in as".green(), user.username.bold(), user.level);
    Ok(())
}

fn handle_logout_command(credentials: &dyn CredentialStore) -> Result<()> {
    info!("Logging out");
    credentials.remove().context("Failed to remove API token")?;
    println!("{}", "Logged out".green());
    Ok(())
}

async fn handle_status_command(
    fetcher: &dyn SummaryFetcher,
    credentials: &dyn CredentialStore,
    verbose: bool,
) -> Result<()> {
    let Some(token) = credentials.get().context("Failed to read API token")? else {
        println!("{}", render::colored_line(&ReviewCountInfo::Unloaded));
        return Ok(());
    };

    let now = chrono::Utc::now();
    let (info, policy) = match fetcher.fetch_summary(&token).await {
        Ok(summary) => {
            let snapshot = ReviewSnapshot::from_summary(&summary, now);
            let policy = ReloadPolicy::decide(snapshot.next_reviews_at, None, now);
            (ReviewCountInfo::Loaded(snapshot), policy)
        }
        Err(e) => {
            warn!("Status fetch failed: {}", e);
            if verbose {
                println!("{} {}", "Error:".red(), e);
            }
            (ReviewCountInfo::Error { kind: e.kind() }, e.reload_policy())
        }
    };

    println!("{}", render::colored_line(&info));
    if verbose {
        match policy.wake_at(now, &chrono::Local) {
            Some(wake) => println!("Next check ({}): {}", policy, render::local_time(wake)),
            None => println!("Next check ({}): waiting for a restart", policy),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the level is known
    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    // Run the main application logic
    runtime
        .block_on(run_application(&cli, &config))
        .context("Application failed")?;

    Ok(())
}
