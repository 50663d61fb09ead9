//! Pulseboard CLI
//!
//! Terminal client for the usage-analytics dashboard.
//!
//! Usage:
//! ```bash
//! # Sign in once; the session is kept in ~/.pulseboard/session.json
//! pulseboard login --username ada --password hunter2
//!
//! # Live dashboard, refreshed every 30 seconds
//! pulseboard watch --start 2024-01-01 --end 2024-01-07
//!
//! # One refresh, printed as JSON
//! pulseboard summary --json
//!
//! # Point at other services (env vars override the config file)
//! ANALYTICS_SERVICE_URL=http://analytics:8001 pulseboard watch
//! ```

mod commands;
mod config;
mod render;

use anyhow::{Context, anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{HELP, WatchCommand};
use config::ClientConfig;
use pulseboard_app::{App, AuthSubmission};
use pulseboard_core::types::parse_date;
use pulseboard_core::{DateBound, DateRange, EventFilter, PollStatus};
use pulseboard_egress::RegisterRequest;
use pulseboard_storage::FileCredentialStorage;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Pulseboard - usage analytics in your terminal
#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(about = "Pulseboard analytics dashboard client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PULSEBOARD_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Identity service base URL
    #[arg(long, value_name = "URL", global = true)]
    user_service_url: Option<String>,

    /// Analytics service base URL
    #[arg(long, value_name = "URL", global = true)]
    analytics_service_url: Option<String>,

    /// Where the session credential is kept
    #[arg(long, value_name = "FILE", global = true)]
    session_file: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PULSEBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account, then sign in with it
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "PULSEBOARD_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Show the signed-in user's profile
    Whoami,
    /// Fetch the dashboard once and print it
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Print the normalized dashboard data as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// List recent raw events
    Events {
        #[arg(long)]
        skip: Option<u32>,

        #[arg(long, default_value = "20")]
        limit: u32,

        #[arg(long)]
        event_type: Option<String>,

        #[arg(long)]
        user_id: Option<i64>,
    },
    /// Live dashboard; reads commands from stdin
    Watch {
        #[command(flatten)]
        range: RangeArgs,

        /// Refresh interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(clap::Args)]
struct RangeArgs {
    /// First day of the range (default: 7 days ago)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
    start: Option<NaiveDate>,

    /// Last day of the range (default: today)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date_arg)]
    end: Option<NaiveDate>,
}

impl RangeArgs {
    fn resolve(&self) -> DateRange {
        let mut range = DateRange::last_week();
        if let Some(start) = self.start {
            range = range.with_bound(DateBound::Start, start);
        }
        if let Some(end) = self.end {
            range = range.with_bound(DateBound::End, end);
        }
        range
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

impl Cli {
    /// CLI flags take precedence over env and file
    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.user_service_url {
            config.user_service_url = url.clone();
        }
        if let Some(url) = &self.analytics_service_url {
            config.analytics_service_url = url.clone();
        }
        if let Some(path) = &self.session_file {
            config.session_file = path.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Commands::Watch {
            interval: Some(secs),
            ..
        } = &self.command
        {
            config.poll_interval_secs = (*secs).max(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_file(path)
            .map_err(|e| anyhow!("Failed to load config from {}: {}", path, e))?,
        None => ClientConfig::default(),
    };
    config.merge_env();
    cli.apply_overrides(&mut config);

    pulseboard_observability::init(&config.logging.level, config.logging.json)?;
    debug!(
        "Using identity service {} and analytics service {}",
        config.user_service_url, config.analytics_service_url
    );

    let session_path = config.session_path();
    let storage = Arc::new(FileCredentialStorage::new(&session_path));
    let mut app_config = config.app_config()?;

    match cli.command {
        Commands::Login { username, password } => {
            let app = App::new(app_config, storage)?;
            app.sign_in(&AuthSubmission::Login {
                username: username.clone(),
                password,
            })
            .await?;
            println!("Signed in as {}", username);
        }
        Commands::Register {
            username,
            email,
            password,
            full_name,
        } => {
            let app = App::new(app_config, storage)?;
            let request = RegisterRequest {
                username: username.clone(),
                email,
                password,
                full_name: full_name.filter(|name| !name.trim().is_empty()),
            };
            app.sign_in(&AuthSubmission::Register(request)).await?;
            println!("Registered and signed in as {}", username);
        }
        Commands::Logout => {
            let mut app = App::new(app_config, storage)?;
            app.logout().await?;
            println!("Signed out");
        }
        Commands::Status => {
            let app = App::new(app_config, storage)?;
            if app.session().restore().await.is_some() {
                println!("Signed in (session: {})", session_path.display());
            } else {
                println!("Signed out");
            }
        }
        Commands::Whoami => {
            let app = App::new(app_config, storage)?;
            require_session(&app).await?;
            let user = app.whoami().await?;
            print!("{}", render::user(&user));
        }
        Commands::Events {
            skip,
            limit,
            event_type,
            user_id,
        } => {
            let app = App::new(app_config, storage)?;
            require_session(&app).await?;
            let filter = EventFilter {
                skip,
                limit: Some(limit),
                event_type,
                user_id,
            };
            let events = app.analytics_client()?.recent_events(&filter).await?;
            print!("{}", render::events(&events));
        }
        Commands::Summary { range, json } => {
            app_config.initial_range = Some(range.resolve());
            let mut app = App::new(app_config, storage)?;
            run_summary(&mut app, json).await?;
        }
        Commands::Watch { range, .. } => {
            app_config.initial_range = Some(range.resolve());
            let mut app = App::new(app_config, storage)?;
            run_watch(&mut app).await?;
        }
    }

    Ok(())
}

async fn require_session(app: &App) -> anyhow::Result<()> {
    if app.session().restore().await.is_none() {
        bail!("Not signed in; run `pulseboard login` first");
    }
    Ok(())
}

/// Mount the dashboard, wait for the first cycle to settle, print, unmount
async fn run_summary(app: &mut App, json: bool) -> anyhow::Result<()> {
    if !app.init().await? {
        bail!("Not signed in; run `pulseboard login` first");
    }

    let view = {
        let dashboard = app
            .dashboard()
            .context("dashboard not mounted after sign-in")?;
        let mut snapshots = dashboard.subscribe();
        snapshots
            .wait_for(|s| matches!(s.status, PollStatus::Ready | PollStatus::Error))
            .await?;
        dashboard.view()
    };
    app.shutdown().await;

    if json {
        if let Some(data) = &view.data {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
    } else {
        print!("{}", render::dashboard(&view));
    }

    match view.error {
        Some(error) => Err(anyhow!(error)),
        None => Ok(()),
    }
}

async fn run_watch(app: &mut App) -> anyhow::Result<()> {
    if !app.init().await? {
        bail!("Not signed in; run `pulseboard login` first");
    }

    {
        let dashboard = app
            .dashboard()
            .context("dashboard not mounted after sign-in")?;
        let mut snapshots = dashboard.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        println!("{}", HELP);
        print!("{}", render::dashboard(&dashboard.view()));

        loop {
            tokio::select! {
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        warn!("Poller stopped unexpectedly");
                        break;
                    }
                    print!("{}", render::dashboard(&dashboard.view()));
                }
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => match line.parse::<WatchCommand>() {
                        Ok(WatchCommand::Refresh) => {
                            dashboard.refresh();
                        }
                        Ok(WatchCommand::SetBound(bound, date)) => {
                            let range = dashboard.set_range_bound(bound, date);
                            println!("range: {}", range);
                        }
                        Ok(WatchCommand::Help) => println!("{}", HELP),
                        Ok(WatchCommand::Quit) => break,
                        Err(e) => eprintln!("{}; {}", e, HELP),
                    },
                    Ok(None) => {
                        debug!("stdin closed, watching until interrupted");
                        stdin_open = false;
                    }
                    Err(e) => {
                        warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }
    }

    app.shutdown().await;
    Ok(())
}
