// services/depot-dash/src/main.rs
//
// Depot Dashboard - terminal host for the dashboard model
//
// Run with: cargo run --bin depot-dash -- --demo

use std::io::stdout;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use svckit::config::ObservabilityConfig;
use svckit::metrics;
use svckit::types::AnalyticsSnapshot;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use depot_dash::config::{config_exists, load_config, DepotDashConfig};
use depot_dash::mock::MockApi;
use depot_dash::poller::{load_directory, AnalyticsPoller, DirectoryUpdate};
use depot_dash::state::{DashboardModel, LogLevel};
use depot_dash::{ApiClient, BranchFilter, DashboardApi, DisplayMode};

mod ui;

use ui::{KeyAction, ViewState};

#[derive(Parser, Debug)]
#[command(name = "depot-dash")]
#[command(about = "Terminal dashboard for depot branches, clients and pending requests")]
#[command(version = "0.1.0")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "config/depot-dash.yaml")]
    config: String,

    /// Run with simulated data (no API required)
    #[arg(long, short)]
    demo: bool,

    /// Depot API base URL, overrides the config file
    #[arg(long)]
    api_url: Option<String>,

    /// Redraw interval in milliseconds, overrides the config file
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Start in dark display mode
    #[arg(long)]
    dark: bool,

    /// Initial branch filter: `all` or a branch id
    #[arg(long)]
    branch: Option<String>,
}

/// Everything the background tasks hand to the UI thread.
enum Update {
    Directory(DirectoryUpdate),
    Analytics(AnalyticsSnapshot),
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_found = config_exists(&args.config);
    let mut config = load_config(&args.config)?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(refresh_ms) = args.refresh_ms {
        config.dashboard.refresh_ms = refresh_ms;
    }
    if args.dark {
        config.dashboard.display_mode = DisplayMode::Dark;
    }
    let initial_filter = match &args.branch {
        Some(raw) => BranchFilter::parse(raw)
            .ok_or_else(|| anyhow!("invalid --branch '{}': expected 'all' or a branch id", raw))?,
        None => BranchFilter::All,
    };

    init_tracing(&config.observability)?;
    info!("Starting depot-dash v{}", env!("CARGO_PKG_VERSION"));
    if !config_found {
        warn!("Config file {} not found, using defaults", args.config);
    }

    let api: Arc<dyn DashboardApi> = if args.demo {
        Arc::new(MockApi::default())
    } else {
        Arc::new(ApiClient::new(config.api.clone())?)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_app(&mut terminal, &runtime, api, &config, initial_filter, args.demo);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    result
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_tracing(observability: &ObservabilityConfig) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&observability.log_file)?;

    let default_filter = format!(
        "depot_dash={level},svckit={level}",
        level = observability.log_level
    );

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    runtime: &Runtime,
    api: Arc<dyn DashboardApi>,
    config: &DepotDashConfig,
    initial_filter: BranchFilter,
    demo_mode: bool,
) -> Result<()> {
    let mut model = DashboardModel::new(config.dashboard.display_mode);
    model.on_filter_change(initial_filter);
    let mut view = ViewState::default();
    let source = api.describe();
    let request_timeout = config.api.request_timeout();
    let tick_rate = Duration::from_millis(config.dashboard.refresh_ms);

    model.add_log(LogLevel::Info, &format!("Depot dashboard started ({})", source));

    let (tx, mut rx) = mpsc::unbounded_channel();

    // One-shot directory load at startup
    let directory_api = api.clone();
    let directory_tx = tx.clone();
    let retry = config.dashboard.directory_retry();
    runtime.spawn(async move {
        let update = load_directory(directory_api.as_ref(), &retry, request_timeout).await;
        let _ = directory_tx.send(Update::Directory(update));
    });

    let poller = {
        let _guard = runtime.enter();
        AnalyticsPoller::new(api, config.dashboard.poll_interval(), request_timeout).start(
            move |snapshot| {
                let _ = tx.send(Update::Analytics(snapshot));
            },
        )
    };

    let mut was_connected = false;

    loop {
        while let Ok(update) = rx.try_recv() {
            match update {
                Update::Directory(directory) => model.apply_directory(directory),
                Update::Analytics(snapshot) => model.apply_analytics(snapshot),
            }
        }
        view.clamp(&model);

        let status = poller.status();
        let fetches = metrics::fetch_summary();
        if !demo_mode && status.attempts > 0 && status.is_connected() != was_connected {
            was_connected = status.is_connected();
            if was_connected {
                model.add_log(LogLevel::Info, "Analytics feed connected");
            } else {
                let reason = status.last_error.clone().unwrap_or_default();
                model.add_log(LogLevel::Error, &format!("Analytics feed lost: {}", reason));
            }
        }

        terminal.draw(|frame| ui::draw(frame, &model, &view, &status, &fetches, &source, demo_mode))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let KeyAction::Quit = ui::handle_key(&mut model, &mut view, key) {
                        break;
                    }
                }
            }
        }
    }

    runtime.block_on(poller.shutdown());
    info!("depot-dash exiting, API metrics:\n{}", metrics::render_text());
    Ok(())
}
