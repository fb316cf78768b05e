//! breakwatch - Synchronized break timer
//!
//! Hosts several break timer tabs in one process. The tabs share one origin
//! storage and reconcile against the break-tracking backend, so starting or
//! ending a break in any tab shows up in all of them.
//!
//! It wires together:
//! - Configuration loading
//! - Origin storage (SQLite or in-memory)
//! - The backend client (HTTP, or an in-process mock with `--offline`)
//! - One tab runtime per tab
//! - Line-based commands on stdin

mod commands;
mod view;

use anyhow::{Context, Result, bail};
use breakwatch_client::{HttpStatusClient, MockBreakServer, StatusClient};
use breakwatch_config::{Settings, StorageBackend, load_config_or_default, validate_base_url};
use breakwatch_core::{Tab, TabHandle};
use breakwatch_store::{SharedStorage, SqliteBackend, TimerStateStore};
use breakwatch_util::{
    BREAKWATCH_DATA_DIR_ENV, BREAKWATCH_SERVER_ENV, STORAGE_FILENAME, SystemTime, TabId, TimeSource,
    default_config_path,
};
use clap::Parser;
use commands::{Command, HELP, TabAction, parse_command};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use view::TerminalView;

/// breakwatch - Synchronized break timer
#[derive(Parser, Debug)]
#[command(name = "breakwatch")]
#[command(about = "Break timer kept in sync across tabs", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/breakwatch/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Backend base URL override (or set BREAKWATCH_SERVER env var)
    #[arg(short, long, env = BREAKWATCH_SERVER_ENV)]
    server: Option<String>,

    /// Data directory override (or set BREAKWATCH_DATA_DIR env var)
    #[arg(short, long, env = BREAKWATCH_DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Number of tabs to open
    #[arg(short, long, default_value_t = 2)]
    tabs: usize,

    /// Keep origin storage in memory instead of SQLite
    #[arg(long)]
    memory: bool,

    /// Use an in-process mock backend instead of the HTTP server
    #[arg(long)]
    offline: bool,

    /// Print every clock tick
    #[arg(long)]
    ticks: bool,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

struct OpenTab {
    handle: TabHandle,
    view: Arc<TerminalView>,
    task: JoinHandle<()>,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    if let Some(server) = &args.server {
        if let Err(message) = validate_base_url(server) {
            bail!("Invalid server URL '{}': {}", server, message);
        }
        settings.server.base_url = server.trim_end_matches('/').to_string();
    }
    if let Some(data_dir) = &args.data_dir {
        settings.storage.data_dir = data_dir.clone();
    }
    if args.memory {
        settings.storage.backend = StorageBackend::Memory;
    }

    info!(
        config_path = %args.config.display(),
        server = %settings.server.base_url,
        backend = ?settings.storage.backend,
        "Configuration loaded"
    );

    Ok(settings)
}

fn open_storage(settings: &Settings) -> Result<SharedStorage> {
    let storage = match settings.storage.backend {
        StorageBackend::Memory => SharedStorage::in_memory(),
        StorageBackend::Sqlite => {
            let data_dir = &settings.storage.data_dir;
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

            let db_path = data_dir.join(STORAGE_FILENAME);
            let backend = SqliteBackend::open(&db_path)
                .with_context(|| format!("Failed to open origin storage {:?}", db_path))?;
            info!(db_path = %db_path.display(), "Origin storage opened");
            SharedStorage::new(backend)
        }
    };

    if storage.is_healthy() {
        info!("Origin storage healthy");
    } else {
        warn!("Origin storage reports unhealthy, continuing");
    }

    Ok(storage)
}

async fn check_backend(client: &dyn StatusClient) {
    match client.check_status().await {
        Ok(status) => info!(?status, "Backend reachable"),
        Err(e) => warn!(error = %e, "Backend unreachable at startup, tabs will retry on reload"),
    }
}

fn run_command(tabs: &[OpenTab], command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Help => println!("{HELP}"),
        Command::Show => {
            for tab in tabs {
                println!("{}", tab.view.summary());
            }
        }
        Command::Tab { index, action } => {
            let Some(tab) = tabs.get(index) else {
                println!("no tab {} (have {})", index + 1, tabs.len());
                return true;
            };
            let result = match action {
                TabAction::Start => tab.handle.start(),
                TabAction::End => tab.handle.end(),
                TabAction::Cancel => tab.handle.cancel_reason(),
                TabAction::Reason(reason) => tab.handle.submit_reason(reason),
                TabAction::Reload => tab.handle.reload(),
            };
            if let Err(e) = result {
                error!(tab = index + 1, error = %e, "Failed to reach tab");
            }
        }
    }
    true
}

async fn run(args: Args) -> Result<()> {
    if args.tabs == 0 {
        bail!("At least one tab is required");
    }

    let settings = load_settings(&args)?;
    let storage = open_storage(&settings)?;
    let time: Arc<dyn TimeSource> = Arc::new(SystemTime);

    let client: Arc<dyn StatusClient> = if args.offline {
        info!("Using in-process mock backend");
        Arc::new(MockBreakServer::new(time.clone()))
    } else {
        Arc::new(HttpStatusClient::new(settings.server.clone()))
    };
    check_backend(client.as_ref()).await;

    let mut tabs = Vec::with_capacity(args.tabs);
    for n in 1..=args.tabs {
        let view = Arc::new(TerminalView::new(format!("tab {n}"), args.ticks));
        let store = TimerStateStore::new(storage.attach(TabId::new()), settings.storage.key.clone());
        let (tab, handle) = Tab::new(
            store,
            view.clone(),
            client.clone(),
            time.clone(),
            &settings.display,
        );
        let task = tokio::spawn(tab.run());
        tabs.push(OpenTab { handle, view, task });
    }

    info!(tabs = tabs.len(), subscribers = storage.subscriber_count(), "Tabs opened");
    println!("{} tabs open, type 'help' for commands", tabs.len());

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !run_command(&tabs, command) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    for tab in &tabs {
        let _ = tab.handle.close();
    }
    for tab in tabs {
        if let Err(e) = tab.task.await {
            warn!(tab_id = %tab.handle.tab_id().short(), error = %e, "Tab task failed");
        }
    }

    info!("breakwatch stopped");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "breakwatch starting");

    run(args).await
}
