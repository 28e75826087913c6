//! Entry point for the archive reader.
//!
//! Parses the command line, loads configuration and the saved session,
//! wires the local collaborators and hands everything to the GUI host.

mod app;

use crate::app::{Launch, run_app};
use anyhow::{Context, Result, anyhow};
use archive_reader_core::config::load_config;
use archive_reader_core::services::ServiceSet;
use archive_reader_core::session::load_session;
use archive_reader_core::{AppLifecycleCoordinator, OpenRequest, TerminationFlag};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const TESTING_ENV: &str = "ARCHIVE_READER_TESTING";
const USAGE: &str = "Usage: archive-reader [--config <path>] [--testing] [<path-or-url>...]";

static SIGINT_REQUESTED: AtomicBool = AtomicBool::new(false);

pub(crate) fn take_sigint_requested() -> bool {
    SIGINT_REQUESTED.swap(false, Ordering::AcqRel)
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    config_path: PathBuf,
    testing: bool,
    targets: Vec<String>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let mut args = parse_args(env::args().skip(1))?;
    if env::var(TESTING_ENV).is_ok_and(|value| value == "1") {
        args.testing = true;
    }

    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        config = %args.config_path.display(),
        library = %config.library_path().display(),
        testing = args.testing,
        level = %config.log_level,
        "Starting archive reader"
    );

    let opens = args
        .targets
        .iter()
        .map(|raw| OpenRequest::from_argument(raw))
        .collect::<Result<Vec<_>>>()?;
    let snapshot = if config.restore_windows {
        load_session(&config.session_path())
    } else {
        None
    };

    let termination = TerminationFlag::new();
    let coordinator = Arc::new(AppLifecycleCoordinator::new(
        ServiceSet::local(&config),
        termination.clone(),
    ));
    install_sigint_handler(coordinator.clone());

    run_app(Launch {
        config,
        config_path: args.config_path,
        testing: args.testing,
        opens,
        snapshot,
        coordinator,
        termination,
    })
    .context("Failed to start the GUI")?;
    Ok(())
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        testing: false,
        targets: Vec::new(),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                parsed.config_path = PathBuf::from(path);
            }
            "--testing" => parsed.testing = true,
            "-h" | "--help" => return Err(anyhow!(USAGE)),
            flag if flag.starts_with("--") => {
                return Err(anyhow!("Unknown option {flag}\n{USAGE}"));
            }
            _ => parsed.targets.push(arg),
        }
    }
    Ok(parsed)
}

/// Marks termination immediately; the GUI picks the request up on its next
/// signal poll.
fn install_sigint_handler(coordinator: Arc<AppLifecycleCoordinator>) {
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C; shutting down");
        coordinator.terminate();
        SIGINT_REQUESTED.store(true, Ordering::Release);
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        info!("RUST_LOG set; ignoring configured log level");
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
