mod messages;
mod state;
mod update;
mod view;

pub use state::App;

use archive_reader_core::config::AppConfig;
use archive_reader_core::session::SessionSnapshot;
use archive_reader_core::{AppLifecycleCoordinator, OpenRequest, TerminationFlag};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the host needs from `main` to start.
pub struct Launch {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub testing: bool,
    pub opens: Vec<OpenRequest>,
    pub snapshot: Option<SessionSnapshot>,
    pub coordinator: Arc<AppLifecycleCoordinator>,
    pub termination: TerminationFlag,
}

/// Runs the multi-window host until the shell requests exit.
pub fn run_app(launch: Launch) -> iced::Result {
    iced::daemon(App::title, App::update, App::view)
        .subscription(App::subscription)
        .run_with(move || App::bootstrap(launch))
}
