use super::Launch;
use super::messages::Message;
use archive_reader_core::config::AppConfig;
use archive_reader_core::{
    ServiceRunner, Shell, ShellContext, WindowId, WindowSet,
};
use iced::{Size, Task, window};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Alert {
    pub id: u64,
    pub window: Option<WindowId>,
    pub message: String,
}

/// iced window ids are allocated by the runtime; the shell uses its own.
#[derive(Debug, Default)]
pub struct WindowMap {
    next: u64,
    by_native: HashMap<window::Id, WindowId>,
    by_window: HashMap<WindowId, window::Id>,
}

impl WindowMap {
    pub fn allocate(&mut self, native: window::Id) -> WindowId {
        self.next += 1;
        let window = WindowId::new(self.next);
        self.by_native.insert(native, window);
        self.by_window.insert(window, native);
        window
    }

    pub fn window(&self, native: window::Id) -> Option<WindowId> {
        self.by_native.get(&native).copied()
    }

    pub fn native(&self, window: WindowId) -> Option<window::Id> {
        self.by_window.get(&window).copied()
    }

    pub fn release(&mut self, native: window::Id) -> Option<WindowId> {
        let window = self.by_native.remove(&native)?;
        self.by_window.remove(&window);
        Some(window)
    }
}

pub struct App {
    pub(super) shell: Shell,
    pub(super) runner: ServiceRunner,
    pub(super) live: Arc<WindowSet>,
    pub(super) windows: WindowMap,
    pub(super) alerts: Vec<Alert>,
    pub(super) next_alert: u64,
    pub(super) config_path: PathBuf,
}

impl App {
    pub fn bootstrap(launch: Launch) -> (App, Task<Message>) {
        let live = Arc::new(WindowSet::new());
        let context = ShellContext::new(live.clone(), launch.termination);
        let mut app = App {
            shell: Shell::new(context, launch.config, launch.testing),
            runner: ServiceRunner::new(launch.coordinator),
            live,
            windows: WindowMap::default(),
            alerts: Vec::new(),
            next_alert: 0,
            config_path: launch.config_path,
        };
        info!(
            restored = launch.snapshot.as_ref().map_or(0, |s| s.windows.len()),
            opens = launch.opens.len(),
            "Bootstrapping windows"
        );
        let effects = app.shell.start(launch.snapshot, launch.opens);
        let task = app.run_effects(effects);
        (app, task)
    }

    pub fn config(&self) -> &AppConfig {
        self.shell.config()
    }

    pub(super) fn window_settings(&self) -> window::Settings {
        window::Settings {
            size: Size::new(self.config().window_width, self.config().window_height),
            ..window::Settings::default()
        }
    }

    pub(super) fn push_alert(&mut self, window: Option<WindowId>, message: String) {
        self.next_alert += 1;
        self.alerts.push(Alert {
            id: self.next_alert,
            window,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_map_allocates_and_releases() {
        let mut map = WindowMap::default();
        let native = window::Id::unique();

        let window = map.allocate(native);
        assert_eq!(map.window(native), Some(window));
        assert_eq!(map.native(window), Some(native));

        assert_eq!(map.release(native), Some(window));
        assert_eq!(map.window(native), None);
        assert_eq!(map.release(native), None);
    }

    #[test]
    fn window_ids_are_not_reused() {
        let mut map = WindowMap::default();
        let first = map.allocate(window::Id::unique());
        let second = map.allocate(window::Id::unique());
        assert_ne!(first, second);
    }
}
