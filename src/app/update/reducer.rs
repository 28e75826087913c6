use super::super::messages::Message;
use super::super::state::App;
use archive_reader_core::{Effect, OpenRequest, ShellEvent};
use tracing::{debug, warn};

impl App {
    /// Translates host messages into shell events and reduces them.
    pub(super) fn reduce(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Shell(event) => self.shell.reduce(event),
            Message::WindowOpened(native) => {
                let Some(window) = self.windows.window(native) else {
                    warn!(?native, "Opened window was never requested");
                    return Vec::new();
                };
                self.live.insert(window);
                self.shell.reduce(ShellEvent::WindowOpened(window))
            }
            Message::WindowFocused(native) => match self.windows.window(native) {
                Some(window) => self.shell.reduce(ShellEvent::WindowFocused(window)),
                None => Vec::new(),
            },
            Message::WindowClosed(native) => {
                let Some(window) = self.windows.release(native) else {
                    debug!(?native, "Close event for unknown window");
                    return Vec::new();
                };
                self.live.remove(window);
                self.alerts.retain(|alert| alert.window != Some(window));
                self.shell.reduce(ShellEvent::WindowClosed(window))
            }
            Message::FileDropped {
                window: native,
                path,
            } => {
                let window = self.windows.window(native);
                let mut effects = match window {
                    Some(window) => self.shell.reduce(ShellEvent::WindowFocused(window)),
                    None => Vec::new(),
                };
                match OpenRequest::file(&path) {
                    Ok(request) => effects.extend(self.shell.reduce(ShellEvent::UrlOpened(request))),
                    Err(err) => {
                        warn!(path = %path.display(), "Ignoring dropped file: {err:#}");
                        self.push_alert(window, format!("Cannot open {}: {err}", path.display()));
                    }
                }
                effects
            }
            Message::KeyPressed {
                window,
                key,
                modifiers,
            } => match self.shortcut_message_for_key(window, key, modifiers) {
                Some(message) => self.reduce(message),
                None => Vec::new(),
            },
            Message::DismissAlert(id) => {
                self.alerts.retain(|alert| alert.id != id);
                Vec::new()
            }
            Message::PollSystemSignals => {
                if crate::take_sigint_requested() {
                    self.shell.reduce(ShellEvent::TerminateRequested)
                } else {
                    Vec::new()
                }
            }
        }
    }
}
