use super::super::messages::Message;
use super::super::state::App;
use archive_reader_core::config::save_config;
use archive_reader_core::session::save_session;
use archive_reader_core::{Effect, PlatformRequest};
use iced::Event;
use iced::Task;
use iced::event;
use iced::keyboard;
use iced::window;
use tracing::{debug, info, warn};

impl App {
    pub(in crate::app) fn run_effects(&mut self, effects: Vec<Effect>) -> Task<Message> {
        if effects.is_empty() {
            return Task::none();
        }
        let tasks: Vec<Task<Message>> = effects
            .into_iter()
            .map(|effect| self.run_effect(effect))
            .collect();
        Task::batch(tasks)
    }

    fn run_effect(&mut self, effect: Effect) -> Task<Message> {
        match effect {
            Effect::Platform(request) => self.apply_platform(request),
            Effect::Service(call) => {
                let runner = self.runner.clone();
                Task::perform(async move { runner.perform(call).await }, Message::Shell)
            }
        }
    }

    fn apply_platform(&mut self, request: PlatformRequest) -> Task<Message> {
        match request {
            PlatformRequest::OpenWindow => {
                let (native, opened) = window::open(self.window_settings());
                let window = self.windows.allocate(native);
                debug!(%window, "Opening window");
                opened.map(Message::WindowOpened)
            }
            PlatformRequest::CloseWindow(window) => match self.windows.native(window) {
                Some(native) => window::close(native),
                None => Task::none(),
            },
            PlatformRequest::LoadUrl { window, tab, url } => {
                info!(%window, %tab, %url, "Showing page");
                Task::none()
            }
            PlatformRequest::Alert { window, message } => {
                warn!(window = ?window, "{message}");
                self.push_alert(window, message);
                Task::none()
            }
            PlatformRequest::PersistSession(snapshot) => {
                if let Err(err) = save_session(&self.config().session_path(), &snapshot) {
                    warn!("Failed to persist session: {err:#}");
                }
                Task::none()
            }
            PlatformRequest::SaveConfig(config) => {
                if let Err(err) = save_config(&self.config_path, &config) {
                    warn!(path = %self.config_path.display(), "Failed to save config: {err:#}");
                }
                Task::none()
            }
            PlatformRequest::Exit => {
                info!("Exiting");
                iced::exit()
            }
        }
    }
}

pub(super) fn runtime_event_to_message(
    event: Event,
    status: event::Status,
    window: window::Id,
) -> Option<Message> {
    match event {
        Event::Window(window::Event::Focused) => Some(Message::WindowFocused(window)),
        Event::Window(window::Event::FileDropped(path)) => {
            Some(Message::FileDropped { window, path })
        }
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. })
            if status == event::Status::Ignored =>
        {
            Some(Message::KeyPressed {
                window,
                key,
                modifiers,
            })
        }
        _ => None,
    }
}
