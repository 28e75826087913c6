mod reducer;
mod runtime;
mod shortcuts;

use super::messages::Message;
use super::state::App;
use iced::event;
use iced::time;
use iced::window;
use iced::{Subscription, Task};
use std::time::Duration;

const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(200);
const APP_TITLE: &str = "Archive Reader";

impl App {
    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            event::listen_with(runtime::runtime_event_to_message),
            window::close_events().map(Message::WindowClosed),
            time::every(SIGNAL_POLL_INTERVAL).map(|_| Message::PollSystemSignals),
        ])
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let effects = self.reduce(message);
        self.run_effects(effects)
    }

    pub fn title(&self, native: window::Id) -> String {
        let Some(state) = self
            .windows
            .window(native)
            .and_then(|window| self.shell.window(window))
        else {
            return APP_TITLE.to_string();
        };
        format!("{} - {APP_TITLE}", state.current_item().label())
    }
}
