use archive_reader_core::ShellEvent;
use iced::keyboard::{Key, Modifiers};
use iced::window;
use std::path::PathBuf;

/// Messages emitted by the UI and the windowing runtime.
#[derive(Debug, Clone)]
pub enum Message {
    /// Already expressed in the shell's terms.
    Shell(ShellEvent),
    WindowOpened(window::Id),
    WindowFocused(window::Id),
    WindowClosed(window::Id),
    FileDropped {
        window: window::Id,
        path: PathBuf,
    },
    KeyPressed {
        window: window::Id,
        key: Key,
        modifiers: Modifiers,
    },
    DismissAlert(u64),
    PollSystemSignals,
}

impl From<ShellEvent> for Message {
    fn from(event: ShellEvent) -> Self {
        Message::Shell(event)
    }
}
