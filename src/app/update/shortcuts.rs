use super::super::messages::Message;
use super::super::state::App;
use archive_reader_core::{NavigationItem, ShellEvent};
use iced::keyboard::{Key, Modifiers, key};
use iced::window;

#[derive(Debug, Default, PartialEq, Eq)]
struct Chord<'a> {
    ctrl: bool,
    alt: bool,
    logo: bool,
    shift: bool,
    key: Option<&'a str>,
}

impl App {
    pub(super) fn shortcut_message_for_key(
        &self,
        native: window::Id,
        key: Key,
        modifiers: Modifiers,
    ) -> Option<Message> {
        let pressed = match key.as_ref() {
            Key::Named(key::Named::Escape) => "escape".to_string(),
            Key::Named(key::Named::F5) => "f5".to_string(),
            Key::Character(ch) => ch.to_ascii_lowercase(),
            _ => return None,
        };
        let config = self.config();

        let global = [
            (&config.key_new_window, "ctrl+n", ShellEvent::NewWindowRequested),
            (&config.key_quit, "ctrl+q", ShellEvent::TerminateRequested),
            (
                &config.key_refresh_library,
                "ctrl+r",
                ShellEvent::LibraryRefreshRequested,
            ),
        ];
        if let Some((_, _, event)) = global
            .into_iter()
            .find(|(raw, fallback, _)| Self::shortcut_matches(raw, fallback, &pressed, modifiers))
        {
            return Some(event.into());
        }

        let window = self.windows.window(native)?;
        if Self::shortcut_matches(&config.key_close_window, "ctrl+w", &pressed, modifiers) {
            return Some(ShellEvent::CloseWindowRequested(window).into());
        }

        let destinations = [
            (&config.key_settings, "ctrl+,", NavigationItem::Settings),
            (&config.key_reading, "ctrl+1", NavigationItem::Reading),
            (&config.key_bookmarks, "ctrl+2", NavigationItem::Bookmarks),
            (&config.key_opened, "ctrl+3", NavigationItem::Opened),
            (&config.key_categories, "ctrl+4", NavigationItem::Categories),
            (&config.key_downloads, "ctrl+5", NavigationItem::Downloads),
            (&config.key_new, "ctrl+6", NavigationItem::New),
        ];
        destinations
            .into_iter()
            .find(|(raw, fallback, _)| Self::shortcut_matches(raw, fallback, &pressed, modifiers))
            .map(|(_, _, item)| ShellEvent::NavigationSelected { window, item }.into())
    }

    pub(super) fn shortcut_matches(
        raw: &str,
        fallback: &str,
        pressed: &str,
        modifiers: Modifiers,
    ) -> bool {
        let normalized = Self::normalize_shortcut_token(raw, fallback);
        let chord = parse_chord(&normalized);
        let Some(required_key) = chord.key else {
            return false;
        };
        pressed == required_key
            && modifiers.control() == chord.ctrl
            && modifiers.alt() == chord.alt
            && modifiers.logo() == chord.logo
            && modifiers.shift() == chord.shift
    }

    pub(super) fn normalize_shortcut_token(raw: &str, fallback: &str) -> String {
        let normalized = raw.trim().to_ascii_lowercase().replace(' ', "");
        if normalized.is_empty() {
            fallback.to_string()
        } else {
            normalized.replace("comma", ",")
        }
    }
}

/// `ctrl++` style chords are not supported; `+` only separates tokens.
fn parse_chord(normalized: &str) -> Chord<'_> {
    let mut chord = Chord::default();
    for token in normalized.split('+').filter(|token| !token.is_empty()) {
        match token {
            "ctrl" | "control" => chord.ctrl = true,
            "alt" | "option" => chord.alt = true,
            "logo" | "meta" | "super" | "cmd" | "command" => chord.logo = true,
            "shift" => chord.shift = true,
            "esc" => chord.key = Some("escape"),
            key => chord.key = Some(key),
        }
    }
    chord
}
