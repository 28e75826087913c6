use super::messages::Message;
use super::state::App;
use archive_reader_core::config::{
    EXTERNAL_LINK_POLICIES, MAX_PAGE_ZOOM, MIN_PAGE_ZOOM, SNIPPET_MODES, SettingsPatch,
};
use archive_reader_core::services::LibraryState;
use archive_reader_core::{NavigationItem, ShellEvent, WindowId};
use iced::alignment::Vertical;
use iced::widget::{
    Column, Row, button, checkbox, column, container, horizontal_space, pick_list, row, slider,
    text,
};
use iced::{Element, Length, window};

impl App {
    pub fn view(&self, native: window::Id) -> Element<'_, Message> {
        let Some((window, state)) = self
            .windows
            .window(native)
            .and_then(|window| Some((window, self.shell.window(window)?)))
        else {
            return container(text("Opening window...")).padding(20).into();
        };
        let item = state.current_item();

        let body: Element<'_, Message> = match item {
            NavigationItem::Loading => text("Opening library...").into(),
            NavigationItem::Reading => self.reading_view(window),
            NavigationItem::Settings => self.settings_view(),
            other => text(format!("{} will be listed here.", other.label())).into(),
        };

        let content = column![self.navigation_bar(window, item)]
            .push(self.alerts_view(window))
            .push(body)
            .spacing(16)
            .padding(16);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn navigation_bar(&self, window: WindowId, current: NavigationItem) -> Element<'_, Message> {
        let destinations: Vec<Element<'_, Message>> = NavigationItem::selectable()
            .iter()
            .map(|item| {
                let selected = ShellEvent::NavigationSelected {
                    window,
                    item: *item,
                };
                button(text(item.label()))
                    .on_press_maybe((*item != current).then(|| selected.into()))
                    .into()
            })
            .collect();

        let refresh = button("Refresh library").on_press_maybe(
            (self.shell.library_state() != LibraryState::InProgress)
                .then(|| ShellEvent::LibraryRefreshRequested.into()),
        );

        Row::with_children(destinations)
            .push(horizontal_space())
            .push(text(format!("Library: {}", self.shell.library_state())))
            .push(refresh)
            .push(button("New window").on_press(ShellEvent::NewWindowRequested.into()))
            .spacing(8)
            .align_y(Vertical::Center)
            .width(Length::Fill)
            .into()
    }

    fn alerts_view(&self, window: WindowId) -> Element<'_, Message> {
        let banners: Vec<Element<'_, Message>> = self
            .alerts
            .iter()
            .filter(|alert| alert.window.is_none_or(|target| target == window))
            .map(|alert| {
                row![
                    text(&alert.message).width(Length::Fill),
                    button("Dismiss").on_press(Message::DismissAlert(alert.id)),
                ]
                .spacing(8)
                .align_y(Vertical::Center)
                .into()
            })
            .collect();
        Column::with_children(banners).spacing(6).into()
    }

    fn reading_view(&self, window: WindowId) -> Element<'_, Message> {
        match self.shell.loaded_url(window) {
            Some(url) => column![text("Now reading").size(20), text(url.to_string())]
                .spacing(8)
                .into(),
            None => text(
                "No archive open. Drop a .zim file onto this window or pass one on the command line.",
            )
            .into(),
        }
    }

    fn settings_view(&self) -> Element<'_, Message> {
        let config = self.config();

        let toggles = column![
            checkbox("Include library in backups", config.backup_documents).on_toggle(|enabled| {
                settings_changed(SettingsPatch {
                    backup_documents: Some(enabled),
                    ..SettingsPatch::default()
                })
            }),
            checkbox("Refresh library at startup", config.library_auto_refresh).on_toggle(
                |enabled| {
                    settings_changed(SettingsPatch {
                        library_auto_refresh: Some(enabled),
                        ..SettingsPatch::default()
                    })
                }
            ),
            checkbox("Reopen windows on launch", config.restore_windows).on_toggle(|enabled| {
                settings_changed(SettingsPatch {
                    restore_windows: Some(enabled),
                    ..SettingsPatch::default()
                })
            }),
        ]
        .spacing(8);

        let pickers = column![
            row![
                text("External links").width(Length::Fixed(160.0)),
                pick_list(
                    EXTERNAL_LINK_POLICIES,
                    Some(config.external_link_policy),
                    |policy| settings_changed(SettingsPatch {
                        external_link_policy: Some(policy),
                        ..SettingsPatch::default()
                    }),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
            row![
                text("Search snippets").width(Length::Fixed(160.0)),
                pick_list(
                    SNIPPET_MODES,
                    Some(config.search_snippet_mode),
                    |mode| settings_changed(SettingsPatch {
                        search_snippet_mode: Some(mode),
                        ..SettingsPatch::default()
                    }),
                ),
            ]
            .spacing(8)
            .align_y(Vertical::Center),
        ]
        .spacing(8);

        let zoom = column![
            text(format!("Page zoom: {:.0}%", config.page_zoom * 100.0)),
            slider(MIN_PAGE_ZOOM..=MAX_PAGE_ZOOM, config.page_zoom, |zoom| {
                settings_changed(SettingsPatch {
                    page_zoom: Some(zoom),
                    ..SettingsPatch::default()
                })
            })
            .step(0.05),
        ]
        .spacing(4)
        .width(Length::Fixed(320.0));

        column![text("Settings").size(20), toggles, pickers, zoom]
            .spacing(16)
            .into()
    }
}

fn settings_changed(patch: SettingsPatch) -> Message {
    ShellEvent::SettingsChanged(patch).into()
}
