//! The reducer every [`ShellEvent`] passes through.
//!
//! `Shell` owns the per-window navigation state and decides, in queue
//! order, what each platform notification means. It performs no I/O: the
//! host executes the returned [`Effect`]s and feeds completions back in.

use crate::config::AppConfig;
use crate::effect::{Effect, PlatformRequest, ServiceCall};
use crate::events::{OpenRequest, ShellEvent};
use crate::lifecycle::{LaunchOptions, LaunchReport, LaunchStep, StepOutcome};
use crate::navigation::{NavigationItem, NavigationState};
use crate::services::LibraryState;
use crate::session::{SessionSnapshot, WindowSnapshot};
use crate::tabs::{TabId, TabStore};
use crate::termination::TerminationFlag;
use crate::window::{LiveWindows, WindowId, WindowTracker};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Process-wide state shared with collaborators outside the reducer.
#[derive(Debug, Clone)]
pub struct ShellContext {
    pub tracker: Arc<WindowTracker>,
    pub tabs: Arc<TabStore>,
    pub termination: TerminationFlag,
}

impl ShellContext {
    pub fn new(live: Arc<dyn LiveWindows>, termination: TerminationFlag) -> Self {
        Self {
            tracker: Arc::new(WindowTracker::new(live)),
            tabs: Arc::new(TabStore::new()),
            termination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchPhase {
    #[default]
    NotStarted,
    Reopening,
    Settling,
    Complete,
}

impl LaunchPhase {
    fn catalog_ready(self) -> bool {
        matches!(self, LaunchPhase::Settling | LaunchPhase::Complete)
    }
}

/// What a requested-but-not-yet-open window will show.
#[derive(Debug, Clone)]
enum PendingWindow {
    Restore(WindowSnapshot),
    Open(OpenRequest),
    Blank,
}

#[derive(Debug)]
pub struct ShellWindow {
    navigation: NavigationState,
    /// Destination from the saved session, applied once loading finishes.
    resume_item: Option<NavigationItem>,
}

impl ShellWindow {
    pub fn current_item(&self) -> NavigationItem {
        self.navigation.current_item()
    }

    pub fn tab(&self) -> Option<TabId> {
        self.navigation.tab()
    }

    fn finish_loading(&mut self) {
        if !self.navigation.finish_loading() {
            return;
        }
        if let Some(item) = self.resume_item.take() {
            self.navigation.select(item);
        }
    }
}

#[derive(Debug)]
pub struct Shell {
    context: ShellContext,
    config: AppConfig,
    testing: bool,
    windows: BTreeMap<WindowId, ShellWindow>,
    awaiting: VecDeque<PendingWindow>,
    /// Archive resolutions requested before the catalog was reopened.
    held_resolves: Vec<(WindowId, PathBuf)>,
    /// A backup toggle made while launch was still applying the old value.
    backup_deferred: bool,
    phase: LaunchPhase,
    shutdown_started: bool,
    library_state: LibraryState,
}

impl Shell {
    pub fn new(context: ShellContext, config: AppConfig, testing: bool) -> Self {
        Self {
            context,
            config,
            testing,
            windows: BTreeMap::new(),
            awaiting: VecDeque::new(),
            held_resolves: Vec::new(),
            backup_deferred: false,
            phase: LaunchPhase::NotStarted,
            shutdown_started: false,
            library_state: LibraryState::Idle,
        }
    }

    pub fn context(&self) -> &ShellContext {
        &self.context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn phase(&self) -> LaunchPhase {
        self.phase
    }

    pub fn library_state(&self) -> LibraryState {
        self.library_state
    }

    pub fn window(&self, window: WindowId) -> Option<&ShellWindow> {
        self.windows.get(&window)
    }

    pub fn window_ids(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.keys().copied()
    }

    pub fn loaded_url(&self, window: WindowId) -> Option<Url> {
        let tab = self.windows.get(&window)?.tab()?;
        self.context.tabs.get(tab)?.url
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_started
    }

    /// First call after construction. Seeds the tab store from `snapshot`
    /// and requests the initial windows: one per restored window and one
    /// per launch-time open request, or a single blank window when there
    /// is neither.
    pub fn start(
        &mut self,
        snapshot: Option<SessionSnapshot>,
        opens: Vec<OpenRequest>,
    ) -> Vec<Effect> {
        if let Some(snapshot) = snapshot.filter(|snapshot| !snapshot.is_empty()) {
            info!(
                windows = snapshot.windows.len(),
                tabs = snapshot.tabs.len(),
                "Restoring session"
            );
            self.context.tabs.restore(snapshot.tabs);
            self.awaiting
                .extend(snapshot.windows.into_iter().map(PendingWindow::Restore));
        }
        self.awaiting
            .extend(opens.into_iter().map(PendingWindow::Open));
        if self.awaiting.is_empty() {
            self.awaiting.push_back(PendingWindow::Blank);
        }
        (0..self.awaiting.len())
            .map(|_| Effect::Platform(PlatformRequest::OpenWindow))
            .collect()
    }

    pub fn reduce(&mut self, event: ShellEvent) -> Vec<Effect> {
        match event {
            ShellEvent::WindowOpened(window) => self.window_opened(window),
            ShellEvent::WindowFocused(window) => {
                if self.windows.contains_key(&window) {
                    self.context.tracker.register_current(window);
                }
                Vec::new()
            }
            ShellEvent::WindowClosed(window) => self.window_closed(window),
            ShellEvent::TerminateRequested => self.terminate(),
            ShellEvent::UrlOpened(request) => self.route_open(request),
            ShellEvent::NavigationSelected { window, item } => {
                let Some(state) = self.windows.get_mut(&window) else {
                    return Vec::new();
                };
                state.resume_item = None;
                if state.navigation.select(item) {
                    vec![self.persist()]
                } else {
                    Vec::new()
                }
            }
            ShellEvent::NewWindowRequested => {
                if self.shutdown_started {
                    return Vec::new();
                }
                self.awaiting.push_back(PendingWindow::Blank);
                vec![PlatformRequest::OpenWindow.into()]
            }
            ShellEvent::CloseWindowRequested(window) => {
                if self.windows.contains_key(&window) {
                    vec![PlatformRequest::CloseWindow(window).into()]
                } else {
                    Vec::new()
                }
            }
            ShellEvent::CatalogReopened(outcome) => self.catalog_reopened(outcome),
            ShellEvent::LaunchSettled(report) => self.launch_settled(report),
            ShellEvent::ArchiveResolved {
                window,
                path,
                url,
                error,
            } => self.archive_resolved(window, path, url, error),
            ShellEvent::SettingsChanged(patch) => {
                let delta = self.config.apply_patch(patch);
                if !delta.changed {
                    return Vec::new();
                }
                let mut effects: Vec<Effect> =
                    vec![PlatformRequest::SaveConfig(self.config.clone()).into()];
                if delta.backup_changed {
                    if self.phase == LaunchPhase::Complete {
                        effects.push(ServiceCall::ApplyBackupSetting(self.config.backup_documents).into());
                    } else {
                        debug!("Launch still settling; deferring backup setting");
                        self.backup_deferred = true;
                    }
                }
                effects
            }
            ShellEvent::BackupSettingApplied { error } => error
                .map(|message| alert(None, format!("Could not change backup setting: {message}")))
                .into_iter()
                .collect(),
            ShellEvent::LibraryRefreshRequested => {
                if self.library_state == LibraryState::InProgress {
                    debug!("Library refresh already running");
                    return Vec::new();
                }
                self.library_state = LibraryState::InProgress;
                vec![ServiceCall::RefreshLibrary {
                    user_initiated: true,
                }
                .into()]
            }
            ShellEvent::LibraryRefreshed { state, error } => {
                self.library_state = state;
                error
                    .map(|message| alert(None, format!("Library refresh failed: {message}")))
                    .into_iter()
                    .collect()
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let windows = self
            .windows
            .values()
            .map(|window| {
                let tab = window.tab();
                let item = match window.current_item() {
                    NavigationItem::Loading => {
                        window.resume_item.unwrap_or(NavigationItem::Reading)
                    }
                    item => item,
                };
                WindowSnapshot {
                    tab,
                    url: tab.and_then(|tab| self.context.tabs.get(tab)?.url),
                    item,
                }
            })
            .collect();
        SessionSnapshot {
            windows,
            tabs: self.context.tabs.snapshot(),
        }
    }

    fn window_opened(&mut self, window: WindowId) -> Vec<Effect> {
        if self.windows.contains_key(&window) {
            self.context.tracker.register_current(window);
            return Vec::new();
        }
        if self.shutdown_started {
            debug!(%window, "Window opened during shutdown; closing it");
            return vec![PlatformRequest::CloseWindow(window).into()];
        }

        let pending = self.awaiting.pop_front().unwrap_or(PendingWindow::Blank);
        let mut state = ShellWindow {
            navigation: NavigationState::new(
                self.context.tabs.clone(),
                self.context.termination.clone(),
            ),
            resume_item: None,
        };
        let mut effects: Vec<Effect> = Vec::new();
        let mut open = None;

        match pending {
            PendingWindow::Restore(snapshot) => {
                let tab = self.reclaim_tab(&state.navigation, &snapshot);
                state.navigation.bind_tab(tab);
                state.resume_item = Some(snapshot.item).filter(|item| *item != NavigationItem::Loading);
                if let Some(url) = self.context.tabs.get(tab).and_then(|record| record.url) {
                    effects.push(PlatformRequest::LoadUrl { window, tab, url }.into());
                }
            }
            PendingWindow::Open(request) => {
                state.navigation.bind_tab(self.context.tabs.create(None));
                open = Some(request);
            }
            PendingWindow::Blank => {
                state.navigation.bind_tab(self.context.tabs.create(None));
            }
        }

        let phase = self.phase;
        match phase {
            LaunchPhase::NotStarted => {
                self.phase = LaunchPhase::Reopening;
                effects.push(ServiceCall::ReopenCatalog.into());
            }
            _ if phase.catalog_ready() => state.finish_loading(),
            _ => {}
        }

        info!(%window, tab = ?state.tab(), item = %state.current_item(), "Window opened");
        self.windows.insert(window, state);
        self.context.tracker.register_current(window);

        if let Some(request) = open {
            effects.extend(self.open_in(window, request));
        }
        effects.push(self.persist());
        effects
    }

    /// Restored windows take back their old tab when its URL still maps to
    /// an unclaimed session; otherwise they start fresh.
    fn reclaim_tab(&self, navigation: &NavigationState, snapshot: &WindowSnapshot) -> TabId {
        let claimed = self.claimed_tabs();
        let by_url = snapshot
            .url
            .as_ref()
            .and_then(|url| navigation.tab_id_for(url, &claimed));
        let by_id = || {
            snapshot.tab.filter(|tab| {
                !claimed.contains(tab) && self.context.tabs.get(*tab).is_some()
            })
        };
        by_url
            .or_else(by_id)
            .unwrap_or_else(|| self.context.tabs.create(snapshot.url.clone()))
    }

    fn claimed_tabs(&self) -> BTreeSet<TabId> {
        self.windows.values().filter_map(ShellWindow::tab).collect()
    }

    fn window_closed(&mut self, window: WindowId) -> Vec<Effect> {
        self.context.tracker.forget(window);
        let mut effects: Vec<Effect> = Vec::new();
        if let Some(mut state) = self.windows.remove(&window) {
            match state.navigation.handle_window_closed() {
                Some(tab) => info!(%window, %tab, "Window closed by user"),
                None => debug!(%window, terminating = state.navigation.is_terminating(), "Window closed"),
            }
            if !self.shutdown_started {
                effects.push(self.persist());
            }
        }

        if self.windows.is_empty() && (self.shutdown_started || self.awaiting.is_empty()) {
            info!("Last window closed; exiting");
            effects.push(PlatformRequest::Exit.into());
        }
        effects
    }

    fn terminate(&mut self) -> Vec<Effect> {
        self.context.termination.mark();
        if self.shutdown_started {
            debug!("Termination already in progress");
            return Vec::new();
        }
        self.shutdown_started = true;
        self.awaiting.clear();
        info!(windows = self.windows.len(), "Shutting down");

        let mut effects = vec![self.persist()];
        effects.extend(
            self.windows
                .keys()
                .map(|window| Effect::Platform(PlatformRequest::CloseWindow(*window))),
        );
        if self.windows.is_empty() {
            effects.push(PlatformRequest::Exit.into());
        }
        effects
    }

    /// Picks the window an external open lands in. Concurrent opens are
    /// serialized by the queue and each sees the window state left by the
    /// one before it.
    fn route_open(&mut self, request: OpenRequest) -> Vec<Effect> {
        if self.context.termination.is_terminating() {
            debug!(url = %request.url, "Ignoring open request during shutdown");
            return Vec::new();
        }
        let tracker = &self.context.tracker;
        let target = tracker
            .current()
            .filter(|window| self.windows.contains_key(window))
            .or_else(|| {
                if !tracker.is_last_window() {
                    return None;
                }
                tracker
                    .open_windows()
                    .into_iter()
                    .find(|window| self.windows.contains_key(window))
            });

        match target {
            Some(window) => {
                debug!(%window, url = %request.url, "Routing open request");
                self.open_in(window, request)
            }
            None => {
                debug!(url = %request.url, "No usable window; requesting a new one");
                self.awaiting.push_back(PendingWindow::Open(request));
                vec![PlatformRequest::OpenWindow.into()]
            }
        }
    }

    fn open_in(&mut self, window: WindowId, request: OpenRequest) -> Vec<Effect> {
        let Some(state) = self.windows.get_mut(&window) else {
            return self.route_open(request);
        };
        state.resume_item = None;
        state.navigation.show_reading();

        if !request.is_file {
            return self.load_url(window, request.url);
        }
        match request.file_path() {
            Some(path) if !self.phase.catalog_ready() => {
                debug!(%window, path = %path.display(), "Catalog not reopened yet; holding archive");
                self.held_resolves.push((window, path));
                Vec::new()
            }
            Some(path) => vec![ServiceCall::ResolveArchive { window, path }.into()],
            None => vec![alert(
                Some(window),
                format!("{} is not a local file", request.url),
            )],
        }
    }

    fn load_url(&mut self, window: WindowId, url: Url) -> Vec<Effect> {
        let Some(state) = self.windows.get_mut(&window) else {
            return Vec::new();
        };
        let tab = match state.tab() {
            Some(tab) if self.context.tabs.set_url(tab, url.clone()) => tab,
            _ => {
                let tab = self.context.tabs.create(Some(url.clone()));
                state.navigation.bind_tab(tab);
                tab
            }
        };
        vec![
            PlatformRequest::LoadUrl { window, tab, url }.into(),
            self.persist(),
        ]
    }

    fn archive_resolved(
        &mut self,
        window: WindowId,
        path: PathBuf,
        url: Option<Url>,
        error: Option<String>,
    ) -> Vec<Effect> {
        if self.context.termination.is_terminating() {
            return Vec::new();
        }
        let live = self.windows.contains_key(&window) && self.context.tracker.is_open(window);
        let Some(url) = url else {
            let message = error.unwrap_or_else(|| format!("{} could not be opened", path.display()));
            warn!(%window, path = %path.display(), "Archive open failed: {message}");
            return vec![alert(live.then_some(window), message)];
        };
        if live {
            self.load_url(window, url)
        } else {
            debug!(%window, %url, "Target window closed while resolving; rerouting");
            self.route_open(OpenRequest::url(url))
        }
    }

    fn catalog_reopened(&mut self, outcome: StepOutcome) -> Vec<Effect> {
        self.phase = LaunchPhase::Settling;
        for state in self.windows.values_mut() {
            state.finish_loading();
        }
        let mut effects: Vec<Effect> = Vec::new();
        if let Some(message) = &outcome.error {
            effects.push(alert(None, format!("Could not reopen archives: {message}")));
        }
        if self.shutdown_started {
            self.phase = LaunchPhase::Complete;
            self.held_resolves.clear();
            return effects;
        }
        effects.extend(
            self.held_resolves
                .drain(..)
                .map(|(window, path)| Effect::Service(ServiceCall::ResolveArchive { window, path })),
        );
        let options = LaunchOptions::from_config(&self.config, self.testing);
        effects.push(ServiceCall::SettleLaunch(options).into());
        effects.push(self.persist());
        effects
    }

    fn launch_settled(&mut self, report: LaunchReport) -> Vec<Effect> {
        self.phase = LaunchPhase::Complete;
        let mut effects: Vec<Effect> = Vec::new();
        if std::mem::take(&mut self.backup_deferred) {
            effects.push(ServiceCall::ApplyBackupSetting(self.config.backup_documents).into());
        }
        if let Some(refresh) = report
            .steps
            .iter()
            .find(|outcome| outcome.step == LaunchStep::RefreshLibrary)
        {
            self.library_state = if refresh.succeeded() {
                LibraryState::Complete
            } else {
                LibraryState::Error
            };
        }
        let failures: Vec<String> = report
            .failures()
            .map(|outcome| {
                format!(
                    "{}: {}",
                    outcome.step,
                    outcome.error.as_deref().unwrap_or_default()
                )
            })
            .collect();
        if !failures.is_empty() {
            effects.push(alert(None, format!("Startup incomplete. {}", failures.join("; "))));
        }
        effects
    }

    fn persist(&self) -> Effect {
        PlatformRequest::PersistSession(self.snapshot()).into()
    }
}

fn alert(window: Option<WindowId>, message: String) -> Effect {
    PlatformRequest::Alert { window, message }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsPatch;
    use crate::window::WindowSet;

    struct Harness {
        live: Arc<WindowSet>,
        shell: Shell,
        next_window: u64,
    }

    impl Harness {
        fn new() -> Self {
            let live = Arc::new(WindowSet::new());
            let context = ShellContext::new(live.clone(), TerminationFlag::new());
            Self {
                live,
                shell: Shell::new(context, AppConfig::default(), true),
                next_window: 0,
            }
        }

        fn open(&mut self) -> (WindowId, Vec<Effect>) {
            self.next_window += 1;
            let window = WindowId::new(self.next_window);
            self.live.insert(window);
            let effects = self.shell.reduce(ShellEvent::WindowOpened(window));
            (window, effects)
        }

        fn close(&mut self, window: WindowId) -> Vec<Effect> {
            self.live.remove(window);
            self.shell.reduce(ShellEvent::WindowClosed(window))
        }

        fn tab(&self, window: WindowId) -> TabId {
            self.shell
                .window(window)
                .and_then(ShellWindow::tab)
                .expect("window has a tab")
        }

        fn item(&self, window: WindowId) -> NavigationItem {
            self.shell.window(window).expect("window").current_item()
        }

        fn tabs(&self) -> Vec<TabId> {
            self.shell.context().tabs.ids()
        }

        fn reopen_catalog(&mut self) -> Vec<Effect> {
            self.shell
                .reduce(ShellEvent::CatalogReopened(StepOutcome {
                    step: LaunchStep::ReopenCatalog,
                    error: None,
                }))
        }

        fn finish_launch(&mut self) -> Vec<Effect> {
            let mut effects = self.reopen_catalog();
            effects.extend(
                self.shell
                    .reduce(ShellEvent::LaunchSettled(LaunchReport::default())),
            );
            effects
        }
    }

    fn file_request(name: &str) -> OpenRequest {
        OpenRequest::url(Url::parse(&format!("file:///library/{name}")).expect("file url"))
    }

    fn count(effects: &[Effect], wanted: fn(&Effect) -> bool) -> usize {
        effects.iter().filter(|effect| wanted(effect)).count()
    }

    fn is_open_window(effect: &Effect) -> bool {
        matches!(effect, Effect::Platform(PlatformRequest::OpenWindow))
    }

    fn is_exit(effect: &Effect) -> bool {
        matches!(effect, Effect::Platform(PlatformRequest::Exit))
    }

    fn resolved_windows(effects: &[Effect]) -> Vec<WindowId> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Service(ServiceCall::ResolveArchive { window, .. }) => Some(*window),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_without_session_requests_one_blank_window() {
        let mut harness = Harness::new();
        let effects = harness.shell.start(None, Vec::new());
        assert_eq!(count(&effects, is_open_window), 1);
    }

    #[test]
    fn first_window_starts_launch_exactly_once() {
        let mut harness = Harness::new();
        let (_, first) = harness.open();
        let (_, second) = harness.open();

        assert!(first.contains(&Effect::Service(ServiceCall::ReopenCatalog)));
        assert!(!second.contains(&Effect::Service(ServiceCall::ReopenCatalog)));
        assert_eq!(harness.shell.phase(), LaunchPhase::Reopening);
    }

    #[test]
    fn closing_one_of_three_windows_deletes_only_its_tab() {
        let mut harness = Harness::new();
        let (_, _) = harness.open();
        let (b, _) = harness.open();
        let (_, _) = harness.open();
        let tab_b = harness.tab(b);
        let mut expected = harness.tabs();
        expected.retain(|tab| *tab != tab_b);

        let effects = harness.close(b);

        assert_eq!(harness.tabs(), expected);
        assert_eq!(harness.tabs().len(), 2);
        assert_eq!(count(&effects, is_exit), 0);
    }

    #[test]
    fn closes_after_termination_delete_no_tabs() {
        let mut harness = Harness::new();
        let windows: Vec<WindowId> = (0..3).map(|_| harness.open().0).collect();
        let before = harness.tabs();

        let effects = harness.shell.reduce(ShellEvent::TerminateRequested);
        assert!(harness.shell.context().termination.is_terminating());
        let close_requests = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Platform(PlatformRequest::CloseWindow(_))))
            .count();
        assert_eq!(close_requests, 3);

        let mut exits = 0;
        for window in windows {
            exits += count(&harness.close(window), is_exit);
        }

        assert_eq!(harness.tabs(), before);
        assert_eq!(exits, 1);
    }

    #[test]
    fn repeated_terminate_is_a_no_op() {
        let mut harness = Harness::new();
        harness.open();

        assert!(!harness.shell.reduce(ShellEvent::TerminateRequested).is_empty());
        assert!(harness.shell.reduce(ShellEvent::TerminateRequested).is_empty());
        assert!(harness.shell.context().termination.is_terminating());
    }

    #[test]
    fn terminate_persists_before_closing_windows() {
        let mut harness = Harness::new();
        harness.open();
        harness.open();

        let effects = harness.shell.reduce(ShellEvent::TerminateRequested);

        let Effect::Platform(PlatformRequest::PersistSession(snapshot)) = &effects[0] else {
            panic!("expected session to persist first, got {effects:?}");
        };
        assert_eq!(snapshot.windows.len(), 2);
    }

    #[test]
    fn navigation_follows_loading_reading_bookmarks_reading() {
        let mut harness = Harness::new();
        let (window, _) = harness.open();
        assert_eq!(harness.item(window), NavigationItem::Loading);

        let effects = harness.reopen_catalog();
        assert!(
            effects
                .iter()
                .any(|effect| matches!(effect, Effect::Service(ServiceCall::SettleLaunch(_))))
        );
        assert_eq!(harness.item(window), NavigationItem::Reading);

        harness.shell.reduce(ShellEvent::NavigationSelected {
            window,
            item: NavigationItem::Bookmarks,
        });
        assert_eq!(harness.item(window), NavigationItem::Bookmarks);

        let url = Url::parse("https://example.org/").expect("url");
        let effects = harness
            .shell
            .reduce(ShellEvent::UrlOpened(OpenRequest::url(url.clone())));

        assert_eq!(harness.item(window), NavigationItem::Reading);
        assert!(effects.contains(&Effect::Platform(PlatformRequest::LoadUrl {
            window,
            tab: harness.tab(window),
            url: url.clone(),
        })));
        assert_eq!(harness.shell.loaded_url(window), Some(url));
    }

    #[test]
    fn selecting_loading_is_rejected() {
        let mut harness = Harness::new();
        let (window, _) = harness.open();
        harness.reopen_catalog();

        let effects = harness.shell.reduce(ShellEvent::NavigationSelected {
            window,
            item: NavigationItem::Loading,
        });

        assert!(effects.is_empty());
        assert_eq!(harness.item(window), NavigationItem::Reading);
    }

    #[test]
    fn windows_opened_after_reopen_skip_loading() {
        let mut harness = Harness::new();
        harness.open();
        harness.reopen_catalog();

        let (late, _) = harness.open();

        assert_eq!(harness.item(late), NavigationItem::Reading);
    }

    #[test]
    fn racing_file_opens_with_no_window_each_get_a_window() {
        let mut harness = Harness::new();

        let first = harness.shell.reduce(ShellEvent::UrlOpened(file_request("a.zim")));
        let second = harness.shell.reduce(ShellEvent::UrlOpened(file_request("b.zim")));
        assert_eq!(count(&first, is_open_window), 1);
        assert_eq!(count(&second, is_open_window), 1);

        let (a, _) = harness.open();
        let (b, _) = harness.open();
        let released = harness.reopen_catalog();

        assert_eq!(resolved_windows(&released), vec![a, b]);
    }

    #[test]
    fn racing_file_opens_with_one_window_share_it() {
        let mut harness = Harness::new();
        let (only, _) = harness.open();
        harness.reopen_catalog();

        let first = harness.shell.reduce(ShellEvent::UrlOpened(file_request("a.zim")));
        let second = harness.shell.reduce(ShellEvent::UrlOpened(file_request("b.zim")));

        assert_eq!(resolved_windows(&first), vec![only]);
        assert_eq!(resolved_windows(&second), vec![only]);
        assert_eq!(count(&first, is_open_window) + count(&second, is_open_window), 0);
    }

    #[test]
    fn last_window_receives_open_when_current_is_unknown() {
        let mut harness = Harness::new();
        let (a, _) = harness.open();
        let (b, _) = harness.open();
        harness.close(b);
        harness.reopen_catalog();
        assert_eq!(harness.shell.context().tracker.current(), None);

        let effects = harness.shell.reduce(ShellEvent::UrlOpened(file_request("a.zim")));

        assert_eq!(resolved_windows(&effects), vec![a]);
    }

    #[test]
    fn resolution_for_closed_window_is_rerouted() {
        let mut harness = Harness::new();
        let (a, _) = harness.open();
        let (b, _) = harness.open();
        harness.shell.reduce(ShellEvent::WindowFocused(a));
        harness.close(b);

        let url = Url::parse("zim://0123456789abcdef/").expect("url");
        let effects = harness.shell.reduce(ShellEvent::ArchiveResolved {
            window: b,
            path: PathBuf::from("/library/a.zim"),
            url: Some(url.clone()),
            error: None,
        });

        assert!(effects.contains(&Effect::Platform(PlatformRequest::LoadUrl {
            window: a,
            tab: harness.tab(a),
            url,
        })));
    }

    #[test]
    fn failed_resolution_raises_alert() {
        let mut harness = Harness::new();
        let (a, _) = harness.open();

        let effects = harness.shell.reduce(ShellEvent::ArchiveResolved {
            window: a,
            path: PathBuf::from("/library/a.zim"),
            url: None,
            error: Some("boom".to_string()),
        });

        assert_eq!(
            effects,
            vec![alert(Some(a), "boom".to_string())]
        );
    }

    #[test]
    fn opens_during_shutdown_are_ignored() {
        let mut harness = Harness::new();
        harness.open();
        harness.shell.reduce(ShellEvent::TerminateRequested);

        let effects = harness.shell.reduce(ShellEvent::UrlOpened(file_request("a.zim")));

        assert!(effects.is_empty());
    }

    #[test]
    fn user_closing_last_window_exits() {
        let mut harness = Harness::new();
        let (a, _) = harness.open();

        let effects = harness.close(a);

        assert_eq!(count(&effects, is_exit), 1);
        assert!(harness.tabs().is_empty());
    }

    #[test]
    fn restored_windows_reclaim_their_tabs() {
        let mut harness = Harness::new();
        let url = Url::parse("zim://0123456789abcdef/A/Page").expect("url");
        let snapshot = SessionSnapshot {
            windows: vec![WindowSnapshot {
                tab: Some(TabId::new(7)),
                url: Some(url.clone()),
                item: NavigationItem::Bookmarks,
            }],
            tabs: vec![crate::tabs::TabRecord {
                id: TabId::new(7),
                url: Some(url.clone()),
                title: None,
            }],
        };

        let effects = harness.shell.start(Some(snapshot), Vec::new());
        assert_eq!(count(&effects, is_open_window), 1);

        let (window, effects) = harness.open();
        assert_eq!(harness.tab(window), TabId::new(7));
        assert!(effects.contains(&Effect::Platform(PlatformRequest::LoadUrl {
            window,
            tab: TabId::new(7),
            url,
        })));

        harness.reopen_catalog();
        assert_eq!(harness.item(window), NavigationItem::Bookmarks);
    }

    #[test]
    fn settings_change_saves_config_and_applies_backup() {
        let mut harness = Harness::new();
        harness.open();
        harness.finish_launch();

        let effects = harness.shell.reduce(ShellEvent::SettingsChanged(SettingsPatch {
            backup_documents: Some(true),
            ..SettingsPatch::default()
        }));

        assert!(harness.shell.config().backup_documents);
        assert!(matches!(
            effects.as_slice(),
            [
                Effect::Platform(PlatformRequest::SaveConfig(_)),
                Effect::Service(ServiceCall::ApplyBackupSetting(true)),
            ]
        ));

        let unchanged = harness.shell.reduce(ShellEvent::SettingsChanged(SettingsPatch {
            backup_documents: Some(true),
            ..SettingsPatch::default()
        }));
        assert!(unchanged.is_empty());
    }

    #[test]
    fn launch_file_open_waits_for_catalog_reopen() {
        let mut harness = Harness::new();
        harness
            .shell
            .start(None, vec![file_request("a.zim")]);

        let (window, opened) = harness.open();
        assert!(opened.contains(&Effect::Service(ServiceCall::ReopenCatalog)));
        assert!(resolved_windows(&opened).is_empty());

        let dropped = harness.shell.reduce(ShellEvent::UrlOpened(file_request("b.zim")));
        assert!(resolved_windows(&dropped).is_empty());

        let released = harness.reopen_catalog();
        assert_eq!(resolved_windows(&released), vec![window, window]);
        let settle = released
            .iter()
            .position(|effect| matches!(effect, Effect::Service(ServiceCall::SettleLaunch(_))))
            .expect("settle requested");
        assert!(settle > 0);

        let later = harness.shell.reduce(ShellEvent::UrlOpened(file_request("c.zim")));
        assert_eq!(resolved_windows(&later), vec![window]);
    }

    #[test]
    fn held_archives_are_dropped_when_quitting_before_reopen() {
        let mut harness = Harness::new();
        harness.shell.start(None, vec![file_request("a.zim")]);
        harness.open();
        harness.shell.reduce(ShellEvent::TerminateRequested);

        let effects = harness.reopen_catalog();

        assert!(resolved_windows(&effects).is_empty());
    }

    #[test]
    fn backup_toggle_during_launch_waits_for_settle() {
        let mut harness = Harness::new();
        harness.open();
        harness.reopen_catalog();

        let effects = harness.shell.reduce(ShellEvent::SettingsChanged(SettingsPatch {
            backup_documents: Some(true),
            ..SettingsPatch::default()
        }));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Platform(PlatformRequest::SaveConfig(_))]
        ));

        let settled = harness
            .shell
            .reduce(ShellEvent::LaunchSettled(LaunchReport::default()));
        assert_eq!(
            settled,
            vec![Effect::Service(ServiceCall::ApplyBackupSetting(true))]
        );

        let again = harness
            .shell
            .reduce(ShellEvent::LaunchSettled(LaunchReport::default()));
        assert!(again.is_empty());
    }

    #[test]
    fn library_refresh_is_not_doubled() {
        let mut harness = Harness::new();

        assert_eq!(
            harness.shell.reduce(ShellEvent::LibraryRefreshRequested).len(),
            1
        );
        assert!(
            harness
                .shell
                .reduce(ShellEvent::LibraryRefreshRequested)
                .is_empty()
        );

        harness.shell.reduce(ShellEvent::LibraryRefreshed {
            state: LibraryState::Complete,
            error: None,
        });
        assert_eq!(harness.shell.library_state(), LibraryState::Complete);
    }

    #[test]
    fn settle_failures_surface_as_one_alert() {
        let mut harness = Harness::new();
        let report = LaunchReport {
            steps: vec![
                StepOutcome {
                    step: LaunchStep::ScanDirectory,
                    error: Some("denied".to_string()),
                },
                StepOutcome {
                    step: LaunchStep::RefreshLibrary,
                    error: None,
                },
            ],
            migration: None,
        };

        let effects = harness.shell.reduce(ShellEvent::LaunchSettled(report));

        assert_eq!(harness.shell.phase(), LaunchPhase::Complete);
        assert_eq!(harness.shell.library_state(), LibraryState::Complete);
        assert_eq!(
            effects,
            vec![alert(
                None,
                "Startup incomplete. scan library directory: denied".to_string()
            )]
        );
    }
}
