//! Per-window navigation destination and the tab bound to that window.

use crate::tabs::{TabId, TabStore};
use crate::termination::TerminationFlag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Sidebar destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationItem {
    #[default]
    Loading,
    Reading,
    Bookmarks,
    Opened,
    Categories,
    Downloads,
    New,
    Settings,
}

pub const SELECTABLE_ITEMS: [NavigationItem; 7] = [
    NavigationItem::Reading,
    NavigationItem::Bookmarks,
    NavigationItem::Opened,
    NavigationItem::Categories,
    NavigationItem::Downloads,
    NavigationItem::New,
    NavigationItem::Settings,
];

impl NavigationItem {
    pub fn selectable() -> &'static [NavigationItem] {
        &SELECTABLE_ITEMS
    }

    /// `Loading` is entered once, at window creation, and never again.
    pub fn can_transition_to(self, next: NavigationItem) -> bool {
        next != NavigationItem::Loading
    }

    pub fn label(self) -> &'static str {
        match self {
            NavigationItem::Loading => "Loading",
            NavigationItem::Reading => "Reading",
            NavigationItem::Bookmarks => "Bookmarks",
            NavigationItem::Opened => "Opened",
            NavigationItem::Categories => "Categories",
            NavigationItem::Downloads => "Downloads",
            NavigationItem::New => "New",
            NavigationItem::Settings => "Settings",
        }
    }
}

impl std::fmt::Display for NavigationItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug)]
pub struct NavigationState {
    current_item: NavigationItem,
    tab: Option<TabId>,
    tabs: Arc<TabStore>,
    termination: TerminationFlag,
}

impl NavigationState {
    pub fn new(tabs: Arc<TabStore>, termination: TerminationFlag) -> Self {
        Self {
            current_item: NavigationItem::Loading,
            tab: None,
            tabs,
            termination,
        }
    }

    pub fn current_item(&self) -> NavigationItem {
        self.current_item
    }

    /// User selection. Returns whether the destination changed.
    pub fn select(&mut self, item: NavigationItem) -> bool {
        if !self.current_item.can_transition_to(item) {
            warn!(from = %self.current_item, to = %item, "Rejected navigation transition");
            return false;
        }
        let changed = self.current_item != item;
        self.current_item = item;
        changed
    }

    /// Startup sequencing finished: `Loading` becomes `Reading`. Any other
    /// destination is left alone.
    pub fn finish_loading(&mut self) -> bool {
        if self.current_item != NavigationItem::Loading {
            return false;
        }
        self.current_item = NavigationItem::Reading;
        true
    }

    /// An external open-URL landed in this window.
    pub fn show_reading(&mut self) {
        self.current_item = NavigationItem::Reading;
    }

    pub fn tab(&self) -> Option<TabId> {
        self.tab
    }

    pub fn bind_tab(&mut self, tab: TabId) {
        self.tab = Some(tab);
    }

    /// Removes the browsing session behind `tab`. Idempotent.
    pub fn delete_tab(&mut self, tab: TabId) -> bool {
        if self.tab == Some(tab) {
            self.tab = None;
        }
        let removed = self.tabs.delete(tab);
        if removed {
            info!(%tab, "Deleted tab");
        }
        removed
    }

    pub fn is_terminating(&self) -> bool {
        self.termination.is_terminating()
    }

    /// Best-effort lookup used when restoring a window.
    pub fn tab_id_for(&self, url: &Url, claimed: &BTreeSet<TabId>) -> Option<TabId> {
        self.tabs.tab_id_for(url, claimed)
    }

    /// The window owning this state has closed. During termination the tab
    /// is kept so it can be restored on the next launch.
    pub fn handle_window_closed(&mut self) -> Option<TabId> {
        if self.is_terminating() {
            debug!(tab = ?self.tab, "Window closed by quit; keeping tab");
            return None;
        }
        let tab = self.tab?;
        self.delete_tab(tab).then_some(tab)
    }
}
