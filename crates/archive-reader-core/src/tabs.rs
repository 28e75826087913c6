use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use url::Url;

/// Logical browsing-session handle. One per live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(u64);

impl TabId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Default)]
struct TabTable {
    next_id: u64,
    tabs: BTreeMap<TabId, TabRecord>,
}

/// Browsing sessions shared by every window of the process.
#[derive(Debug, Default)]
pub struct TabStore {
    table: Mutex<TabTable>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, url: Option<Url>) -> TabId {
        let mut table = self.lock();
        table.next_id += 1;
        let id = TabId(table.next_id);
        table.tabs.insert(
            id,
            TabRecord {
                id,
                url,
                title: None,
            },
        );
        id
    }

    /// Returns `false` when the tab no longer exists.
    pub fn set_url(&self, id: TabId, url: Url) -> bool {
        match self.lock().tabs.get_mut(&id) {
            Some(record) => {
                record.url = Some(url);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: TabId) -> Option<TabRecord> {
        self.lock().tabs.get(&id).cloned()
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.lock().tabs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tabs.is_empty()
    }

    /// Removes the tab. Deleting an absent id is a no-op.
    pub fn delete(&self, id: TabId) -> bool {
        let removed = self.lock().tabs.remove(&id).is_some();
        if !removed {
            debug!(tab = %id, "Tab already absent; nothing to delete");
        }
        removed
    }

    /// First tab showing `url` that is not listed in `exclude`.
    pub fn tab_id_for(&self, url: &Url, exclude: &BTreeSet<TabId>) -> Option<TabId> {
        self.lock()
            .tabs
            .values()
            .find(|record| record.url.as_ref() == Some(url) && !exclude.contains(&record.id))
            .map(|record| record.id)
    }

    pub fn snapshot(&self) -> Vec<TabRecord> {
        self.lock().tabs.values().cloned().collect()
    }

    /// Loads previously saved records. Fresh ids continue past the highest
    /// restored one.
    pub fn restore(&self, records: Vec<TabRecord>) {
        let mut table = self.lock();
        for record in records {
            table.next_id = table.next_id.max(record.id.raw());
            table.tabs.insert(record.id, record);
        }
    }

    fn lock(&self) -> MutexGuard<'_, TabTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("test url")
    }

    #[test]
    fn created_ids_are_unique() {
        let store = TabStore::new();
        let a = store.create(None);
        let b = store.create(None);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn deleting_missing_tab_leaves_store_untouched() {
        let store = TabStore::new();
        let a = store.create(None);
        let b = store.create(None);

        assert!(!store.delete(TabId::new(99)));

        assert_eq!(store.ids(), vec![a, b]);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = TabStore::new();
        let a = store.create(None);

        assert!(store.delete(a));
        assert!(!store.delete(a));
        assert!(store.is_empty());
    }

    #[test]
    fn tab_lookup_skips_excluded_ids() {
        let store = TabStore::new();
        let page = url("zim://abc/");
        let first = store.create(Some(page.clone()));
        let second = store.create(Some(page.clone()));

        assert_eq!(store.tab_id_for(&page, &BTreeSet::new()), Some(first));
        assert_eq!(
            store.tab_id_for(&page, &BTreeSet::from([first])),
            Some(second)
        );
        assert_eq!(store.tab_id_for(&page, &BTreeSet::from([first, second])), None);
        assert_eq!(store.tab_id_for(&url("zim://other/"), &BTreeSet::new()), None);
    }

    #[test]
    fn restore_continues_id_sequence() {
        let store = TabStore::new();
        store.restore(vec![TabRecord {
            id: TabId::new(7),
            url: Some(url("zim://abc/")),
            title: None,
        }]);

        let fresh = store.create(None);

        assert_eq!(fresh, TabId::new(8));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn set_url_on_deleted_tab_reports_absence() {
        let store = TabStore::new();
        let id = store.create(None);
        store.delete(id);
        assert!(!store.set_url(id, url("zim://abc/")));
    }
}
