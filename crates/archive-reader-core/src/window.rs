//! Tracking of the frontmost window and of how many windows are still open.
//!
//! The tracker never caches a window count: "is this the last window" is
//! answered from [`LiveWindows`] at call time, so a file-open that races a
//! window creation sees whichever state the platform has actually reached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Opaque handle for a top-level platform window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Live view of the windows the platform currently has open.
pub trait LiveWindows: Send + Sync {
    fn open_windows(&self) -> Vec<WindowId>;

    fn is_open(&self, window: WindowId) -> bool {
        self.open_windows().contains(&window)
    }
}

/// Open-window set maintained from platform open/close notifications.
#[derive(Debug, Default)]
pub struct WindowSet {
    open: Mutex<BTreeSet<WindowId>>,
}

impl WindowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the window was already present.
    pub fn insert(&self, window: WindowId) -> bool {
        self.lock().insert(window)
    }

    /// Returns `false` if the window was not present.
    pub fn remove(&self, window: WindowId) -> bool {
        self.lock().remove(&window)
    }

    pub fn open_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<WindowId>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LiveWindows for WindowSet {
    fn open_windows(&self) -> Vec<WindowId> {
        self.lock().iter().copied().collect()
    }

    fn is_open(&self, window: WindowId) -> bool {
        self.lock().contains(&window)
    }
}

pub struct WindowTracker {
    live: Arc<dyn LiveWindows>,
    current: Mutex<Option<WindowId>>,
}

impl WindowTracker {
    pub fn new(live: Arc<dyn LiveWindows>) -> Self {
        Self {
            live,
            current: Mutex::new(None),
        }
    }

    /// Records `window` as the active one. Windows the platform no longer
    /// reports as open are ignored.
    pub fn register_current(&self, window: WindowId) {
        if !self.live.is_open(window) {
            debug!(%window, "Ignoring registration of a window that is not open");
            return;
        }
        *self.lock_current() = Some(window);
    }

    /// The most recently registered window, re-validated against live state.
    pub fn current(&self) -> Option<WindowId> {
        let mut current = self.lock_current();
        match *current {
            Some(window) if self.live.is_open(window) => Some(window),
            Some(window) => {
                debug!(%window, "Current window has closed; clearing");
                *current = None;
                None
            }
            None => None,
        }
    }

    /// Drops `window` as the current window if it was.
    pub fn forget(&self, window: WindowId) {
        let mut current = self.lock_current();
        if *current == Some(window) {
            *current = None;
        }
    }

    pub fn is_last_window(&self) -> bool {
        self.live.open_windows().len() == 1
    }

    pub fn open_windows(&self) -> Vec<WindowId> {
        self.live.open_windows()
    }

    pub fn open_count(&self) -> usize {
        self.live.open_windows().len()
    }

    pub fn is_open(&self, window: WindowId) -> bool {
        self.live.is_open(window)
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<WindowId>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for WindowTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowTracker")
            .field("open", &self.live.open_windows())
            .field("current", &*self.lock_current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn tracker_with(windows: &[u64]) -> (Arc<WindowSet>, WindowTracker) {
        let set = Arc::new(WindowSet::new());
        for raw in windows {
            set.insert(WindowId::new(*raw));
        }
        let tracker = WindowTracker::new(set.clone());
        (set, tracker)
    }

    #[test]
    fn current_is_absent_before_first_registration() {
        let (_, tracker) = tracker_with(&[1]);
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn current_follows_most_recent_registration() {
        let (_, tracker) = tracker_with(&[1, 2, 3]);
        for raw in [2, 1, 3, 3, 2] {
            tracker.register_current(WindowId::new(raw));
            assert_eq!(tracker.current(), Some(WindowId::new(raw)));
        }
    }

    #[test]
    fn registering_a_closed_window_keeps_previous_current() {
        let (_, tracker) = tracker_with(&[1]);
        tracker.register_current(WindowId::new(1));
        tracker.register_current(WindowId::new(9));
        assert_eq!(tracker.current(), Some(WindowId::new(1)));
    }

    #[test]
    fn current_is_cleared_once_its_window_closes() {
        let (set, tracker) = tracker_with(&[1, 2]);
        tracker.register_current(WindowId::new(2));

        set.remove(WindowId::new(2));

        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn forget_only_clears_matching_window() {
        let (_, tracker) = tracker_with(&[1, 2]);
        tracker.register_current(WindowId::new(1));

        tracker.forget(WindowId::new(2));
        assert_eq!(tracker.current(), Some(WindowId::new(1)));

        tracker.forget(WindowId::new(1));
        assert_eq!(tracker.current(), None);
    }

    #[test]
    fn window_set_counts_open_windows() {
        let (set, _) = tracker_with(&[1, 2]);
        assert_eq!(set.open_count(), 2);

        assert!(!set.insert(WindowId::new(2)));
        assert!(set.remove(WindowId::new(1)));
        assert!(!set.remove(WindowId::new(1)));
        assert_eq!(set.open_count(), 1);
    }

    #[test]
    fn last_window_reads_live_state() {
        let (set, tracker) = tracker_with(&[]);
        assert!(!tracker.is_last_window());

        set.insert(WindowId::new(1));
        assert!(tracker.is_last_window());

        set.insert(WindowId::new(2));
        assert!(!tracker.is_last_window());

        set.remove(WindowId::new(1));
        assert!(tracker.is_last_window());
    }

    #[test]
    fn last_window_is_exact_after_open_close_race() {
        for _ in 0..200 {
            let (set, tracker) = tracker_with(&[1]);
            let opener = {
                let set = set.clone();
                thread::spawn(move || set.insert(WindowId::new(2)))
            };
            let closer = {
                let set = set.clone();
                thread::spawn(move || set.remove(WindowId::new(1)))
            };
            opener.join().expect("opener panicked");
            closer.join().expect("closer panicked");

            assert!(tracker.is_last_window());
            assert_eq!(tracker.open_windows(), vec![WindowId::new(2)]);
        }
    }

    #[test]
    fn last_window_matches_count_under_concurrent_churn() {
        let (set, tracker) = tracker_with(&[]);
        let tracker = Arc::new(tracker);
        let workers: Vec<_> = (0..4u64)
            .map(|worker| {
                let set = set.clone();
                let tracker = tracker.clone();
                thread::spawn(move || {
                    for step in 0..100u64 {
                        let window = WindowId::new(worker * 1_000 + step);
                        set.insert(window);
                        tracker.register_current(window);
                        let _ = tracker.is_last_window();
                        set.remove(window);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker panicked");
        }

        assert_eq!(tracker.open_count(), 0);
        assert!(!tracker.is_last_window());
        assert_eq!(tracker.current(), None);

        set.insert(WindowId::new(42));
        assert!(tracker.is_last_window());
    }
}
