//! Tablet mode observers.
//!
//! Listeners are notified synchronously on the thread that triggered the
//! transition. The registry snapshots its members before each notification,
//! so a callback may register or unregister observers (itself included);
//! the change applies from the next notification.

use parking_lot::Mutex;
use std::sync::Arc;

/// Listener for tablet mode transitions. Every method defaults to a no-op.
pub trait TabletModeObserver: Send + Sync {
    /// About to enter tablet mode.
    fn on_tablet_mode_starting(&self) {}

    /// Tablet mode is now active.
    fn on_tablet_mode_started(&self) {}

    /// About to leave tablet mode.
    fn on_tablet_mode_ending(&self) {}

    /// Clamshell mode is now active.
    fn on_tablet_mode_ended(&self) {}

    /// Internal keyboard/touchpad blocking changed.
    fn on_tablet_mode_events_blocking_changed(&self) {}
}

/// Shared, duplicate-free set of observers.
///
/// Identity is pointer identity of the `Arc`.
#[derive(Clone, Default)]
pub struct ObserverList {
    observers: Arc<Mutex<Vec<Arc<dyn TabletModeObserver>>>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`. Returns false if it was already registered.
    pub fn add(&self, observer: Arc<dyn TabletModeObserver>) -> bool {
        let mut observers = self.observers.lock();
        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Unregister `observer`. Returns false if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn TabletModeObserver>) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|o| !Arc::ptr_eq(o, observer));
        observers.len() != before
    }

    pub fn contains(&self, observer: &Arc<dyn TabletModeObserver>) -> bool {
        self.observers.lock().iter().any(|o| Arc::ptr_eq(o, observer))
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    /// Call `f` on every observer registered at the time of the call.
    pub fn notify<F>(&self, f: F)
    where
        F: Fn(&dyn TabletModeObserver),
    {
        // Lock released before any callback runs
        let snapshot: Vec<Arc<dyn TabletModeObserver>> = self.observers.lock().clone();
        for observer in &snapshot {
            f(observer.as_ref());
        }
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        started: AtomicUsize,
        ended: AtomicUsize,
    }

    impl TabletModeObserver for Counter {
        fn on_tablet_mode_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_tablet_mode_ended(&self) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Unregisters itself on the first notification.
    struct OneShot {
        list: ObserverList,
        me: Mutex<Option<Arc<dyn TabletModeObserver>>>,
        calls: AtomicUsize,
    }

    impl TabletModeObserver for OneShot {
        fn on_tablet_mode_started(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = self.me.lock().take() {
                self.list.remove(&me);
            }
        }
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let list = ObserverList::new();
        let counter: Arc<dyn TabletModeObserver> = Arc::new(Counter::default());

        assert!(list.add(counter.clone()));
        assert!(!list.add(counter.clone()));
        assert_eq!(list.len(), 1);
        assert!(list.contains(&counter));
    }

    #[test]
    fn test_notify_reaches_each_observer_once() {
        let list = ObserverList::new();
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        list.add(a.clone());
        list.add(b.clone());
        list.add(a.clone());

        list.notify(|o| o.on_tablet_mode_started());

        assert_eq!(a.started.load(Ordering::SeqCst), 1);
        assert_eq!(b.started.load(Ordering::SeqCst), 1);
        assert_eq!(a.ended.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove() {
        let list = ObserverList::new();
        let counter: Arc<dyn TabletModeObserver> = Arc::new(Counter::default());
        list.add(counter.clone());

        assert!(list.remove(&counter));
        assert!(!list.remove(&counter));
        assert!(list.is_empty());
    }

    #[test]
    fn test_observer_removes_itself_during_notify() {
        let list = ObserverList::new();
        let one_shot = Arc::new(OneShot {
            list: list.clone(),
            me: Mutex::new(None),
            calls: AtomicUsize::new(0),
        });
        let as_dyn: Arc<dyn TabletModeObserver> = one_shot.clone();
        *one_shot.me.lock() = Some(as_dyn.clone());
        let counter = Arc::new(Counter::default());

        list.add(as_dyn);
        list.add(counter.clone());

        list.notify(|o| o.on_tablet_mode_started());
        list.notify(|o| o.on_tablet_mode_started());

        assert_eq!(one_shot.calls.load(Ordering::SeqCst), 1);
        assert_eq!(counter.started.load(Ordering::SeqCst), 2);
        assert_eq!(list.len(), 1);
    }
}
