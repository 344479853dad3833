// ── Listener registry ──
//
// Ordered set of synchronous callbacks with handle-based unsubscription.
// Used for the client's connectivity notifications and the store's state
// snapshots.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Entry<T> {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Callback<T>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

/// Callbacks notified in subscription order.
///
/// `notify` runs against a snapshot taken with the lock released, so a
/// callback may subscribe or unsubscribe (itself or others) re-entrantly.
/// A callback removed mid-round is skipped if it has not run yet; one
/// added mid-round first runs on the next round.
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let active = Arc::new(AtomicBool::new(true));
        let id = {
            let mut reg = lock(&self.registry);
            let id = reg.next_id;
            reg.next_id += 1;
            reg.entries.push(Entry {
                id,
                active: Arc::clone(&active),
                callback: Arc::new(callback),
            });
            id
        };

        let registry: Arc<dyn Detach> = self.registry.clone();
        Subscription {
            registry: Arc::downgrade(&registry),
            id,
            active,
        }
    }

    pub fn notify(&self, value: &T) {
        let snapshot = lock(&self.registry).entries.clone();
        for entry in snapshot {
            if entry.active.load(Ordering::Acquire) {
                (entry.callback)(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking listener must not wedge every later notification.
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

impl<T> Detach for Mutex<Registry<T>> {
    fn detach(&self, id: u64) {
        // The removed callback is dropped after the lock is released: it may
        // own a `Subscription` into this same registry.
        let removed = {
            let mut reg = lock(self);
            let pos = reg.entries.iter().position(|e| e.id == id);
            pos.map(|i| reg.entries.remove(i))
        };
        drop(removed);
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Handle returned by `subscribe`. The callback stays registered until
/// the handle is dropped or [`unsubscribe`](Self::unsubscribe) is called.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    registry: Weak<dyn Detach>,
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Remove the callback. Safe to call repeatedly, from inside a
    /// callback, or after the registry itself has been dropped.
    pub fn unsubscribe(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            if let Some(registry) = self.registry.upgrade() {
                registry.detach(self.id);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        let make = move |tag: &str| -> Box<dyn Fn(&u32) + Send + Sync> {
            let l = Arc::clone(&l);
            let tag = tag.to_owned();
            Box::new(move |v: &u32| l.lock().unwrap().push(format!("{tag}{v}")))
        };
        (log, make)
    }

    #[test]
    fn notifies_in_subscription_order() {
        let listeners = Listeners::<u32>::new();
        let (log, make) = recorder();
        let _a = listeners.subscribe(make("a"));
        let _b = listeners.subscribe(make("b"));

        listeners.notify(&1);
        assert_eq!(*log.lock().unwrap(), vec!["a1", "b1"]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let listeners = Listeners::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = listeners.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        sub.unsubscribe();
        sub.unsubscribe();
        listeners.notify(&1);

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(listeners.is_empty());
        assert!(!sub.is_active());
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let listeners = Listeners::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let h = Arc::clone(&hits);
        let s = Arc::clone(&slot);
        let sub = listeners.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = s.lock().unwrap().as_ref() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        listeners.notify(&1);
        listeners.notify(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn removal_mid_round_skips_pending_callback() {
        let listeners = Listeners::<u32>::new();
        let (log, make) = recorder();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let s = Arc::clone(&slot);
        let _first = listeners.subscribe(move |_| {
            if let Some(sub) = s.lock().unwrap().as_ref() {
                sub.unsubscribe();
            }
        });
        let second = listeners.subscribe(make("b"));
        *slot.lock().unwrap() = Some(second);

        listeners.notify(&1);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn addition_mid_round_waits_for_next_round() {
        let listeners = Arc::new(Listeners::<u32>::new());
        let (log, make) = recorder();
        let make = Arc::new(make);
        let added = Arc::new(AtomicBool::new(false));

        let late: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let weak = Arc::downgrade(&listeners);
        let m = Arc::clone(&make);
        let a = Arc::clone(&added);
        let slot = Arc::clone(&late);
        let _adder = listeners.subscribe(move |_| {
            if !a.swap(true, Ordering::SeqCst) {
                if let Some(l) = weak.upgrade() {
                    *slot.lock().unwrap() = Some(l.subscribe(m("late")));
                }
            }
        });

        listeners.notify(&1);
        assert!(log.lock().unwrap().is_empty());
        listeners.notify(&2);
        assert_eq!(*log.lock().unwrap(), vec!["late2"]);
    }

    #[test]
    fn dropping_the_handle_unsubscribes() {
        let listeners = Listeners::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = listeners.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        listeners.notify(&1);

        drop(sub);
        listeners.notify(&2);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn callback_owning_another_handle_is_released_cleanly() {
        let listeners = Listeners::<u32>::new();
        let inner = listeners.subscribe(|_| {});
        let outer = listeners.subscribe(move |_| {
            let _owned = &inner;
        });
        assert_eq!(listeners.len(), 2);

        drop(outer);
        assert!(listeners.is_empty());
    }

    #[test]
    fn unsubscribe_after_registry_dropped() {
        let listeners = Listeners::<u32>::new();
        let sub = listeners.subscribe(|_| {});
        drop(listeners);
        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
