use crate::errors::ErrorKind;
use crate::snapshot::{Reason, Snapshot};
use log::error;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked with the reason and the new [`Snapshot`] after every rebuild.
///
/// Listeners are identified by their [`Arc`]: subscribing the same `Arc` twice
/// registers it once.
pub type Listener = Arc<dyn Fn(&Reason, &Snapshot) + Send + Sync>;

type ListenerMap = HashMap<usize, Listener>;

/// Set of [`Listener`]s notified on every snapshot rebuild.
pub(crate) struct SubscriptionRegistry {
    listeners: Arc<Mutex<ListenerMap>>,
}

impl SubscriptionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = listener_id(&listener);
        let handle = Subscription {
            id,
            listener: Arc::downgrade(&listener),
            listeners: Arc::downgrade(&self.listeners),
        };
        lock(&self.listeners).insert(id, listener);
        handle
    }

    /// Invokes every listener once. A panicking listener is logged and skipped;
    /// nothing escapes this call.
    pub(crate) fn notify(&self, reason: &Reason, snapshot: &Snapshot) {
        let listeners = lock(&self.listeners)
            .values()
            .cloned()
            .collect::<Vec<Listener>>();

        for listener in listeners {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener(reason, snapshot))) {
                error!(event_id = ErrorKind::ListenerFailure.as_u16(); "Listener failed while handling '{reason}' snapshot: {}", panic_message(payload.as_ref()));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub(crate) fn clear(&self) {
        lock(&self.listeners).clear();
    }
}

/// Handle returned by `subscribe`; removes its listener when [`Subscription::unsubscribe`] is called.
///
/// Dropping the handle keeps the listener registered.
#[derive(Debug)]
pub struct Subscription {
    id: usize,
    // Pins the listener's allocation so `id` can't be reused by another listener.
    listener: Weak<dyn Fn(&Reason, &Snapshot) + Send + Sync>,
    listeners: Weak<Mutex<ListenerMap>>,
}

impl Subscription {
    /// Removes the listener; it won't be invoked by later notifications.
    ///
    /// Does nothing when the listener was already removed through another handle.
    pub fn unsubscribe(self) {
        let (Some(listeners), Some(listener)) = (self.listeners.upgrade(), self.listener.upgrade())
        else {
            return;
        };
        let mut listeners = lock(&listeners);
        if listeners
            .get(&self.id)
            .is_some_and(|registered| Arc::ptr_eq(registered, &listener))
        {
            listeners.remove(&self.id);
        }
    }
}

fn listener_id(listener: &Listener) -> usize {
    Arc::as_ptr(listener) as *const () as usize
}

fn lock(listeners: &Mutex<ListenerMap>) -> MutexGuard<'_, ListenerMap> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_owned()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod subscription_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Listener {
        let c = Arc::clone(counter);
        Arc::new(move |_: &Reason, _: &Snapshot| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let registry = SubscriptionRegistry::new();
        let counters = (0..5)
            .map(|_| Arc::new(AtomicUsize::new(0)))
            .collect::<Vec<Arc<AtomicUsize>>>();

        for (i, counter) in counters.iter().enumerate() {
            let c = Arc::clone(counter);
            registry.subscribe(Arc::new(move |_: &Reason, _: &Snapshot| {
                c.fetch_add(1, Ordering::SeqCst);
                if i == 2 {
                    panic!("listener {i} failed");
                }
            }));
        }

        registry.notify(&Reason::Initialized, &Snapshot::default());
        registry.notify(&Reason::Fetched, &Snapshot::default());

        for counter in counters.iter() {
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
    }

    #[test]
    fn unsubscribed_listener_not_invoked() {
        let registry = SubscriptionRegistry::new();
        let kept = Arc::new(AtomicUsize::new(0));
        let removed = Arc::new(AtomicUsize::new(0));

        let _kept_sub = registry.subscribe(counting(&kept));
        let removed_sub = registry.subscribe(counting(&removed));

        registry.notify(&Reason::Initialized, &Snapshot::default());
        removed_sub.unsubscribe();
        registry.notify(&Reason::Fetched, &Snapshot::default());

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_listener_collapses() {
        let registry = SubscriptionRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = counting(&counter);

        let first = registry.subscribe(Arc::clone(&listener));
        let _second = registry.subscribe(listener);
        assert_eq!(registry.len(), 1);

        registry.notify(&Reason::Initialized, &Snapshot::default());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        first.unsubscribe();
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn stale_handle_leaves_new_listener() {
        let registry = SubscriptionRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let listener = counting(&first);

        let h1 = registry.subscribe(Arc::clone(&listener));
        let h2 = registry.subscribe(Arc::clone(&listener));
        h1.unsubscribe();
        drop(listener);

        let second = Arc::new(AtomicUsize::new(0));
        let _h3 = registry.subscribe(counting(&second));
        h2.unsubscribe();
        registry.notify(&Reason::Initialized, &Snapshot::default());

        assert_eq!(registry.len(), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(first.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_handle_keeps_listener() {
        let registry = SubscriptionRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        drop(registry.subscribe(counting(&counter)));

        registry.notify(&Reason::Initialized, &Snapshot::default());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_unsubscribe_during_notify() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let handle = Arc::new(Mutex::new(None::<Subscription>));

        let h = Arc::clone(&handle);
        let sub = registry.subscribe(Arc::new(move |_: &Reason, _: &Snapshot| {
            if let Some(sub) = h.lock().unwrap().take() {
                sub.unsubscribe();
            }
        }));
        *handle.lock().unwrap() = Some(sub);

        registry.notify(&Reason::Initialized, &Snapshot::default());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn unsubscribe_after_registry_dropped() {
        let registry = SubscriptionRegistry::new();
        let sub = registry.subscribe(counting(&Arc::new(AtomicUsize::new(0))));
        drop(registry);
        sub.unsubscribe();
    }
}
