// Ordered observer registry used by each polling channel

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Callbacks keyed by a monotonically increasing id, so iteration order is
/// registration order.
pub struct SubscriberRegistry<T> {
    inner: Mutex<RegistryState<T>>,
}

struct RegistryState<T> {
    next_id: u64,
    callbacks: BTreeMap<SubscriberId, Callback<T>>,
}

impl<T> SubscriberRegistry<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryState {
                next_id: 0,
                callbacks: BTreeMap::new(),
            }),
        }
    }

    pub fn insert(&self, callback: Callback<T>) -> SubscriberId {
        let mut state = self.inner.lock();
        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        state.callbacks.insert(id, callback);
        id
    }

    /// Remove a callback. Returns the number still registered, or `None`
    /// when the id was not present.
    pub fn remove(&self, id: SubscriberId) -> Option<usize> {
        let mut state = self.inner.lock();
        state.callbacks.remove(&id).map(|_| state.callbacks.len())
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.lock().callbacks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every callback with `value` in registration order.
    ///
    /// The lock is released before any callback runs. A callback removed by
    /// an earlier one in the same pass is skipped; one added during the pass
    /// first hears from the next call.
    pub fn notify(&self, value: &T) -> usize {
        let snapshot: Vec<(SubscriberId, Callback<T>)> = {
            let state = self.inner.lock();
            state
                .callbacks
                .iter()
                .map(|(id, callback)| (*id, Arc::clone(callback)))
                .collect()
        };

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.contains(id) {
                continue;
            }
            callback(value);
            delivered += 1;
        }
        delivered
    }
}

impl<T> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
