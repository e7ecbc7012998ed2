//! Synchronous key/value storage contract and the in-memory store used off-browser.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use crate::error::StorageError;

/// Well-known key holding the persisted authentication token.
pub const AUTH_TOKEN_KEY: &str = "jhi-authenticationToken";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A change made to the shared store by another instance.
pub struct StorageChange {
    /// Changed key.
    pub key: String,
    /// New value, `None` when the key was removed.
    pub value: Option<String>,
}

/// Listener invoked for every external [`StorageChange`].
pub type StorageChangeListener = Box<dyn FnMut(StorageChange)>;

/// Host service for persistent string key/value storage.
///
/// Every call blocks for the duration of the underlying store access and is never retried.
pub trait StorageAdapter {
    /// Reads a value. A missing key is `Ok(None)`, never an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Persists a value under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Registers a listener for changes made by other instances sharing the store.
    ///
    /// Returns `false` when the backend cannot observe external changes.
    fn subscribe_changes(&self, listener: StorageChangeListener) -> bool {
        let _ = listener;
        false
    }
}

#[derive(Default)]
struct MemoryStorageInner {
    entries: HashMap<String, String>,
    capacity_bytes: Option<usize>,
    listeners: Vec<StorageChangeListener>,
    pending: VecDeque<StorageChange>,
    notifying: bool,
}

impl MemoryStorageInner {
    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        self.entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

#[derive(Clone, Default)]
/// In-memory store keyed by string, shared between clones.
pub struct MemoryStorage {
    inner: Rc<RefCell<MemoryStorageInner>>,
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MemoryStorage")
            .field("entries", &inner.entries)
            .field("capacity_bytes", &inner.capacity_bytes)
            .finish_non_exhaustive()
    }
}

impl MemoryStorage {
    /// Creates a store that rejects writes once keys plus values exceed `capacity_bytes`.
    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        let storage = Self::default();
        storage.inner.borrow_mut().capacity_bytes = Some(capacity_bytes);
        storage
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let storage = Self::default();
        storage.inner.borrow_mut().entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        storage
    }

    /// Applies a change as if another instance had written it, notifying subscribers.
    ///
    /// Changes applied from inside a listener are delivered after the current one, in order.
    pub fn apply_external_change(&self, key: &str, value: Option<&str>) {
        {
            let mut inner = self.inner.borrow_mut();
            match value {
                Some(value) => {
                    inner.entries.insert(key.to_string(), value.to_string());
                }
                None => {
                    inner.entries.remove(key);
                }
            }
            inner.pending.push_back(StorageChange {
                key: key.to_string(),
                value: value.map(str::to_string),
            });
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }

        loop {
            // Listeners are taken out while running so they may call back into the store.
            let (change, mut listeners) = {
                let mut inner = self.inner.borrow_mut();
                let Some(change) = inner.pending.pop_front() else {
                    inner.notifying = false;
                    return;
                };
                (change, std::mem::take(&mut inner.listeners))
            };
            for listener in &mut listeners {
                listener(change.clone());
            }
            let mut inner = self.inner.borrow_mut();
            listeners.append(&mut inner.listeners);
            inner.listeners = listeners;
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Returns `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }
}

impl StorageAdapter for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.borrow().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.borrow_mut();
        if let Some(capacity) = inner.capacity_bytes {
            if inner.used_bytes_with(key, value) > capacity {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.borrow_mut().entries.remove(key);
        Ok(())
    }

    fn subscribe_changes(&self, listener: StorageChangeListener) -> bool {
        self.inner.borrow_mut().listeners.push(listener);
        true
    }
}
