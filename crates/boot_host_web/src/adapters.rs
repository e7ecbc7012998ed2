use std::rc::Rc;

use boot_contract::{
    MemoryStorage, StorageAdapter, StorageChangeListener, StorageError, TaskSpawner,
};
use futures::future::LocalBoxFuture;

use crate::WebLocalStorage;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected storage strategy.
pub enum HostStrategy {
    /// `window.localStorage`.
    Browser,
    /// Process-local memory, for hosts without persistent storage.
    Memory,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(all(target_arch = "wasm32", not(feature = "memory-storage")))]
    {
        HostStrategy::Browser
    }

    #[cfg(any(not(target_arch = "wasm32"), feature = "memory-storage"))]
    {
        HostStrategy::Memory
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Memory => "memory",
    }
}

/// Adapter enum that erases the concrete backend behind [`StorageAdapter`].
#[derive(Debug, Clone)]
pub enum StorageAdapterKind {
    /// Browser `localStorage`.
    Browser(WebLocalStorage),
    /// Process-local memory.
    Memory(MemoryStorage),
}

impl StorageAdapter for StorageAdapterKind {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Browser(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Browser(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            Self::Browser(store) => store.remove(key),
            Self::Memory(store) => store.remove(key),
        }
    }

    fn subscribe_changes(&self, listener: StorageChangeListener) -> bool {
        match self {
            Self::Browser(store) => store.subscribe_changes(listener),
            Self::Memory(store) => store.subscribe_changes(listener),
        }
    }
}

/// Builds the storage adapter for the selected host strategy.
pub fn storage_adapter() -> StorageAdapterKind {
    match selected_host_strategy() {
        HostStrategy::Browser => StorageAdapterKind::Browser(WebLocalStorage),
        HostStrategy::Memory => StorageAdapterKind::Memory(MemoryStorage::default()),
    }
}

/// Returns a spawner that detaches futures onto the host event loop.
///
/// Off-browser there is no event loop, so futures run to completion inline.
pub fn local_task_spawner() -> TaskSpawner {
    Rc::new(|task: LocalBoxFuture<'static, ()>| {
        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(task);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            futures::executor::block_on(task);
        }
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_builds_select_memory_storage() {
        assert_eq!(selected_host_strategy(), HostStrategy::Memory);
        assert_eq!(host_strategy_name(), "memory");

        let store = storage_adapter();
        assert!(matches!(store, StorageAdapterKind::Memory(_)));
        store.set("k", "v").expect("set");
        assert_eq!(store.get("k").expect("get"), Some("v".to_string()));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_spawner_runs_task_inline() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let spawn = local_task_spawner();
        spawn(Box::pin(async move { flag.set(true) }));
        assert!(ran.get());
    }
}
