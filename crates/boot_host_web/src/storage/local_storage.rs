//! `localStorage`-backed [`StorageAdapter`] implementation.

use boot_contract::{StorageAdapter, StorageChangeListener, StorageError};
#[cfg(target_arch = "wasm32")]
use boot_contract::StorageChange;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[derive(Debug, Clone, Copy, Default)]
/// Browser store backed by `window.localStorage`.
pub struct WebLocalStorage;

/// Maps a failed `localStorage` call to a [`StorageError`] by its `DOMException` name.
pub fn classify_storage_failure(exception_name: &str, message: &str, key: &str) -> StorageError {
    match exception_name {
        // Firefox reports quota exhaustion under its own name.
        "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => StorageError::QuotaExceeded {
            key: key.to_string(),
        },
        "SecurityError" => StorageError::AccessDenied(message.to_string()),
        _ if message.is_empty() => StorageError::Backend(exception_name.to_string()),
        _ => StorageError::Backend(format!("{exception_name}: {message}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn js_failure(err: JsValue, key: &str) -> StorageError {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(exception) => classify_storage_failure(&exception.name(), &exception.message(), key),
        None => StorageError::Backend(format!("{err:?}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window().ok_or(StorageError::Unavailable)?;
    match window.local_storage() {
        Ok(Some(storage)) => Ok(storage),
        Ok(None) => Err(StorageError::Unavailable),
        // Accessing the property throws when storage is disabled for the origin.
        Err(err) => Err(js_failure(err, "")),
    }
}

impl StorageAdapter for WebLocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|err| js_failure(err, key))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .set_item(key, value)
                .map_err(|err| js_failure(err, key))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(target_arch = "wasm32")]
        {
            local_storage()?
                .remove_item(key)
                .map_err(|err| js_failure(err, key))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    /// Listens for the window `storage` event, which only fires for writes made by other
    /// documents sharing the origin.
    fn subscribe_changes(&self, listener: StorageChangeListener) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(window) = web_sys::window() else {
                return false;
            };
            let Ok(area) = local_storage() else {
                return false;
            };
            let mut listener = listener;
            let callback = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
                move |event: web_sys::StorageEvent| {
                    let same_area = event
                        .storage_area()
                        .is_some_and(|changed| js_sys::Object::is(&changed, &area));
                    if !same_area {
                        return;
                    }
                    // A `null` key means `clear()`; there is no single key to report.
                    let Some(key) = event.key() else {
                        return;
                    };
                    listener(StorageChange {
                        key,
                        value: event.new_value(),
                    });
                },
            );
            let installed = window
                .add_event_listener_with_callback("storage", callback.as_ref().unchecked_ref())
                .is_ok();
            // The listener lives for the rest of the process.
            callback.forget();
            installed
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = listener;
            false
        }
    }
}
