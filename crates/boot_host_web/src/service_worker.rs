//! Service worker registration, launched once after the application starts.

use boot_contract::{StartupTask, StartupTaskFuture};

/// Script registered when no other URL is configured.
pub const DEFAULT_SERVICE_WORKER_URL: &str = "/service-worker.js";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Startup task that registers a service worker script.
pub struct ServiceWorkerRegistration {
    script_url: String,
}

impl ServiceWorkerRegistration {
    /// Creates a registration task for `script_url`.
    pub fn new(script_url: impl Into<String>) -> Self {
        Self {
            script_url: script_url.into(),
        }
    }

    /// Script the task registers.
    pub fn script_url(&self) -> &str {
        &self.script_url
    }
}

impl Default for ServiceWorkerRegistration {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_WORKER_URL)
    }
}

impl StartupTask for ServiceWorkerRegistration {
    fn name(&self) -> &'static str {
        "service-worker-registration"
    }

    fn start(&self) -> StartupTaskFuture {
        let script_url = self.script_url.clone();
        Box::pin(async move { register_service_worker(&script_url).await })
    }
}

/// Registers `script_url` with `navigator.serviceWorker`.
///
/// # Errors
///
/// Returns an error when service workers are unsupported or the registration promise rejects.
pub async fn register_service_worker(script_url: &str) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsValue;

        let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
        let navigator = window.navigator();
        let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker"))
            .unwrap_or(false);
        if !supported {
            return Err("service workers are not supported by this browser".to_string());
        }
        let promise = navigator.service_worker().register(script_url);
        wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| format!("service worker registration failed for `{script_url}`: {e:?}"))?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = script_url;
        Err("Service workers are only available when compiled for wasm32".to_string())
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn default_registration_targets_root_script() {
        let task = ServiceWorkerRegistration::default();
        assert_eq!(task.script_url(), "/service-worker.js");
        assert_eq!(task.name(), "service-worker-registration");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_registration_reports_unsupported() {
        let task = ServiceWorkerRegistration::new("/sw.js");
        let err = block_on(task.start()).expect_err("registration should fail");
        assert_eq!(
            err,
            "Service workers are only available when compiled for wasm32"
        );
    }
}
