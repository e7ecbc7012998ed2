mod app;
mod ports;

pub use app::{session_label, SiteApp, SiteRuntime, LAST_VISIT_KEY};
pub use ports::SitePorts;

/// Boots the application into the page and binds persistent storage to it.
///
/// A missing mount target leaves the page without an application; the error is logged and
/// startup stops.
#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();

    // Relay listeners hold their own references, so the started app can be dropped here.
    match boot_runtime::start_browser_app(&SiteRuntime) {
        Ok(started) => leptos::logging::log!("storage bridge state: {:?}", started.bridge.state()),
        Err(err) => leptos::logging::error!("startup halted: {err}"),
    }
}
