//! Browser [`HostEnvironment`]: clock, viewport, and mount-target lookups.

use boot_contract::{unix_time_ms_now, HostEnvironment, WindowSize};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

/// Viewport reported when the browser window cannot be queried.
pub const FALLBACK_VIEWPORT: WindowSize = WindowSize::new(1024, 768);

/// Element type browser applications mount into.
pub type MountNode = web_sys::HtmlElement;

#[derive(Debug, Clone, Copy, Default)]
/// Host environment backed by the global `window`.
pub struct WebHostEnvironment;

impl HostEnvironment for WebHostEnvironment {
    type Node = MountNode;

    fn now_unix_ms(&self) -> u64 {
        unix_time_ms_now()
    }

    fn viewport_size(&self) -> WindowSize {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(viewport_px)
                    .unwrap_or(FALLBACK_VIEWPORT.width);
                let height = window
                    .inner_height()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(viewport_px)
                    .unwrap_or(FALLBACK_VIEWPORT.height);
                return WindowSize::new(width, height);
            }
        }

        FALLBACK_VIEWPORT
    }

    fn mount_target(&self, element_id: &str) -> Option<Self::Node> {
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::window()?
                .document()?
                .get_element_by_id(element_id)?
                .dyn_into::<web_sys::HtmlElement>()
                .ok()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = element_id;
            None
        }
    }
}

/// Clamps a fractional CSS pixel reading into a whole pixel count.
pub fn viewport_px(raw: f64) -> u32 {
    if raw.is_finite() {
        raw.max(0.0).min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Returns the current page query string (`?a=b`), or an empty string off-browser.
pub fn current_query_string() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        String::new()
    }
}
