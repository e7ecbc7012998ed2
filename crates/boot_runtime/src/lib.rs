//! Application boot sequence and storage bridge.
//!
//! [`start_app`] mirrors the page entry script: capture [`boot_contract::BootFlags`], start the
//! application runtime with them, launch the service worker registration without waiting for
//! it, and bind a [`StorageBridge`] so the application can read and write persistent storage
//! through its ports.

pub mod bootstrapper;
pub mod bridge;
pub mod config;
pub mod start;

pub use bootstrapper::{capture_boot_flags, AppBootstrapper, BootedApp};
pub use bridge::{relay_storage_request, BridgeState, StorageBridge};
pub use config::{BootConfig, DEFAULT_MOUNT_ELEMENT_ID};
pub use start::{start_app, start_browser_app, StartedApp};
