//! Boot-time environment snapshot handed to the application runtime.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Viewport pixel dimensions read at boot.
pub struct WindowSize {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
}

impl WindowSize {
    /// Creates a window size from raw dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable snapshot of environment facts captured once at startup.
///
/// The snapshot is never refreshed: a viewport resize after boot leaves `window_size` stale.
pub struct BootFlags {
    current_time_unix_ms: u64,
    window_size: WindowSize,
    auth_token: Option<String>,
}

impl BootFlags {
    /// Assembles flags from already-captured environment facts.
    pub fn new(
        current_time_unix_ms: u64,
        window_size: WindowSize,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            current_time_unix_ms,
            window_size,
            auth_token,
        }
    }

    /// Unix milliseconds captured at boot.
    pub fn current_time_unix_ms(&self) -> u64 {
        self.current_time_unix_ms
    }

    /// Viewport dimensions captured at boot.
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Stored auth token, `None` when no token was present.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Converts the snapshot into the runtime's wire shape.
    ///
    /// This is the only place where an absent token becomes `null`.
    pub fn to_wire(&self) -> WireFlags {
        WireFlags {
            current_time: self.current_time_unix_ms,
            window_size: self.window_size,
            jwt_token: self.auth_token.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flags object passed across the runtime init boundary.
pub struct WireFlags {
    /// Unix milliseconds captured at boot.
    pub current_time: u64,
    /// Viewport dimensions captured at boot.
    pub window_size: WindowSize,
    /// Stored auth token; serialized as `null` when absent.
    pub jwt_token: Option<String>,
}
