//! Boot configuration and its page query-string overrides.

use boot_contract::AUTH_TOKEN_KEY;
use boot_host_web::{current_query_string, DEFAULT_SERVICE_WORKER_URL};

/// DOM id the application mounts into unless overridden.
pub const DEFAULT_MOUNT_ELEMENT_ID: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Settings for one boot of the application.
pub struct BootConfig {
    /// DOM id of the mount target.
    pub mount_element_id: String,
    /// Storage key holding the persisted auth token.
    pub auth_token_key: String,
    /// Service worker script to register after start, `None` to skip registration.
    pub service_worker_url: Option<String>,
    /// Push changes made by other instances into the application.
    pub forward_external_changes: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mount_element_id: DEFAULT_MOUNT_ELEMENT_ID.to_string(),
            auth_token_key: AUTH_TOKEN_KEY.to_string(),
            service_worker_url: Some(DEFAULT_SERVICE_WORKER_URL.to_string()),
            forward_external_changes: true,
        }
    }
}

impl BootConfig {
    /// Returns the default config with overrides from the current page URL applied.
    pub fn from_current_location() -> Self {
        Self::default().with_query_overrides(&current_query_string())
    }

    /// Applies `boot-*` overrides from a query string. Unknown keys and invalid values are
    /// ignored.
    pub fn with_query_overrides(mut self, query: &str) -> Self {
        for pair in query
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
        {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "boot-mount" if !value.trim().is_empty() => {
                    self.mount_element_id = value.trim().to_string();
                }
                "boot-sw" => match parse_bool(value) {
                    Some(false) => self.service_worker_url = None,
                    Some(true) if self.service_worker_url.is_none() => {
                        self.service_worker_url = Some(DEFAULT_SERVICE_WORKER_URL.to_string());
                    }
                    _ => {}
                },
                "boot-storage-events" => {
                    if let Some(enabled) = parse_bool(value) {
                        self.forward_external_changes = enabled;
                    }
                }
                _ => {}
            }
        }
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_the_hosted_page() {
        let config = BootConfig::default();
        assert_eq!(config.mount_element_id, "root");
        assert_eq!(config.auth_token_key, "jhi-authenticationToken");
        assert_eq!(
            config.service_worker_url.as_deref(),
            Some("/service-worker.js")
        );
        assert!(config.forward_external_changes);
    }

    #[test]
    fn parses_boot_overrides() {
        let config = BootConfig::default()
            .with_query_overrides("?boot-mount=app&boot-sw=false&boot-storage-events=false&x=1");
        assert_eq!(
            config,
            BootConfig {
                mount_element_id: "app".to_string(),
                auth_token_key: AUTH_TOKEN_KEY.to_string(),
                service_worker_url: None,
                forward_external_changes: false,
            }
        );
    }

    #[test]
    fn ignores_invalid_override_values() {
        let config =
            BootConfig::default().with_query_overrides("?boot-sw=maybe&boot-mount=&boot-storage-events");
        assert_eq!(config, BootConfig::default());
    }
}
