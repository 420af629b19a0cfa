//! Session configuration
//!
//! Defaults suit a normal Linux install. Every field can be overridden from
//! the environment with [`SessionConfig::from_env`]:
//!
//! | Variable | Field | Example |
//! |----------|-------|---------|
//! | `RYZEN_SMU_BACKEND` | `backend` | `kernel`, `devmem`, `simulated` |
//! | `RYZEN_SMU_TIMEOUT_MS` | `response_timeout` | `500` |
//! | `RYZEN_SMU_FAMILY` | `family_override` | `Rembrandt` |
//! | `RYZEN_SMU_DRV_PATH` | `driver_root` | `/sys/kernel/ryzen_smu_drv` |
//! | `RYZEN_SMU_LEGACY_MAILBOX` | `unknown_family` | `1` |

use crate::backend::BackendSelection;
use ryzen_chip::Family;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default sysfs root of the ryzen_smu kernel module.
pub const DEFAULT_DRIVER_ROOT: &str = "/sys/kernel/ryzen_smu_drv";

/// Default bound on the response register poll.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);

/// What to do when the detected family has no known mailbox layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFamilyPolicy {
    /// Fail with `FamilyUnsupported`.
    #[default]
    Strict,
    /// Use the first-generation layouts, logging a warning.
    LegacyDefault,
}

/// Options for opening a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Which backend to open
    pub backend: BackendSelection,
    /// How long to wait for the SMU to answer one message
    pub response_timeout: Duration,
    /// Mailbox policy for unrecognised silicon
    pub unknown_family: UnknownFamilyPolicy,
    /// Skip CPUID detection and use this family
    pub family_override: Option<Family>,
    /// ryzen_smu sysfs directory
    pub driver_root: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: BackendSelection::Auto,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            unknown_family: UnknownFamilyPolicy::Strict,
            family_override: None,
            driver_root: PathBuf::from(DEFAULT_DRIVER_ROOT),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `RYZEN_SMU_*` environment variables.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("RYZEN_SMU_BACKEND") {
            match value.parse() {
                Ok(backend) => config.backend = backend,
                Err(e) => warn!("Ignoring RYZEN_SMU_BACKEND: {e}"),
            }
        }

        if let Some(value) = lookup("RYZEN_SMU_TIMEOUT_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.response_timeout = Duration::from_millis(ms),
                _ => warn!("Ignoring RYZEN_SMU_TIMEOUT_MS={value}: expected a positive integer"),
            }
        }

        if let Some(value) = lookup("RYZEN_SMU_FAMILY") {
            match value.parse() {
                Ok(family) => config.family_override = Some(family),
                Err(e) => warn!("Ignoring RYZEN_SMU_FAMILY: {e}"),
            }
        }

        if let Some(value) = lookup("RYZEN_SMU_DRV_PATH") {
            config.driver_root = PathBuf::from(value);
        }

        if let Some(value) = lookup("RYZEN_SMU_LEGACY_MAILBOX") {
            if matches!(value.trim(), "1" | "true" | "yes") {
                config.unknown_family = UnknownFamilyPolicy::LegacyDefault;
            }
        }

        config
    }

    /// Override the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendSelection) -> Self {
        self.backend = backend;
        self
    }

    /// Override the response timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Skip detection and use `family`.
    #[must_use]
    pub fn with_family(mut self, family: Family) -> Self {
        self.family_override = Some(family);
        self
    }

    /// Set the unknown-family mailbox policy.
    #[must_use]
    pub fn with_unknown_family(mut self, policy: UnknownFamilyPolicy) -> Self {
        self.unknown_family = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = SessionConfig::from_lookup(|_| None);
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.response_timeout, Duration::from_millis(500));
        assert_eq!(config.unknown_family, UnknownFamilyPolicy::Strict);
    }

    #[test]
    fn environment_overrides() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("RYZEN_SMU_BACKEND", "devmem"),
            ("RYZEN_SMU_TIMEOUT_MS", "25"),
            ("RYZEN_SMU_FAMILY", "rembrandt"),
            ("RYZEN_SMU_DRV_PATH", "/tmp/fake_smu"),
            ("RYZEN_SMU_LEGACY_MAILBOX", "1"),
        ]));
        assert_eq!(config.backend, BackendSelection::DevMem);
        assert_eq!(config.response_timeout, Duration::from_millis(25));
        assert_eq!(config.family_override, Some(Family::Rembrandt));
        assert_eq!(config.driver_root, PathBuf::from("/tmp/fake_smu"));
        assert_eq!(config.unknown_family, UnknownFamilyPolicy::LegacyDefault);
    }

    #[test]
    fn bad_values_are_ignored() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("RYZEN_SMU_BACKEND", "winring0"),
            ("RYZEN_SMU_TIMEOUT_MS", "0"),
            ("RYZEN_SMU_FAMILY", "matisse"),
        ]));
        assert_eq!(config, SessionConfig::default());
    }
}
