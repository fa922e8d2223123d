//! Per-platform configuration.

use std::num::NonZeroUsize;

use evesim_domain::device::DeviceKind;
use serde::Deserialize;

/// Default number of entries a history store keeps before evicting.
pub const DEFAULT_HISTORY_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Options recognised by an accessory platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Device display name, also used to name the history store.
    /// Empty means the kind's default name.
    pub name: String,
    /// Unregister all devices from the host on shutdown.
    pub unregister_on_shutdown: bool,
    /// Log every recorded history entry at `info` instead of `debug`.
    pub debug: bool,
    /// Maximum retained history entries; `None` keeps everything.
    pub history_capacity: Option<NonZeroUsize>,
    /// Seed for the synthetic light level; `0` draws from OS entropy.
    pub seed: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            unregister_on_shutdown: false,
            debug: false,
            history_capacity: Some(DEFAULT_HISTORY_CAPACITY),
            seed: 0,
        }
    }
}

impl PlatformConfig {
    /// Default configuration with the given display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The configured name, or the default name of `kind` when blank.
    #[must_use]
    pub fn display_name(&self, kind: DeviceKind) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            kind.display_name().to_string()
        } else {
            name.to_string()
        }
    }
}
