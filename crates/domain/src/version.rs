//! Host version gate.
//!
//! Versions are compared as `major.minor.patch`. Pre-release and build
//! suffixes (`-dev.3`, `+abc`) are ignored, and missing components count as
//! zero, so `"3.3"` equals `"3.3.0"`.

use std::fmt;
use std::str::FromStr;

use crate::error::{UnsupportedHostVersionError, ValidationError};

/// Minimum host version the emulated accessories require.
pub const MINIMUM_HOST_VERSION: &str = "3.3.0";

/// A parsed `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl HostVersion {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for HostVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidVersion(s.to_string());

        let core = s
            .trim()
            .trim_start_matches('v')
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        if core.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0_u64; 3];
        for (index, part) in core.split('.').enumerate() {
            let slot = parts.get_mut(index).ok_or_else(invalid)?;
            *slot = part.parse().map_err(|_| invalid())?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Check that `current` is at least `minimum`.
///
/// A version string that does not parse is treated as unsupported.
///
/// # Errors
///
/// Returns [`UnsupportedHostVersionError`] naming both versions when the
/// host is too old or either string is malformed.
pub fn ensure_supported(current: &str, minimum: &str) -> Result<(), UnsupportedHostVersionError> {
    let unsupported = || UnsupportedHostVersionError {
        current: current.to_string(),
        minimum: minimum.to_string(),
    };

    let current_version: HostVersion = current.parse().map_err(|_| unsupported())?;
    let minimum_version: HostVersion = minimum.parse().map_err(|_| unsupported())?;

    if current_version < minimum_version {
        return Err(unsupported());
    }
    Ok(())
}
