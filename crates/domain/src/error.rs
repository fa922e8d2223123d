//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`EmulatorError`] via `#[from]`.

use crate::lifecycle::LifecycleState;
use crate::id::DeviceHandle;

/// Root error type for the emulator.
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    #[error("unsupported host version")]
    UnsupportedHostVersion(#[from] UnsupportedHostVersionError),

    #[error("history store closed")]
    StoreClosed(#[from] StoreClosedError),

    #[error("host adapter error")]
    Adapter(#[from] AdapterError),

    #[error("invalid lifecycle transition")]
    InvalidTransition(#[from] InvalidTransitionError),

    #[error("validation error")]
    Validation(#[from] ValidationError),
}

/// The host runs an older version than the emulated device requires.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("this plugin requires host version >= {minimum:?}, found {current:?}")]
pub struct UnsupportedHostVersionError {
    pub current: String,
    pub minimum: String,
}

/// An entry was offered to a history store after it was closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("history store {store:?} is closed")]
pub struct StoreClosedError {
    pub store: String,
}

/// Failures reported by the host platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// The handle does not refer to a device known to the host.
    #[error("unknown device {0}")]
    UnknownDevice(DeviceHandle),

    /// The host refused or failed an attribute write.
    #[error("failed to write {cluster}.{attribute}")]
    WriteFailed { cluster: String, attribute: String },

    /// The host rejected the request outright.
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// An operation was called in a lifecycle state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {operation} while {from}")]
pub struct InvalidTransitionError {
    pub from: LifecycleState,
    pub operation: &'static str,
}

/// Invariant violations on domain values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid version string {0:?}")]
    InvalidVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_both_versions_in_unsupported_version_message() {
        let err = UnsupportedHostVersionError {
            current: "1.5.0".to_string(),
            minimum: "3.3.0".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("1.5.0"));
        assert!(text.contains("3.3.0"));
    }

    #[test]
    fn should_convert_store_closed_into_root_error() {
        let err: EmulatorError = StoreClosedError {
            store: "Eve motion".to_string(),
        }
        .into();
        assert!(matches!(err, EmulatorError::StoreClosed(_)));
    }

    #[test]
    fn should_display_invalid_transition() {
        let err = InvalidTransitionError {
            from: LifecycleState::Uninitialized,
            operation: "configure",
        };
        assert_eq!(err.to_string(), "cannot configure while uninitialized");
    }

    #[test]
    fn should_display_write_failure() {
        let err = AdapterError::WriteFailed {
            cluster: "occupancySensing".to_string(),
            attribute: "occupancy".to_string(),
        };
        assert_eq!(err.to_string(), "failed to write occupancySensing.occupancy");
    }
}
