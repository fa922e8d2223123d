//! Host port: device registration, attribute I/O and command dispatch.
//!
//! The host platform loads the emulator, exposes device objects to remote
//! clients and stores their cluster attributes. The engine only ever talks
//! to it through [`HostPlatform`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use evesim_domain::cluster::{AttributeValue, ClusterId};
use evesim_domain::device::{DeviceIdentity, DeviceKind};
use evesim_domain::error::AdapterError;
use evesim_domain::id::{DeviceHandle, PlatformId};
use evesim_domain::version;

/// Version capability every host exposes.
pub trait VersionGate {
    /// The version string the host reports about itself.
    fn current_version(&self) -> &str;

    /// Whether the host is at least `minimum`.
    ///
    /// The default parses both sides as `major.minor.patch`; unparseable
    /// versions never satisfy the gate.
    fn verify(&self, minimum: &str) -> bool {
        version::ensure_supported(self.current_version(), minimum).is_ok()
    }
}

impl<T: VersionGate + ?Sized> VersionGate for Arc<T> {
    fn current_version(&self) -> &str {
        (**self).current_version()
    }

    fn verify(&self, minimum: &str) -> bool {
        (**self).verify(minimum)
    }
}

/// Commands a remote client may send to an emulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Identify,
    TriggerEffect,
}

impl Command {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Identify => "identify",
            Self::TriggerEffect => "triggerEffect",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CommandRequest {
    Identify {
        identify_time: u16,
    },
    TriggerEffect {
        effect_identifier: u8,
        effect_variant: u8,
    },
}

impl CommandRequest {
    /// The command this payload belongs to.
    #[must_use]
    pub fn command(&self) -> Command {
        match self {
            Self::Identify { .. } => Command::Identify,
            Self::TriggerEffect { .. } => Command::TriggerEffect,
        }
    }
}

/// Future returned by a [`CommandHandler`].
pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback invoked by the host when a command arrives for a device.
pub type CommandHandler = Arc<dyn Fn(CommandRequest) -> CommandFuture + Send + Sync>;

/// The host platform as seen by the emulator.
///
/// Several platforms may share one host. Every device is created on behalf
/// of an owning [`PlatformId`], and unregistration only ever touches the
/// caller's own devices.
///
/// Handles become stale once the device is unregistered; callers guard
/// with their own lifecycle state rather than relying on adapter errors.
pub trait HostPlatform: VersionGate + Send + Sync {
    /// Create the device object for `kind` with the given identity, owned
    /// by `owner`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] if the host refuses the device.
    fn create_device(
        &self,
        owner: PlatformId,
        kind: DeviceKind,
        identity: &DeviceIdentity,
    ) -> Result<DeviceHandle, AdapterError>;

    /// Make a created device visible to clients.
    fn register_device(
        &self,
        device: DeviceHandle,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Unregister every device created by `owner` and drop its command
    /// handlers. Devices of other owners are left alone.
    fn unregister_all_devices(
        &self,
        owner: PlatformId,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Write one cluster attribute.
    fn set_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
        value: AttributeValue,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Read one cluster attribute, `None` if unset or the handle is unknown.
    fn get_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
    ) -> Option<AttributeValue>;

    /// Raise a cluster event (e.g. `booleanState.stateChange`).
    fn trigger_event(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        event: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send;

    /// Install `handler` for `command` on `device`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::UnknownDevice`] for a handle the host does not know.
    fn add_command_handler(
        &self,
        device: DeviceHandle,
        command: Command,
        handler: CommandHandler,
    ) -> Result<(), AdapterError>;
}

impl<T: HostPlatform> HostPlatform for Arc<T> {
    fn create_device(
        &self,
        owner: PlatformId,
        kind: DeviceKind,
        identity: &DeviceIdentity,
    ) -> Result<DeviceHandle, AdapterError> {
        (**self).create_device(owner, kind, identity)
    }

    fn register_device(
        &self,
        device: DeviceHandle,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        (**self).register_device(device)
    }

    fn unregister_all_devices(
        &self,
        owner: PlatformId,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        (**self).unregister_all_devices(owner)
    }

    fn set_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
        value: AttributeValue,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        (**self).set_attribute(device, cluster, attribute, value)
    }

    fn get_attribute(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        attribute: &str,
    ) -> Option<AttributeValue> {
        (**self).get_attribute(device, cluster, attribute)
    }

    fn trigger_event(
        &self,
        device: DeviceHandle,
        cluster: ClusterId,
        event: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<(), AdapterError>> + Send {
        (**self).trigger_event(device, cluster, event, payload)
    }

    fn add_command_handler(
        &self,
        device: DeviceHandle,
        command: Command,
        handler: CommandHandler,
    ) -> Result<(), AdapterError> {
        (**self).add_command_handler(device, command, handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedVersion(&'static str);

    impl VersionGate for FixedVersion {
        fn current_version(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn should_verify_newer_host() {
        assert!(FixedVersion("3.4.0").verify("3.3.0"));
    }

    #[test]
    fn should_verify_equal_host() {
        assert!(FixedVersion("3.3.0").verify("3.3.0"));
    }

    #[test]
    fn should_not_verify_older_host() {
        assert!(!FixedVersion("1.5.0").verify("3.3.0"));
    }

    #[test]
    fn should_not_verify_garbage_version() {
        assert!(!FixedVersion("dev").verify("3.3.0"));
    }

    #[test]
    fn should_forward_version_through_arc() {
        let host = Arc::new(FixedVersion("3.3.0"));
        assert_eq!(host.current_version(), "3.3.0");
    }

    #[test]
    fn should_map_request_to_command() {
        let request = CommandRequest::TriggerEffect {
            effect_identifier: 0,
            effect_variant: 0,
        };
        assert_eq!(request.command(), Command::TriggerEffect);
        assert_eq!(request.command().to_string(), "triggerEffect");
    }

    #[test]
    fn should_serialize_identify_request_in_camel_case() {
        let json = serde_json::to_value(CommandRequest::Identify { identify_time: 5 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"command": "identify", "identifyTime": 5})
        );
    }
}
