//! Attribute sync: pushes readings into the host device's clusters.

use evesim_domain::cluster::{AttributeValue, ClusterId};
use evesim_domain::error::AdapterError;
use evesim_domain::id::DeviceHandle;
use evesim_domain::reading::Reading;

use crate::ports::HostPlatform;

pub const OCCUPANCY: &str = "occupancy";
pub const MEASURED_VALUE: &str = "measuredValue";
pub const STATE_VALUE: &str = "stateValue";
pub const STATE_CHANGE: &str = "stateChange";
pub const BAT_PERCENT_REMAINING: &str = "batPercentRemaining";

/// Battery level reported by the emulated replaceable battery.
pub const BATTERY_PERCENT: u8 = 75;

/// Writes readings for one device through the host port.
pub struct AttributeSync<'a, H> {
    host: &'a H,
    device: DeviceHandle,
}

impl<'a, H: HostPlatform> AttributeSync<'a, H> {
    pub fn new(host: &'a H, device: DeviceHandle) -> Self {
        Self { host, device }
    }

    /// Write the attributes carried by `reading` and raise the events that
    /// go with a state change.
    ///
    /// All writes are attempted even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`] reported by the host.
    pub async fn write_reading(&self, reading: &Reading) -> Result<(), AdapterError> {
        let attributes = self.write_attributes(reading).await;
        let event = match *reading {
            Reading::Motion { .. } => Ok(()),
            Reading::Door { contact, .. } => {
                self.host
                    .trigger_event(
                        self.device,
                        ClusterId::BOOLEAN_STATE,
                        STATE_CHANGE,
                        serde_json::json!({ "stateValue": contact }),
                    )
                    .await
            }
        };
        attributes.and(event)
    }

    /// Write the attributes carried by `reading` without raising events.
    ///
    /// # Errors
    ///
    /// Returns the first [`AdapterError`] reported by the host.
    pub async fn write_attributes(&self, reading: &Reading) -> Result<(), AdapterError> {
        match *reading {
            Reading::Motion {
                occupied,
                illuminance,
                ..
            } => {
                let occupancy = self
                    .host
                    .set_attribute(
                        self.device,
                        ClusterId::OCCUPANCY_SENSING,
                        OCCUPANCY,
                        AttributeValue::Json(serde_json::json!({ "occupied": occupied })),
                    )
                    .await;
                let lux = self
                    .host
                    .set_attribute(
                        self.device,
                        ClusterId::ILLUMINANCE_MEASUREMENT,
                        MEASURED_VALUE,
                        AttributeValue::Int(i64::from(illuminance)),
                    )
                    .await;
                occupancy.and(lux)
            }
            Reading::Door { contact, .. } => {
                self.host
                    .set_attribute(
                        self.device,
                        ClusterId::BOOLEAN_STATE,
                        STATE_VALUE,
                        AttributeValue::Bool(contact),
                    )
                    .await
            }
        }
    }

    /// Report the replaceable battery level (in half-percent units, as the
    /// power-source cluster expects).
    ///
    /// # Errors
    ///
    /// Returns the [`AdapterError`] reported by the host.
    pub async fn write_battery(&self, percent: u8) -> Result<(), AdapterError> {
        self.host
            .set_attribute(
                self.device,
                ClusterId::POWER_SOURCE,
                BAT_PERCENT_REMAINING,
                AttributeValue::Int(i64::from(percent.min(100)) * 2),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Command, CommandHandler, VersionGate};
    use evesim_domain::device::{DeviceIdentity, DeviceKind};
    use evesim_domain::id::PlatformId;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    // ── Recording host ─────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingHost {
        attributes: Mutex<HashMap<(ClusterId, String), AttributeValue>>,
        events: Mutex<Vec<(ClusterId, String, serde_json::Value)>>,
        fail_cluster: Option<ClusterId>,
    }

    impl VersionGate for RecordingHost {
        fn current_version(&self) -> &str {
            "3.3.0"
        }
    }

    impl HostPlatform for RecordingHost {
        fn create_device(
            &self,
            _owner: PlatformId,
            _kind: DeviceKind,
            _identity: &DeviceIdentity,
        ) -> Result<DeviceHandle, AdapterError> {
            Ok(DeviceHandle::new())
        }

        fn register_device(
            &self,
            _device: DeviceHandle,
        ) -> impl Future<Output = Result<(), AdapterError>> + Send {
            async { Ok(()) }
        }

        fn unregister_all_devices(
            &self,
            _owner: PlatformId,
        ) -> impl Future<Output = Result<(), AdapterError>> + Send {
            async { Ok(()) }
        }

        fn set_attribute(
            &self,
            _device: DeviceHandle,
            cluster: ClusterId,
            attribute: &str,
            value: AttributeValue,
        ) -> impl Future<Output = Result<(), AdapterError>> + Send {
            let result = if self.fail_cluster == Some(cluster) {
                Err(AdapterError::WriteFailed {
                    cluster: cluster.to_string(),
                    attribute: attribute.to_string(),
                })
            } else {
                self.attributes
                    .lock()
                    .unwrap()
                    .insert((cluster, attribute.to_string()), value);
                Ok(())
            };
            async { result }
        }

        fn get_attribute(
            &self,
            _device: DeviceHandle,
            cluster: ClusterId,
            attribute: &str,
        ) -> Option<AttributeValue> {
            self.attributes
                .lock()
                .unwrap()
                .get(&(cluster, attribute.to_string()))
                .cloned()
        }

        fn trigger_event(
            &self,
            _device: DeviceHandle,
            cluster: ClusterId,
            event: &str,
            payload: serde_json::Value,
        ) -> impl Future<Output = Result<(), AdapterError>> + Send {
            self.events
                .lock()
                .unwrap()
                .push((cluster, event.to_string(), payload));
            async { Ok(()) }
        }

        fn add_command_handler(
            &self,
            _device: DeviceHandle,
            _command: Command,
            _handler: CommandHandler,
        ) -> Result<(), AdapterError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn should_write_occupancy_and_encoded_illuminance() {
        let host = RecordingHost::default();
        let device = DeviceHandle::new();
        let sync = AttributeSync::new(&host, device);

        sync.write_reading(&Reading::Motion {
            occupied: true,
            lux: 500.0,
            illuminance: 26_991,
        })
        .await
        .unwrap();

        assert_eq!(
            host.get_attribute(device, ClusterId::OCCUPANCY_SENSING, OCCUPANCY),
            Some(AttributeValue::Json(serde_json::json!({"occupied": true})))
        );
        assert_eq!(
            host.get_attribute(device, ClusterId::ILLUMINANCE_MEASUREMENT, MEASURED_VALUE),
            Some(AttributeValue::Int(26_991))
        );
    }

    #[tokio::test]
    async fn should_write_contact_and_raise_state_change() {
        let host = RecordingHost::default();
        let device = DeviceHandle::new();
        let sync = AttributeSync::new(&host, device);

        sync.write_reading(&Reading::Door {
            contact: false,
            opened: true,
        })
        .await
        .unwrap();

        assert_eq!(
            host.get_attribute(device, ClusterId::BOOLEAN_STATE, STATE_VALUE),
            Some(AttributeValue::Bool(false))
        );
        let events = host.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1, STATE_CHANGE);
        assert_eq!(events[0].2, serde_json::json!({"stateValue": false}));
    }

    #[tokio::test]
    async fn should_not_raise_events_for_plain_attribute_writes() {
        let host = RecordingHost::default();
        let device = DeviceHandle::new();
        AttributeSync::new(&host, device)
            .write_attributes(&Reading::Door {
                contact: true,
                opened: false,
            })
            .await
            .unwrap();

        assert_eq!(
            host.get_attribute(device, ClusterId::BOOLEAN_STATE, STATE_VALUE),
            Some(AttributeValue::Bool(true))
        );
        assert!(host.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_attempt_remaining_writes_after_failure() {
        let host = RecordingHost {
            fail_cluster: Some(ClusterId::OCCUPANCY_SENSING),
            ..RecordingHost::default()
        };
        let device = DeviceHandle::new();
        let sync = AttributeSync::new(&host, device);

        let result = sync
            .write_reading(&Reading::Motion {
                occupied: false,
                lux: 1.0,
                illuminance: 1,
            })
            .await;

        assert!(matches!(result, Err(AdapterError::WriteFailed { .. })));
        assert_eq!(
            host.get_attribute(device, ClusterId::ILLUMINANCE_MEASUREMENT, MEASURED_VALUE),
            Some(AttributeValue::Int(1))
        );
    }

    #[tokio::test]
    async fn should_report_battery_in_half_percent_units() {
        let host = RecordingHost::default();
        let device = DeviceHandle::new();
        AttributeSync::new(&host, device)
            .write_battery(BATTERY_PERCENT)
            .await
            .unwrap();

        assert_eq!(
            host.get_attribute(device, ClusterId::POWER_SOURCE, BAT_PERCENT_REMAINING),
            Some(AttributeValue::Int(150))
        );
    }
}
