//! Device: the emulated accessory kinds and the identity they report.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterId;

/// The accessory being emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Eve Motion: occupancy plus illuminance.
    Motion,
    /// Eve Door: a contact sensor.
    Door,
}

impl DeviceKind {
    /// Default display name, also used as the history store name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Motion => "Eve motion",
            Self::Door => "Eve door",
        }
    }

    /// Clusters exposed by the device, in registration order.
    #[must_use]
    pub fn clusters(self) -> &'static [ClusterId] {
        match self {
            Self::Motion => &[
                ClusterId::IDENTIFY,
                ClusterId::OCCUPANCY_SENSING,
                ClusterId::ILLUMINANCE_MEASUREMENT,
                ClusterId::POWER_SOURCE,
            ],
            Self::Door => &[
                ClusterId::IDENTIFY,
                ClusterId::BOOLEAN_STATE,
                ClusterId::POWER_SOURCE,
            ],
        }
    }

    /// Tick period of the emulation loop: one minute plus a small per-kind offset.
    #[must_use]
    pub fn tick_period(self) -> Duration {
        match self {
            Self::Motion => Duration::from_millis(60_000 + 200),
            Self::Door => Duration::from_millis(60_000 - 500),
        }
    }

    /// The identity reported through the basic-information cluster.
    #[must_use]
    pub fn identity(self) -> DeviceIdentity {
        match self {
            Self::Motion => DeviceIdentity {
                name: self.display_name().to_string(),
                serial: "0x85483499".to_string(),
                vendor_id: 4874,
                vendor_name: "Eve Systems".to_string(),
                product_id: 89,
                product_name: "Eve Motion 20EBY9901".to_string(),
                hardware_revision: 6650,
                software_version: "3.2.1".to_string(),
            },
            Self::Door => DeviceIdentity {
                name: self.display_name().to_string(),
                serial: "0x88030475".to_string(),
                vendor_id: 4874,
                vendor_name: "Eve Systems".to_string(),
                product_id: 77,
                product_name: "Eve Door 20EBN9901".to_string(),
                hardware_revision: 1144,
                software_version: "1.2.8".to_string(),
            },
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion => f.write_str("motion"),
            Self::Door => f.write_str("door"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motion" => Ok(Self::Motion),
            "door" => Ok(Self::Door),
            other => Err(format!("unknown device kind: {other}")),
        }
    }
}

/// Vendor, model, serial and revision information for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub name: String,
    pub serial: String,
    pub vendor_id: u16,
    pub vendor_name: String,
    pub product_id: u16,
    pub product_name: String,
    pub hardware_revision: u16,
    pub software_version: String,
}

impl DeviceIdentity {
    /// Replace the display name, keeping the rest of the identity.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_motion_clusters_in_order() {
        assert_eq!(
            DeviceKind::Motion.clusters(),
            &[
                ClusterId::IDENTIFY,
                ClusterId::OCCUPANCY_SENSING,
                ClusterId::ILLUMINANCE_MEASUREMENT,
                ClusterId::POWER_SOURCE,
            ]
        );
    }

    #[test]
    fn should_expose_boolean_state_for_door() {
        assert!(DeviceKind::Door.clusters().contains(&ClusterId::BOOLEAN_STATE));
        assert!(!DeviceKind::Door.clusters().contains(&ClusterId::OCCUPANCY_SENSING));
    }

    #[test]
    fn should_tick_roughly_once_a_minute() {
        assert_eq!(DeviceKind::Motion.tick_period(), Duration::from_millis(60_200));
        assert_eq!(DeviceKind::Door.tick_period(), Duration::from_millis(59_500));
    }

    #[test]
    fn should_report_eve_identity() {
        let identity = DeviceKind::Motion.identity();
        assert_eq!(identity.vendor_id, 4874);
        assert_eq!(identity.vendor_name, "Eve Systems");
        assert_eq!(identity.product_name, "Eve Motion 20EBY9901");
        assert_eq!(identity.serial, "0x85483499");
    }

    #[test]
    fn should_parse_kind_from_str() {
        assert_eq!("door".parse::<DeviceKind>().unwrap(), DeviceKind::Door);
        assert!("lamp".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn should_replace_name_only() {
        let identity = DeviceKind::Door.identity().with_name("Front door");
        assert_eq!(identity.name, "Front door");
        assert_eq!(identity.serial, "0x88030475");
    }

    #[test]
    fn should_deserialize_kind_in_snake_case() {
        let kind: DeviceKind = serde_json::from_str("\"motion\"").unwrap();
        assert_eq!(kind, DeviceKind::Motion);
    }
}
