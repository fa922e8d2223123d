//! Device state and the readings produced on each tick.

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::illuminance::{BASELINE_LUX, encode_lux};

/// Current simulated state of one accessory.
///
/// Door openings are events, not state: they surface as
/// [`Reading::Door::opened`] and are counted by whoever records history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceState {
    Motion { occupied: bool, lux: f64 },
    Door { contact: bool },
}

impl DeviceState {
    /// Baseline state written when a platform is configured.
    #[must_use]
    pub fn baseline(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Motion => Self::Motion {
                occupied: false,
                lux: BASELINE_LUX,
            },
            DeviceKind::Door => Self::Door { contact: true },
        }
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Motion { .. } => DeviceKind::Motion,
            Self::Door { .. } => DeviceKind::Door,
        }
    }

    /// The binary value that flips every tick (occupancy or contact).
    #[must_use]
    pub fn flag(&self) -> bool {
        match self {
            Self::Motion { occupied, .. } => *occupied,
            Self::Door { contact } => *contact,
        }
    }

    /// The reading that describes this state as-is.
    #[must_use]
    pub fn as_reading(&self) -> Reading {
        match *self {
            Self::Motion { occupied, lux } => Reading::Motion {
                occupied,
                lux,
                illuminance: encode_lux(lux),
            },
            Self::Door { contact } => Reading::Door {
                contact,
                opened: false,
            },
        }
    }
}

/// One simulated sample, ready to be written to the host and recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reading {
    Motion {
        occupied: bool,
        lux: f64,
        /// Encoded `measuredValue` for the illuminance cluster.
        illuminance: u16,
    },
    Door {
        contact: bool,
        /// The tick moved the door to the state counted by "times opened".
        opened: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_motion_unoccupied_at_baseline_lux() {
        let state = DeviceState::baseline(DeviceKind::Motion);
        assert_eq!(
            state,
            DeviceState::Motion {
                occupied: false,
                lux: BASELINE_LUX
            }
        );
    }

    #[test]
    fn should_start_door_with_contact() {
        let state = DeviceState::baseline(DeviceKind::Door);
        assert!(state.flag());
        assert_eq!(state.kind(), DeviceKind::Door);
    }

    #[test]
    fn should_encode_illuminance_in_baseline_reading() {
        let reading = DeviceState::baseline(DeviceKind::Motion).as_reading();
        assert_eq!(
            reading,
            Reading::Motion {
                occupied: false,
                lux: BASELINE_LUX,
                illuminance: 26_991,
            }
        );
    }

    #[test]
    fn should_serialize_state_with_kind_tag() {
        let json = serde_json::to_value(DeviceState::baseline(DeviceKind::Door)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "door", "contact": true})
        );
    }
}
