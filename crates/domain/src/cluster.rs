//! Clusters and the typed attribute values written into them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a protocol cluster on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    pub const IDENTIFY: Self = Self(0x0003);
    pub const POWER_SOURCE: Self = Self(0x002F);
    pub const BOOLEAN_STATE: Self = Self(0x0045);
    pub const ILLUMINANCE_MEASUREMENT: Self = Self(0x0400);
    pub const OCCUPANCY_SENSING: Self = Self(0x0406);

    /// Human-readable cluster name, or `None` for clusters this crate does not model.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        match self {
            Self::IDENTIFY => Some("identify"),
            Self::POWER_SOURCE => Some("powerSource"),
            Self::BOOLEAN_STATE => Some("booleanState"),
            Self::ILLUMINANCE_MEASUREMENT => Some("illuminanceMeasurement"),
            Self::OCCUPANCY_SENSING => Some("occupancySensing"),
            _ => None,
        }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04X}", self.0),
        }
    }
}

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl AttributeValue {
    /// The boolean payload, if this is a [`AttributeValue::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer payload, if this is an [`AttributeValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}
