//! History entries: the timestamped samples kept by the history store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reading::Reading;
use crate::time::Timestamp;

/// The kind-specific payload of a [`HistoryEntry`].
///
/// Flags are inverted, as the history log expects: `0` means occupied for
/// motion and contact for the door.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    Motion { motion: u8, lux: f64 },
    Door { contact: u8 },
}

impl From<&Reading> for Sample {
    fn from(reading: &Reading) -> Self {
        match *reading {
            Reading::Motion { occupied, lux, .. } => Self::Motion {
                motion: inverted_flag(occupied),
                lux,
            },
            Reading::Door { contact, .. } => Self::Door {
                contact: inverted_flag(contact),
            },
        }
    }
}

fn inverted_flag(value: bool) -> u8 {
    u8::from(!value)
}

/// One immutable, timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub time: Timestamp,
    #[serde(flatten)]
    pub sample: Sample,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(time: Timestamp, sample: Sample) -> Self {
        Self { time, sample }
    }

    /// Record `reading` as taken at `time`.
    #[must_use]
    pub fn from_reading(time: Timestamp, reading: &Reading) -> Self {
        Self::new(time, Sample::from(reading))
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.time.timestamp();
        let iso = self.time.format("%Y-%m-%d %H:%M:%S");
        match self.sample {
            Sample::Motion { motion, lux } => {
                write!(f, "{secs} ({iso}) motion: {motion} lux: {lux:.2}")
            }
            Sample::Door { contact } => write!(f, "{secs} ({iso}) contact: {contact}"),
        }
    }
}
