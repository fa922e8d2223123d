//! Telemetry generator: derives the next reading from the current state.
//!
//! Randomness comes only from the `rng` argument; given the same state and
//! the same RNG sequence the output is identical.

use rand::Rng;

use crate::illuminance::{FAKE_LUX_MAX, FAKE_LUX_MIN, encode_lux, fake_level_with};
use crate::reading::{DeviceState, Reading};

/// Produce the state after one tick together with the reading to publish.
///
/// - Motion: occupancy flips and a fresh lux level is drawn; both change
///   together.
/// - Door: contact flips; the reading is flagged `opened` when contact
///   becomes `false`.
pub fn next_reading<R: Rng + ?Sized>(current: &DeviceState, rng: &mut R) -> (DeviceState, Reading) {
    match *current {
        DeviceState::Motion { occupied, .. } => {
            let occupied = !occupied;
            let lux = fake_level_with(rng, FAKE_LUX_MIN, FAKE_LUX_MAX);
            (
                DeviceState::Motion { occupied, lux },
                Reading::Motion {
                    occupied,
                    lux,
                    illuminance: encode_lux(lux),
                },
            )
        }
        DeviceState::Door { contact } => {
            let contact = !contact;
            (
                DeviceState::Door { contact },
                Reading::Door {
                    contact,
                    opened: !contact,
                },
            )
        }
    }
}
