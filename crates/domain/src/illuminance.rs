//! Illuminance encoding and the synthetic light-level source.
//!
//! The illuminance-measurement cluster carries `10000 * log10(lux) + 1`,
//! rounded and clamped to `0..=0xFFFE`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest valid encoded illuminance (`0xFFFF` means "unknown").
pub const MAX_MEASURED_VALUE: u16 = 0xFFFE;

/// Lux written as the baseline reading on configure.
pub const BASELINE_LUX: f64 = 500.0;

/// Lower bound of synthetic light levels.
pub const FAKE_LUX_MIN: f64 = 0.0;

/// Upper bound of synthetic light levels.
pub const FAKE_LUX_MAX: f64 = 1000.0;

/// Encode a lux reading into the cluster's measured value.
///
/// Zero, negative and `NaN` inputs encode as `0`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_lux(lux: f64) -> u16 {
    let raw = (10_000.0 * lux.log10() + 1.0).round();
    if raw.is_nan() {
        return 0;
    }
    // Clamped into u16 range, so the cast cannot truncate.
    raw.clamp(0.0, f64::from(MAX_MEASURED_VALUE)) as u16
}

/// Approximate inverse of [`encode_lux`].
#[must_use]
pub fn decode_lux(measured: u16) -> f64 {
    10_f64.powf((f64::from(measured) - 1.0) / 10_000.0)
}

/// Draw a synthetic level in `[min, max]` from `rng`.
///
/// Reversed bounds are swapped.
pub fn fake_level_with<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(low..=high)
}

/// Draw a synthetic level in `[min, max]`.
///
/// A non-zero `seed` makes the draw reproducible; `0` uses the thread RNG.
#[must_use]
pub fn fake_level(min: f64, max: f64, seed: u64) -> f64 {
    if seed == 0 {
        fake_level_with(&mut rand::thread_rng(), min, max)
    } else {
        fake_level_with(&mut StdRng::seed_from_u64(seed), min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_baseline_lux() {
        // 10000 * log10(500) + 1 = 26990.7
        assert_eq!(encode_lux(BASELINE_LUX), 26_991);
    }

    #[test]
    fn should_encode_one_lux_as_one() {
        assert_eq!(encode_lux(1.0), 1);
    }

    #[test]
    fn should_encode_zero_and_negative_lux_as_zero() {
        assert_eq!(encode_lux(0.0), 0);
        assert_eq!(encode_lux(-5.0), 0);
        assert_eq!(encode_lux(f64::NAN), 0);
    }

    #[test]
    fn should_clamp_huge_lux() {
        assert_eq!(encode_lux(1e12), MAX_MEASURED_VALUE);
        assert_eq!(encode_lux(f64::INFINITY), MAX_MEASURED_VALUE);
    }

    #[test]
    fn should_reencode_decoded_value_identically() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let lux = rng.gen_range(1.0..=1000.0);
            let encoded = encode_lux(lux);
            assert_eq!(encode_lux(decode_lux(encoded)), encoded, "lux = {lux}");
        }
    }

    #[test]
    fn should_keep_unseeded_fake_level_in_range() {
        for _ in 0..10_000 {
            let level = fake_level(FAKE_LUX_MIN, FAKE_LUX_MAX, 0);
            assert!((FAKE_LUX_MIN..=FAKE_LUX_MAX).contains(&level), "{level}");
        }
    }

    #[test]
    fn should_reproduce_seeded_fake_level() {
        assert_eq!(fake_level(0.0, 1000.0, 42), fake_level(0.0, 1000.0, 42));
    }

    #[test]
    fn should_swap_reversed_bounds() {
        let level = fake_level(1000.0, 0.0, 3);
        assert!((0.0..=1000.0).contains(&level));
    }

    #[test]
    fn should_return_bound_when_range_is_degenerate() {
        assert!((fake_level(250.0, 250.0, 9) - 250.0).abs() < f64::EPSILON);
    }
}
