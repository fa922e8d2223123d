//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for history entries and the last-event marker.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Build a timestamp from whole seconds since the Unix epoch.
///
/// Out-of-range values fall back to the epoch.
#[must_use]
pub fn from_epoch_secs(secs: i64) -> Timestamp {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_build_timestamp_from_epoch_seconds() {
        assert_eq!(from_epoch_secs(1_700_000_000).timestamp(), 1_700_000_000);
    }
}
