//! Conversions between system time and NTP fixed point timestamps
//!
//! System time is expressed as floating point seconds since UNIX EPOCH
//! "_1970-01-01 00:00:00 UTC_" and may be negative. NTP long format timestamps
//! keep 32-bit seconds since "_1900-01-01 00:00:00 UTC_" and a 32-bit fraction,
//! so the seconds counter wraps every 2^32 seconds (an "era"):
//! - era 0 starts at 1900-01-01 00:00:00 UTC
//! - era 1 starts at 2036-02-07 06:28:16 UTC
//!
//! Encoding only accepts times that fit era 0 and lie within half an era of a pivot
//! time, so decoding against the same pivot restores them. Decoding resolves the era
//! by picking the one closest to the pivot, which is the current time unless stated
//! otherwise.
use std::time::SystemTime;

use crate::types::{Error, Result};

/// Number of seconds between the NTP epoch and the UNIX epoch
/// <https://www.rfc-editor.org/rfc/rfc5905>
pub const NTP_TIMESTAMP_DELTA: u32 = 2_208_988_800u32;
/// Number of seconds in one NTP era
pub const ERA_SECONDS: i64 = 1 << 32;
/// NTP seconds mask
pub(crate) const SECONDS_MASK: u64 = 0xffff_ffff_0000_0000;
/// NTP seconds fraction mask
pub(crate) const SECONDS_FRAC_MASK: u64 = 0xffff_ffff;
/// Long format fraction scale, 2^32
const LONG_FRAC_SCALE: f64 = 4_294_967_296.0;
/// Short format fraction scale, 2^16
const SHORT_FRAC_SCALE: f64 = 65_536.0;

/// Encode system time into the 64-bit NTP long format
///
/// # Errors
///
/// Returns [`Error::Rollover`] if `time` is before the NTP epoch, at or after
/// 2036-02-07 06:28:16 UTC (the first second of era 1), more than half an era away
/// from the current time, or not a finite value.
///
/// # Example
///
/// ```
/// use ntpc::{ntp_to_system_time, system_to_ntp_time};
///
/// let ntp = system_to_ntp_time(1_659_726_522.0).unwrap();
/// assert_eq!(ntp >> 32, 1_659_726_522 + 2_208_988_800);
/// assert_eq!(ntp_to_system_time(ntp), 1_659_726_522.0);
/// ```
pub fn system_to_ntp_time(time: f64) -> Result<u64> {
    system_to_ntp_time_near(time, now())
}

/// Encode system time into the 64-bit NTP long format, checking the era against
/// `pivot` (system time)
///
/// # Errors
///
/// Returns [`Error::Rollover`] if `time` is outside of era 0, is not a finite value,
/// or would decode into another era when resolved against `pivot`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn system_to_ntp_time_near(time: f64, pivot: f64) -> Result<u64> {
    let ntp_time = time + f64::from(NTP_TIMESTAMP_DELTA);

    if !(0.0..LONG_FRAC_SCALE).contains(&ntp_time) {
        return Err(Error::Rollover(time));
    }

    let seconds = ntp_time.trunc();

    if era_seconds(seconds as u32, pivot) != seconds as i64 {
        return Err(Error::Rollover(time));
    }

    let fraction = ((ntp_time - seconds) * LONG_FRAC_SCALE) as u64;

    Ok(((seconds as u64) << 32) | fraction.min(SECONDS_FRAC_MASK))
}

/// Decode a 64-bit NTP long format timestamp into system time, resolving the
/// era against the current time
#[must_use]
pub fn ntp_to_system_time(timestamp: u64) -> f64 {
    ntp_to_system_time_near(timestamp, now())
}

/// Decode a 64-bit NTP long format timestamp into system time, resolving the
/// era against `pivot` (system time)
///
/// An all-zero timestamp means "unknown" on the wire and always decodes to the NTP epoch.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn ntp_to_system_time_near(timestamp: u64, pivot: f64) -> f64 {
    if timestamp == 0 {
        return -f64::from(NTP_TIMESTAMP_DELTA);
    }

    let seconds = era_seconds(((timestamp & SECONDS_MASK) >> 32) as u32, pivot);
    let fraction = (timestamp & SECONDS_FRAC_MASK) as f64 / LONG_FRAC_SCALE;

    (seconds - i64::from(NTP_TIMESTAMP_DELTA)) as f64 + fraction
}

/// Encode a non-negative duration in seconds into the 32-bit NTP short format (16.16)
///
/// Values outside of the representable range saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn system_to_ntp_short(seconds: f64) -> u32 {
    (seconds * SHORT_FRAC_SCALE) as u32
}

/// Decode a 32-bit NTP short format value into seconds
#[must_use]
pub fn ntp_short_to_system(value: u32) -> f64 {
    f64::from(value) / SHORT_FRAC_SCALE
}

/// Absolute NTP seconds for a raw 32-bit seconds value, picking the era that
/// places it within half an era of `pivot`
#[allow(clippy::cast_possible_truncation)]
fn era_seconds(raw_seconds: u32, pivot: f64) -> i64 {
    let pivot_ntp = pivot.floor() as i64 + i64::from(NTP_TIMESTAMP_DELTA);
    let candidate =
        pivot_ntp.div_euclid(ERA_SECONDS) * ERA_SECONDS + i64::from(raw_seconds);
    let diff = candidate - pivot_ntp;

    if diff > ERA_SECONDS / 2 {
        candidate - ERA_SECONDS
    } else if diff < -(ERA_SECONDS / 2) {
        candidate + ERA_SECONDS
    } else {
        candidate
    }
}

/// Current system time in seconds since UNIX EPOCH, negative before 1970
pub(crate) fn now() -> f64 {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_secs_f64(),
        Err(err) => -err.duration().as_secs_f64(),
    }
}

#[cfg(test)]
mod ntpc_timestamp_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[allow(clippy::cast_precision_loss)]
    fn unix(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> f64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .timestamp() as f64
    }

    #[test]
    fn test_round_trip() {
        let pivot = unix(2026, 1, 1, 0, 0, 0);
        let timestamps = [
            unix(2022, 8, 5, 19, 8, 42),
            unix(1970, 1, 1, 0, 0, 0),
            unix(2000, 1, 1, 0, 0, 0),
            unix(2036, 2, 7, 0, 0, 0),
        ];

        for t in timestamps {
            let ntp = system_to_ntp_time_near(t, pivot).unwrap();
            assert_eq!(t, ntp_to_system_time_near(ntp, pivot));
        }
    }

    #[test]
    fn test_round_trip_current_time() {
        let t = now().floor();
        let ntp = system_to_ntp_time(t).unwrap();

        assert_eq!(t, ntp_to_system_time(ntp));
    }

    #[test]
    fn test_round_trip_keeps_fraction() {
        let timestamps = [
            1_659_726_522.25,
            1_659_726_522.5,
            1_659_726_522.123_456,
            -12_345.75,
        ];

        let pivot = unix(2026, 1, 1, 0, 0, 0);

        for t in timestamps {
            let decoded =
                ntp_to_system_time_near(system_to_ntp_time_near(t, pivot).unwrap(), pivot);
            assert!((decoded - t).abs() < 1e-6, "{t} decoded as {decoded}");
        }
    }

    #[test]
    fn test_encoding_layout() {
        let pivot = unix(2026, 1, 1, 0, 0, 0);

        assert_eq!(
            (u64::from(NTP_TIMESTAMP_DELTA) << 32) | 0x8000_0000,
            system_to_ntp_time_near(0.5, pivot).unwrap()
        );

        let ntp_epoch = -f64::from(NTP_TIMESTAMP_DELTA);
        assert_eq!(0, system_to_ntp_time_near(ntp_epoch, unix(1950, 1, 1, 0, 0, 0)).unwrap());
    }

    #[test]
    fn test_rollover_boundary() {
        let pivot = unix(2026, 1, 1, 0, 0, 0);
        let last_era0_second = unix(2036, 2, 7, 6, 28, 15);
        let first_era1_second = unix(2036, 2, 7, 6, 28, 16);

        assert_eq!(
            0xffff_ffff_0000_0000,
            system_to_ntp_time_near(last_era0_second, pivot).unwrap()
        );
        assert_eq!(
            Err(Error::Rollover(first_era1_second)),
            system_to_ntp_time_near(first_era1_second, pivot)
        );

        let noon = unix(2036, 2, 7, 12, 0, 0);
        assert_eq!(Err(Error::Rollover(noon)), system_to_ntp_time_near(noon, pivot));
        assert_eq!(Err(Error::Rollover(noon)), system_to_ntp_time(noon));
    }

    #[test]
    fn test_rejects_far_from_pivot() {
        let far_past = unix(1920, 1, 1, 0, 0, 0);

        assert_eq!(Err(Error::Rollover(far_past)), system_to_ntp_time(far_past));
        assert_eq!(
            Err(Error::Rollover(far_past)),
            system_to_ntp_time_near(far_past, unix(2026, 1, 1, 0, 0, 0))
        );

        // accepted values decode back against the same pivot
        let pivot = unix(1930, 1, 1, 0, 0, 0);
        let raw = system_to_ntp_time_near(far_past, pivot).unwrap();
        assert_eq!(far_past, ntp_to_system_time_near(raw, pivot));
    }

    #[test]
    fn test_rejects_unrepresentable() {
        let before_ntp_epoch = -f64::from(NTP_TIMESTAMP_DELTA) - 1.0;

        assert!(matches!(
            system_to_ntp_time(before_ntp_epoch),
            Err(Error::Rollover(_))
        ));
        assert!(matches!(system_to_ntp_time(f64::NAN), Err(Error::Rollover(_))));
        assert!(matches!(
            system_to_ntp_time(f64::INFINITY),
            Err(Error::Rollover(_))
        ));
    }

    #[test]
    fn test_era_selection() {
        // 2040-01-01 wraps to a small seconds value in era 1
        let after_rollover = unix(2040, 1, 1, 0, 0, 0);
        let raw_seconds =
            (after_rollover as i64 + i64::from(NTP_TIMESTAMP_DELTA) - ERA_SECONDS) as u64;
        let pivot = unix(2039, 12, 31, 0, 0, 0);

        assert_eq!(
            after_rollover,
            ntp_to_system_time_near(raw_seconds << 32, pivot)
        );

        let in_era0 = unix(2035, 6, 1, 0, 0, 0);
        let raw = system_to_ntp_time_near(in_era0, pivot).unwrap();

        assert_eq!(in_era0, ntp_to_system_time_near(raw, pivot));
        assert_eq!(in_era0, ntp_to_system_time_near(raw, unix(2026, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_zero_timestamp_is_ntp_epoch() {
        let pivot = unix(2040, 1, 1, 0, 0, 0);

        assert_eq!(
            -f64::from(NTP_TIMESTAMP_DELTA),
            ntp_to_system_time_near(0, pivot)
        );
    }

    #[test]
    fn test_short_format() {
        assert_eq!(0x0001_8000, system_to_ntp_short(1.5));
        assert_eq!(0, system_to_ntp_short(0.0));
        assert_eq!(0, system_to_ntp_short(-1.0));
        assert_eq!(u32::MAX, system_to_ntp_short(70_000.0));
        assert_eq!(1.5, ntp_short_to_system(0x0001_8000));
        assert_eq!(0.004_684_448_242_187_5, ntp_short_to_system(307));
    }
}
