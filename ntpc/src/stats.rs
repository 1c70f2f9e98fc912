use core::fmt::{self, Display, Formatter};

use crate::packet::NtpPacket;
use crate::text;
use crate::timestamp::{ntp_short_to_system, ntp_to_system_time_near};

/// NTP request result representation
///
/// Wraps the decoded server reply together with the client side readings of the
/// exchange. All times are floating point seconds since UNIX EPOCH, durations are
/// floating point seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NtpStats {
    packet: NtpPacket,
    orig_time: f64,
    dest_time: f64,
    recv_time: f64,
    tx_time: f64,
    offset: f64,
    delay: f64,
}

impl NtpStats {
    /// Create new NTP result
    /// Args:
    /// * `packet` - decoded server reply
    /// * `orig_time` - system time the request was sent at
    /// * `dest_time` - system time the reply was received at
    ///
    /// Reply timestamps are placed into the NTP era closest to `dest_time`.
    #[must_use]
    pub fn new(packet: NtpPacket, orig_time: f64, dest_time: f64) -> Self {
        let recv_time = ntp_to_system_time_near(packet.recv_timestamp, dest_time);
        let tx_time = ntp_to_system_time_near(packet.tx_timestamp, dest_time);

        NtpStats {
            packet,
            orig_time,
            dest_time,
            recv_time,
            tx_time,
            offset: offset_calculate(orig_time, recv_time, tx_time, dest_time),
            delay: roundtrip_calculate(orig_time, recv_time, tx_time, dest_time),
        }
    }

    /// Returns the decoded server reply
    #[must_use]
    pub fn packet(&self) -> &NtpPacket {
        &self.packet
    }

    /// Returns estimated difference between the server clock and the system clock in seconds
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns request's round-trip delay (client -> server -> client) in seconds,
    /// server processing time excluded
    #[must_use]
    pub fn delay(&self) -> f64 {
        self.delay
    }

    #[must_use]
    pub fn leap(&self) -> u8 {
        self.packet.leap
    }

    #[must_use]
    pub fn version(&self) -> u8 {
        self.packet.version
    }

    #[must_use]
    pub fn mode(&self) -> u8 {
        self.packet.mode
    }

    /// Returns reported stratum value (level of server's hierarchy to stratum 0 - "reference clock")
    #[must_use]
    pub fn stratum(&self) -> u8 {
        self.packet.stratum
    }

    /// Returns reported poll interval as log2 seconds
    #[must_use]
    pub fn poll(&self) -> i8 {
        self.packet.poll
    }

    /// Returns reported precision value (an exponent of two, which results in the precision of server's system clock in seconds)
    #[must_use]
    pub fn precision(&self) -> i8 {
        self.packet.precision
    }

    /// Returns total round-trip delay to the primary reference source in seconds
    #[must_use]
    pub fn root_delay(&self) -> f64 {
        ntp_short_to_system(self.packet.root_delay)
    }

    /// Returns maximum error relative to the primary reference source in seconds
    #[must_use]
    pub fn root_dispersion(&self) -> f64 {
        ntp_short_to_system(self.packet.root_dispersion)
    }

    #[must_use]
    pub fn ref_id(&self) -> u32 {
        self.packet.ref_id
    }

    /// Returns time the server clock was last set or corrected
    #[must_use]
    pub fn ref_time(&self) -> f64 {
        ntp_to_system_time_near(self.packet.ref_timestamp, self.dest_time)
    }

    /// Returns originate timestamp echoed back by the server
    #[must_use]
    pub fn server_orig_time(&self) -> f64 {
        ntp_to_system_time_near(self.packet.origin_timestamp, self.dest_time)
    }

    /// Returns time the request left the client
    #[must_use]
    pub fn orig_time(&self) -> f64 {
        self.orig_time
    }

    /// Returns time the request arrived at the server
    #[must_use]
    pub fn recv_time(&self) -> f64 {
        self.recv_time
    }

    /// Returns time the reply left the server
    #[must_use]
    pub fn tx_time(&self) -> f64 {
        self.tx_time
    }

    /// Returns time the reply arrived at the client
    #[must_use]
    pub fn dest_time(&self) -> f64 {
        self.dest_time
    }
}

#[cfg(feature = "chrono")]
mod calendar {
    use chrono::{DateTime, Utc};

    use super::NtpStats;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_datetime(time: f64) -> Option<DateTime<Utc>> {
        let seconds = time.floor();
        let nanos = ((time - seconds) * 1e9) as u32;

        DateTime::from_timestamp(seconds as i64, nanos.min(999_999_999))
    }

    impl NtpStats {
        /// Server transmit time as a calendar date
        #[must_use]
        pub fn tx_datetime(&self) -> Option<DateTime<Utc>> {
            to_datetime(self.tx_time)
        }

        /// Server reference time as a calendar date
        #[must_use]
        pub fn ref_datetime(&self) -> Option<DateTime<Utc>> {
            to_datetime(self.ref_time())
        }

        /// Client receive time corrected by the estimated offset
        #[must_use]
        pub fn corrected_datetime(&self) -> Option<DateTime<Utc>> {
            to_datetime(self.dest_time + self.offset)
        }
    }
}

impl Display for NtpStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "offset {:+.6} s, delay {:.6} s, {}, stratum {}, leap: {}, reference: {}",
            self.offset,
            self.delay,
            text::mode_to_text(self.mode()),
            self.stratum(),
            text::leap_to_text(self.leap()),
            text::ref_id_to_text(self.ref_id(), self.stratum()),
        )
    }
}

// System clock offset:
// theta = T(B) - T(A) = 1/2 * [(T2-T1) + (T3-T4)]
// Round-trip delay:
// delta = T(ABA) = (T4-T1) - (T3-T2).
// where:
// - T1 = client's TX timestamp
// - T2 = server's RX timestamp
// - T3 = server's TX timestamp
// - T4 = client's RX timestamp
fn offset_calculate(t1: f64, t2: f64, t3: f64, t4: f64) -> f64 {
    ((t2 - t1) + (t3 - t4)) / 2.0
}

fn roundtrip_calculate(t1: f64, t2: f64, t3: f64, t4: f64) -> f64 {
    ((t4 - t1) - (t3 - t2)).max(0.0)
}
