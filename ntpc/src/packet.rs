//! NTP header wire format
//!
//! The header occupies the first 48 bytes of every NTP datagram, all multi-byte
//! fields in network byte order:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |LI | VN  |Mode |    Stratum    |     Poll      |   Precision   |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          Root Delay                           |
//! |                       Root Dispersion                         |
//! |                        Reference ID                           |
//! |                  Reference Timestamp (64)                     |
//! |                   Origin Timestamp (64)                       |
//! |                   Receive Timestamp (64)                      |
//! |                   Transmit Timestamp (64)                     |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Extension fields and the authenticator may follow the header; they are ignored.
use crate::types::{Error, Result};

/// Size of the NTP header in bytes
pub const NTP_PACKET_SIZE: usize = 48;

/// NTP mode value bit mask
pub(crate) const MODE_MASK: u8 = 0b0000_0111;
/// NTP mode bit mask shift value
pub(crate) const MODE_SHIFT: u8 = 0;
/// NTP version value bit mask
pub(crate) const VERSION_MASK: u8 = 0b0011_1000;
/// NTP version bit mask shift value
pub(crate) const VERSION_SHIFT: u8 = 3;
/// NTP LI (leap indicator) bit mask value
pub(crate) const LI_MASK: u8 = 0b1100_0000;
/// NTP LI bit mask shift value
pub(crate) const LI_SHIFT: u8 = 6;

/// NTP header representation
///
/// Fields keep their wire values: root delay and root dispersion in the 16.16 short
/// format, timestamps in the 64-bit long format. Use the [`crate::timestamp`]
/// functions or [`crate::NtpStats`] to get them as seconds.
///
/// `leap`, `version` and `mode` share the first byte of the header. Values wider than
/// 2, 3 and 3 bits respectively are truncated on encoding.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct NtpPacket {
    /// Leap indicator, 2 bits
    pub leap: u8,
    /// Protocol version, 3 bits
    pub version: u8,
    /// Association mode, 3 bits
    pub mode: u8,
    pub stratum: u8,
    /// Maximum poll interval as log2 seconds
    pub poll: i8,
    /// Clock precision as log2 seconds
    pub precision: i8,
    pub root_delay: u32,
    pub root_dispersion: u32,
    pub ref_id: u32,
    pub ref_timestamp: u64,
    pub origin_timestamp: u64,
    pub recv_timestamp: u64,
    pub tx_timestamp: u64,
}

impl NtpPacket {
    /// Client association mode
    pub const CLIENT_MODE: u8 = 3;
    /// Server association mode
    pub const SERVER_MODE: u8 = 4;

    /// Build a client request with the given protocol version and transmit timestamp;
    /// every other field is zero
    #[must_use]
    pub fn client_request(version: u8, tx_timestamp: u64) -> NtpPacket {
        NtpPacket {
            version,
            mode: NtpPacket::CLIENT_MODE,
            tx_timestamp,
            ..NtpPacket::default()
        }
    }

    /// Serialize the header into its 48-byte wire representation
    #[must_use]
    pub fn encode(&self) -> [u8; NTP_PACKET_SIZE] {
        RawNtpPacket::from(self).0
    }

    /// Parse a header from `buf`. Bytes past the header are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncorrectPayload`] if `buf` is shorter than [`NTP_PACKET_SIZE`]
    pub fn decode(buf: &[u8]) -> Result<NtpPacket> {
        let mut raw = RawNtpPacket::default();
        let header = buf.get(..NTP_PACKET_SIZE).ok_or(Error::IncorrectPayload {
            expected: NTP_PACKET_SIZE,
            actual: buf.len(),
        })?;

        raw.0.copy_from_slice(header);
        Ok(NtpPacket::from(raw))
    }
}

#[derive(Copy, Clone)]
pub(crate) struct RawNtpPacket(pub(crate) [u8; NTP_PACKET_SIZE]);

impl Default for RawNtpPacket {
    fn default() -> Self {
        RawNtpPacket([0u8; NTP_PACKET_SIZE])
    }
}

impl RawNtpPacket {
    fn u32_at(&self, offset: usize) -> u32 {
        let mut temp_buf = [0u8; 4];
        temp_buf.copy_from_slice(&self.0[offset..offset + 4]);
        u32::from_be_bytes(temp_buf)
    }

    fn u64_at(&self, offset: usize) -> u64 {
        let mut temp_buf = [0u8; 8];
        temp_buf.copy_from_slice(&self.0[offset..offset + 8]);
        u64::from_be_bytes(temp_buf)
    }
}

impl From<RawNtpPacket> for NtpPacket {
    fn from(val: RawNtpPacket) -> Self {
        let li_vn_mode = val.0[0];

        NtpPacket {
            leap: shifter(li_vn_mode, LI_MASK, LI_SHIFT),
            version: shifter(li_vn_mode, VERSION_MASK, VERSION_SHIFT),
            mode: shifter(li_vn_mode, MODE_MASK, MODE_SHIFT),
            stratum: val.0[1],
            #[allow(clippy::cast_possible_wrap)]
            poll: val.0[2] as i8,
            #[allow(clippy::cast_possible_wrap)]
            precision: val.0[3] as i8,
            root_delay: val.u32_at(4),
            root_dispersion: val.u32_at(8),
            ref_id: val.u32_at(12),
            ref_timestamp: val.u64_at(16),
            origin_timestamp: val.u64_at(24),
            recv_timestamp: val.u64_at(32),
            tx_timestamp: val.u64_at(40),
        }
    }
}

impl From<&NtpPacket> for RawNtpPacket {
    #[allow(clippy::cast_sign_loss)]
    fn from(val: &NtpPacket) -> Self {
        let mut tmp_buf = [0u8; NTP_PACKET_SIZE];

        tmp_buf[0] = unshifter(val.leap, LI_MASK, LI_SHIFT)
            | unshifter(val.version, VERSION_MASK, VERSION_SHIFT)
            | unshifter(val.mode, MODE_MASK, MODE_SHIFT);
        tmp_buf[1] = val.stratum;
        tmp_buf[2] = val.poll as u8;
        tmp_buf[3] = val.precision as u8;
        tmp_buf[4..8].copy_from_slice(&val.root_delay.to_be_bytes());
        tmp_buf[8..12].copy_from_slice(&val.root_dispersion.to_be_bytes());
        tmp_buf[12..16].copy_from_slice(&val.ref_id.to_be_bytes());
        tmp_buf[16..24].copy_from_slice(&val.ref_timestamp.to_be_bytes());
        tmp_buf[24..32].copy_from_slice(&val.origin_timestamp.to_be_bytes());
        tmp_buf[32..40].copy_from_slice(&val.recv_timestamp.to_be_bytes());
        tmp_buf[40..48].copy_from_slice(&val.tx_timestamp.to_be_bytes());

        RawNtpPacket(tmp_buf)
    }
}

fn shifter(val: u8, mask: u8, shift: u8) -> u8 {
    (val & mask) >> shift
}

fn unshifter(val: u8, mask: u8, shift: u8) -> u8 {
    (val << shift) & mask
}
