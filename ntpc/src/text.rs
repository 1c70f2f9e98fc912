//! Human readable names of NTP header field values
//!
//! Unknown values never fail, they map to a generic label instead.
use std::net::Ipv4Addr;

/// Known reference identifiers of stratum 0 and 1 servers
const REF_ID_TABLE: &[(&[u8; 4], &str)] = &[
    (b"GOES", "Geostationary Orbit Environment Satellite"),
    (b"GPS\0", "Global Position System"),
    (b"GAL\0", "Galileo Positioning System"),
    (b"PPS\0", "Generic pulse-per-second"),
    (b"IRIG", "Inter-Range Instrumentation Group"),
    (b"WWVB", "LF Radio WWVB Ft. Collins, CO 60 kHz"),
    (b"DCF\0", "LF Radio DCF77 Mainflingen, DE 77.5 kHz"),
    (b"HBG\0", "LF Radio HBG Prangins, HB 75 kHz"),
    (b"MSF\0", "LF Radio MSF Anthorn, UK 60 kHz"),
    (b"JJY\0", "LF Radio JJY Fukushima, JP 40 kHz, Saga, JP 60 kHz"),
    (b"LORC", "MF Radio LORAN C station, 100 kHz"),
    (b"TDF\0", "MF Radio Allouis, FR 162 kHz"),
    (b"CHU\0", "HF Radio CHU Ottawa, Ontario"),
    (b"WWV\0", "HF Radio WWV Ft. Collins, CO"),
    (b"WWVH", "HF Radio WWVH Kauai, HI"),
    (b"NIST", "NIST telephone modem"),
    (b"ACTS", "NIST telephone modem"),
    (b"USNO", "USNO telephone modem"),
    (b"PTB\0", "European telephone modem"),
    (b"LOCL", "uncalibrated local clock"),
    (b"CESM", "calibrated Cesium clock"),
    (b"RBDM", "calibrated Rubidium clock"),
    (b"DCN\0", "DCN routing protocol"),
    (b"TSP\0", "TSP time protocol"),
    (b"DTS\0", "Digital Time Service"),
    (b"ATOM", "Atomic clock (calibrated)"),
    (b"VLF\0", "VLF radio (OMEGA,, etc.)"),
    (b"1PPS", "External 1 PPS input"),
    (b"FREE", "(Internal clock)"),
    (b"INIT", "(Initialization)"),
    (b"\0\0\0\0", "NULL"),
];

/// Leap indicator description
#[must_use]
pub fn leap_to_text(leap: u8) -> &'static str {
    match leap {
        0 => "no warning",
        1 => "last minute of the day has 61 seconds",
        2 => "last minute of the day has 59 seconds",
        3 => "unknown (clock unsynchronized)",
        _ => "invalid leap indicator",
    }
}

/// Association mode description
#[must_use]
pub fn mode_to_text(mode: u8) -> &'static str {
    match mode {
        0 => "reserved",
        1 => "symmetric active",
        2 => "symmetric passive",
        3 => "client",
        4 => "server",
        5 => "broadcast",
        6 => "reserved for NTP control messages",
        7 => "reserved for private use",
        _ => "invalid mode",
    }
}

/// Stratum description, e.g. `secondary reference (2)`
#[must_use]
pub fn stratum_to_text(stratum: u8) -> String {
    let label = match stratum {
        0 => "unspecified or invalid",
        1 => "primary reference",
        2..=15 => "secondary reference",
        16 => "unsynchronized",
        _ => "reserved",
    };

    format!("{label} ({stratum})")
}

/// Reference identifier description
///
/// For stratum 0 and 1 the identifier is a four character source code, otherwise it
/// is the IPv4 address of the upstream server.
#[must_use]
pub fn ref_id_to_text(ref_id: u32, stratum: u8) -> String {
    let code = ref_id.to_be_bytes();

    if stratum > 1 {
        return Ipv4Addr::from(code).to_string();
    }

    match REF_ID_TABLE.iter().find(|(id, _)| **id == code) {
        Some((_, name)) => (*name).to_string(),
        None => {
            let printable: String = code
                .iter()
                .take_while(|b| **b != 0)
                .map(|b| char::from(*b))
                .collect();

            format!("Unidentified reference source '{printable}'")
        }
    }
}
