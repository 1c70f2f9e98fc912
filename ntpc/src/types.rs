use core::future::Future;
use core::net::SocketAddr;
use core::time::Duration;

use std::time::SystemTime;

/// NTP library result type
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for NTP client
///
/// Errors originate in the timestamp codec, the packet codec or on the network layer.
/// Codec errors are not worth retrying, network errors and timeouts are.
#[derive(Debug, PartialEq, Copy, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The system time (seconds since UNIX EPOCH) cannot be placed into the
    /// current NTP era without ambiguity
    #[error("system time {0} cannot be represented in the current NTP era")]
    Rollover(f64),
    /// Payload is too short to hold an NTP header
    #[error("invalid NTP payload size: expected at least {expected} bytes, got {actual}")]
    IncorrectPayload {
        /// Minimal accepted payload size
        expected: usize,
        /// Size of the payload received
        actual: usize,
    },
    /// A NTP server address can not be resolved
    #[error("NTP server address can not be resolved")]
    AddressResolve,
    /// Network error occurred.
    #[error("network error")]
    Network,
    /// No response has been received within the configured timeout
    #[error("no response received within timeout")]
    Timeout,
}

/// A trait encapsulating timestamp generator's operations
///
/// Implement that trait on an object you want and provide proper system
/// timestamps for the NTP client. All timestamps are calculated from
/// UNIX EPOCH "_1970-01-01 00:00:00 UTC_"
pub trait NtpTimestampGenerator {
    /// Initialize timestamp generator state with `now` system time since UNIX EPOCH.
    /// Expected to be called every time before `timestamp_sec` and
    /// `timestamp_subsec_nanos` usage. Basic flow would be the following:
    ///
    /// ```text
    /// # Timestamp A required
    /// init()
    /// timestamp_sec()
    /// timestamp_subsec_nanos()
    /// // ...
    /// # Timestamp B required
    /// init()
    /// timestamp_sec()
    /// timestamp_subsec_nanos()
    /// // ... so on
    /// ```
    fn init(&mut self);

    /// Returns timestamp in seconds since UNIX EPOCH for the initialized generator
    fn timestamp_sec(&self) -> u64;

    /// Returns the fractional part of the timestamp in whole nanoseconds.
    /// That method **should not** return nanoseconds since UNIX EPOCH
    fn timestamp_subsec_nanos(&self) -> u32;

    /// Returns the initialized timestamp as floating point seconds since UNIX EPOCH
    #[allow(clippy::cast_precision_loss)]
    fn system_time(&self) -> f64 {
        self.timestamp_sec() as f64 + f64::from(self.timestamp_subsec_nanos()) / 1e9
    }
}

/// Standard library timestamp generator wrapper type
/// that relies on `std::time` to provide timestamps during NTP client operations
///
/// The generator reports unsigned seconds since UNIX EPOCH, so a system clock set
/// before 1970 is reported as the UNIX EPOCH itself.
#[derive(Copy, Clone, Default)]
pub struct StdTimestampGen {
    duration: Duration,
}

impl NtpTimestampGenerator for StdTimestampGen {
    fn init(&mut self) {
        self.duration = match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => duration,
            Err(_) => Duration::ZERO,
        };
    }

    fn timestamp_sec(&self) -> u64 {
        self.duration.as_secs()
    }

    fn timestamp_subsec_nanos(&self) -> u32 {
        self.duration.subsec_nanos()
    }
}

/// A trait encapsulating UDP socket interface required for NTP client operations
pub trait NtpUdpSocket {
    /// Send the given buffer to an address provided. On success, returns the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Will return `Err` if an underlying UDP send fails
    fn send_to(
        &self,
        buf: &[u8],
        addr: SocketAddr,
    ) -> impl Future<Output = Result<usize>>;

    /// Receives a single datagram message on the socket, waiting at most `timeout`.
    /// On success, returns the number of bytes read and the origin.
    ///
    /// The function will be called with valid byte array `buf` of sufficient size to
    /// hold the message bytes
    ///
    /// # Errors
    ///
    /// Will return [`Error::Timeout`] if nothing arrives in time and
    /// [`Error::Network`] if an underlying UDP receive fails
    fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> impl Future<Output = Result<(usize, SocketAddr)>>;
}

/// A trait encapsulating name resolution and socket creation
///
/// The client creates a fresh socket for every request through [`NtpNetwork::bind`]
/// and drops it once the request completes, whatever the outcome.
pub trait NtpNetwork {
    /// Socket type produced by [`NtpNetwork::bind`]
    type Socket: NtpUdpSocket;

    /// Resolve `host` into candidate server addresses with the given `port`.
    /// Only addresses of the requested `family` should be returned.
    ///
    /// # Errors
    ///
    /// Will return [`Error::AddressResolve`] if the name cannot be resolved
    fn resolve(
        &self,
        host: &str,
        port: u16,
        family: AddressFamily,
    ) -> impl Future<Output = Result<Vec<SocketAddr>>>;

    /// Create a socket able to reach `peer`
    ///
    /// # Errors
    ///
    /// Will return [`Error::Network`] if the socket cannot be created
    fn bind(&self, peer: SocketAddr) -> impl Future<Output = Result<Self::Socket>>;
}

/// Address family restriction applied during server name resolution
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum AddressFamily {
    /// Accept both IPv4 and IPv6 addresses
    #[default]
    Unspecified,
    /// Accept IPv4 addresses only
    Ipv4,
    /// Accept IPv6 addresses only
    Ipv6,
}

impl AddressFamily {
    /// Returns `true` if `addr` belongs to that family
    #[must_use]
    pub fn matches(self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Unspecified => true,
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

/// Per-request settings of [`crate::request`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// NTP server port
    pub port: u16,
    /// NTP protocol version put into the request
    pub version: u8,
    /// Address family used to pick candidate server addresses
    pub address_family: AddressFamily,
    /// Time to wait for the server response once the request is sent
    pub timeout: Duration,
}

impl RequestOptions {
    /// Well-known NTP port
    pub const DEFAULT_PORT: u16 = 123;
    /// Protocol version requested by default
    pub const DEFAULT_VERSION: u8 = 3;
    /// Default response timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_address_family(mut self, address_family: AddressFamily) -> Self {
        self.address_family = address_family;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            port: Self::DEFAULT_PORT,
            version: Self::DEFAULT_VERSION,
            address_family: AddressFamily::Unspecified,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// NTP client context that contains of objects that may be required for client's
/// operation
#[derive(Copy, Clone)]
pub struct NtpContext<T: NtpTimestampGenerator> {
    pub timestamp_gen: T,
}

impl<T: NtpTimestampGenerator + Copy> NtpContext<T> {
    /// Create NTP client context with the given timestamp generator
    pub fn new(timestamp_gen: T) -> Self {
        NtpContext { timestamp_gen }
    }
}

/// Preserve NTP request sending operation result required during receiving and processing
/// state
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SendRequestResult {
    pub(crate) orig_time: f64,
    pub(crate) version: u8,
}

impl SendRequestResult {
    /// System time put into the request transmit timestamp
    #[must_use]
    pub fn orig_time(&self) -> f64 {
        self.orig_time
    }

    /// Protocol version of the request
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }
}
