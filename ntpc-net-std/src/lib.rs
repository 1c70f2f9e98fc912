//! Standard library network implementation for the [`ntpc`] NTP client library.
//!
//! This crate provides [`StdNetwork`], resolving server names with
//! [`std::net::ToSocketAddrs`] and creating a [`std::net::UdpSocket`] per request,
//! and [`UdpSocketWrapper`] implementing the [`NtpUdpSocket`] trait on top of
//! a blocking socket.
//!
//! All the futures returned by these types complete without ever being pending, so
//! they are meant for the `ntpc::sync` interface or any simple executor.
//!
//! # Example
//!
//! ```ignore
//! use ntpc::{sync::request, NtpContext, RequestOptions, StdTimestampGen};
//! use ntpc_net_std::StdNetwork;
//!
//! let context = NtpContext::new(StdTimestampGen::default());
//! let options = RequestOptions::default().with_timeout(std::time::Duration::from_secs(2));
//!
//! match request("pool.ntp.org", &StdNetwork, context, &options) {
//!     Ok(stats) => println!("Offset: {:+.6} s", stats.offset()),
//!     Err(e) => eprintln!("Failed to get time: {e}"),
//! }
//! ```

#[cfg(feature = "log")]
use log::error;

use ntpc::{AddressFamily, Error, NtpNetwork, NtpUdpSocket, Result};

use std::io::ErrorKind;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Smallest read timeout passed to the OS, zero means "block forever" for `std`
const MIN_READ_TIMEOUT: Duration = Duration::from_micros(1);

/// A wrapper around [`std::net::UdpSocket`] that implements [`NtpUdpSocket`].
///
/// The receive timeout is applied through [`UdpSocket::set_read_timeout`] before
/// every receive.
///
/// # Example
///
/// ```no_run
/// use ntpc_net_std::UdpSocketWrapper;
/// use std::net::UdpSocket;
///
/// let socket = UdpSocket::bind("0.0.0.0:0").expect("Failed to bind socket");
/// let wrapper = UdpSocketWrapper::new(socket);
/// // Use wrapper with ntpc send_request/process_response functions
/// ```
#[derive(Debug)]
pub struct UdpSocketWrapper {
    socket: UdpSocket,
}

impl UdpSocketWrapper {
    /// Creates a new `UdpSocketWrapper` from a [`std::net::UdpSocket`].
    #[must_use]
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket }
    }

    /// Returns the local address the socket is bound to
    ///
    /// # Errors
    ///
    /// Will return [`Error::Network`] if the address cannot be queried
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|_| Error::Network)
    }
}

impl From<UdpSocket> for UdpSocketWrapper {
    fn from(socket: UdpSocket) -> Self {
        UdpSocketWrapper::new(socket)
    }
}

impl NtpUdpSocket for UdpSocketWrapper {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
        self.socket.send_to(buf, addr).map_err(|_err| {
            #[cfg(feature = "log")]
            error!("Error while sending to {addr}: {_err}");
            Error::Network
        })
    }

    async fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<(usize, SocketAddr)> {
        self.socket
            .set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT)))
            .map_err(|_err| {
                #[cfg(feature = "log")]
                error!("Unable to set read timeout: {_err}");
                Error::Network
            })?;

        self.socket.recv_from(buf).map_err(|err| match err.kind() {
            // Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
            ErrorKind::WouldBlock | ErrorKind::TimedOut => Error::Timeout,
            _ => {
                #[cfg(feature = "log")]
                error!("Error receiving: {err}");
                Error::Network
            }
        })
    }
}

/// [`NtpNetwork`] implementation based on [`std::net`]
///
/// Every socket is bound to the unspecified address of the peer's family with an
/// ephemeral port.
#[derive(Debug, Default, Copy, Clone)]
pub struct StdNetwork;

impl NtpNetwork for StdNetwork {
    type Socket = UdpSocketWrapper;

    async fn resolve(
        &self,
        host: &str,
        port: u16,
        family: AddressFamily,
    ) -> Result<Vec<SocketAddr>> {
        let addrs = (host, port).to_socket_addrs().map_err(|_err| {
            #[cfg(feature = "log")]
            error!("Unable to resolve {host}: {_err}");
            Error::AddressResolve
        })?;

        Ok(addrs.filter(|addr| family.matches(addr)).collect())
    }

    async fn bind(&self, peer: SocketAddr) -> Result<UdpSocketWrapper> {
        let local = match peer {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };

        UdpSocket::bind(local).map(UdpSocketWrapper::new).map_err(|_err| {
            #[cfg(feature = "log")]
            error!("Unable to bind {local}: {_err}");
            Error::Network
        })
    }
}
