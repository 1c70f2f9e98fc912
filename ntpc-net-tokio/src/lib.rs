//! Tokio async runtime network implementation for the [`ntpc`] NTP client library.
//!
//! This crate provides [`TokioNetwork`], resolving server names with
//! [`tokio::net::lookup_host`], and [`UdpSocketWrapper`] implementing the
//! [`NtpUdpSocket`] trait for [`tokio::net::UdpSocket`] with the receive timeout
//! driven by [`tokio::time::timeout`]. Both require a Tokio runtime with IO and
//! time drivers enabled.
//!
//! # Example
//!
//! ```ignore
//! use ntpc::{request, NtpContext, RequestOptions, StdTimestampGen};
//! use ntpc_net_tokio::TokioNetwork;
//!
//! #[tokio::main]
//! async fn main() {
//!     let context = NtpContext::new(StdTimestampGen::default());
//!     let options = RequestOptions::default();
//!
//!     match request("pool.ntp.org", &TokioNetwork, context, &options).await {
//!         Ok(stats) => println!("Offset: {:+.6} s", stats.offset()),
//!         Err(e) => eprintln!("Failed to get time: {e}"),
//!     }
//! }
//! ```
#![no_std]

extern crate alloc;

#[cfg(feature = "log")]
use log::error;

use ntpc::{AddressFamily, Error, NtpNetwork, NtpUdpSocket, Result};
use tokio::net::{UdpSocket, lookup_host};

use alloc::vec::Vec;
use core::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use core::time::Duration;

/// A wrapper around [`tokio::net::UdpSocket`] that implements [`NtpUdpSocket`].
///
/// # Example
///
/// ```no_run
/// use ntpc_net_tokio::UdpSocketWrapper;
/// use tokio::net::UdpSocket;
///
/// # async fn example() {
/// let socket = UdpSocket::bind("0.0.0.0:0").await.expect("Failed to bind socket");
/// let wrapper = UdpSocketWrapper::new(socket);
/// // Use wrapper with ntpc send_request/process_response functions
/// # }
/// ```
#[derive(Debug)]
pub struct UdpSocketWrapper {
    socket: UdpSocket,
}

impl UdpSocketWrapper {
    /// Creates a new `UdpSocketWrapper` from a [`tokio::net::UdpSocket`].
    #[must_use]
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket }
    }
}

impl From<UdpSocket> for UdpSocketWrapper {
    fn from(socket: UdpSocket) -> Self {
        UdpSocketWrapper::new(socket)
    }
}

impl NtpUdpSocket for UdpSocketWrapper {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
        self.socket.send_to(buf, addr).await.map_err(|_err| {
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
        match tokio::time::timeout(timeout, self.socket.recv_from(buf)).await {
            Ok(Ok(received)) => Ok(received),
            Ok(Err(_err)) => {
                #[cfg(feature = "log")]
                error!("Error receiving: {_err}");
                Err(Error::Network)
            }
            Err(_) => Err(Error::Timeout),
        }
    }
}

/// [`NtpNetwork`] implementation based on [`tokio::net`]
///
/// Every socket is bound to the unspecified address of the peer's family with an
/// ephemeral port.
#[derive(Debug, Default, Copy, Clone)]
pub struct TokioNetwork;

impl NtpNetwork for TokioNetwork {
    type Socket = UdpSocketWrapper;

    async fn resolve(
        &self,
        host: &str,
        port: u16,
        family: AddressFamily,
    ) -> Result<Vec<SocketAddr>> {
        let addrs = lookup_host((host, port)).await.map_err(|_err| {
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

        UdpSocket::bind(local)
            .await
            .map(UdpSocketWrapper::new)
            .map_err(|_err| {
                #[cfg(feature = "log")]
                error!("Unable to bind {local}: {_err}");
                Error::Network
            })
    }
}
