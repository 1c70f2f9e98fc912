//! Rust NTP client
//!
//! # Overview
//!
//! This crate provides a method for sending requests to NTP servers
//! and processing responses, computing the clock offset and the round-trip delay
//! of a single exchange. Requests are sent with the protocol version of choice
//! (`3` by default), replies of any
//! [NTP version](https://datatracker.ietf.org/doc/html/rfc5905) are accepted.
//!
//! # Usage
//!
//! Put this in your `Cargo.toml`:
//! ```cargo
//! [dependencies]
//! ntpc = "0.1"
//! ntpc-net-std = "0.1"
//! ```
//!
//! ## Features
//!
//! `ntpc` supports several features:
//! - `sync`: enables synchronous interface (enabled by default)
//! - `log`: enables library debug output during execution
//! - `chrono`: adds [`chrono::DateTime`] accessors to [`NtpStats`]
//!
//! # Details
//!
//! There are multiple approaches how the library can be used:
//! - [`request`] does the whole exchange: server name resolution, socket creation,
//!   request sending and response processing
//! - [`send_request`] and [`process_response`] can be used when a socket is managed by
//!   the application itself
//!
//! The library does not depend on any particular network stack. It is up to the
//! application to provide objects implementing the following traits:
//! - [`NtpNetwork`] resolves server names and creates sockets, one per request
//! - [`NtpUdpSocket`] sends and receives UDP datagrams
//! - [`NtpTimestampGenerator`] provides system time readings, [`StdTimestampGen`]
//!   is the ready to use implementation based on [`std::time::SystemTime`]
//!
//! Network implementations for `std` and `tokio` live in the `ntpc-net-std` and
//! `ntpc-net-tokio` crates.
//!
//! The client performs no retries and no reply validation: a lost reply ends up
//! with [`Error::Timeout`], and the originate timestamp echoed by the server is
//! reported as is through [`NtpStats::server_orig_time`].
//!
//! ## Logging support
//!
//! Library debug logs can be enabled in executables by enabling `log` feature. Server
//! addresses, response payload will be printed.
//!
//! # Example
//!
//! ```ignore
//! use ntpc::{NtpContext, RequestOptions, StdTimestampGen};
//! use ntpc_net_std::StdNetwork;
//!
//! let context = NtpContext::new(StdTimestampGen::default());
//! let options = RequestOptions::default();
//!
//! match ntpc::sync::request("pool.ntp.org", &StdNetwork, context, &options) {
//!     Ok(stats) => println!("{stats}"),
//!     Err(err) => eprintln!("Error: {err}"),
//! }
//! ```
mod log;
mod packet;
mod stats;
pub mod text;
pub mod timestamp;
mod types;

pub use crate::packet::{NtpPacket, NTP_PACKET_SIZE};
pub use crate::stats::NtpStats;
pub use crate::timestamp::{
    ntp_short_to_system, ntp_to_system_time, ntp_to_system_time_near,
    system_to_ntp_short, system_to_ntp_time, system_to_ntp_time_near,
};
pub use crate::types::*;

use core::time::Duration;
use std::time::Instant;

#[cfg(feature = "log")]
use crate::log::{debug, error};

/// Network types used by the `ntpc` crate
pub mod net {
    pub use core::net::SocketAddr;
}

/// Receive buffer size, leaves room for extension fields after the header
const RESPONSE_BUFFER_SIZE: usize = 256;

/// Sends a request to an NTP server and processes its response.
///
/// This asynchronous function performs the complete NTP flow:
/// - resolves `host` through `network`, keeping addresses of the requested family
/// - for every candidate address in resolution order, creates a socket and sends
///   the request; the first candidate the request is sent to wins
/// - waits for the response at most `options.timeout` and computes offset and delay
///
/// The socket is dropped once the call completes, whatever the outcome.
///
/// # Arguments
///
/// * `host` - NTP server host name or IP address, without a port
/// * `network` - an object implementing [`NtpNetwork`] trait
/// * `context` - NTP context holding the [`NtpTimestampGenerator`] used to stamp
///   the request transmit time and the response receive time
/// * `options` - port, version, address family and timeout of the request
///
/// # Errors
///
/// This function returns an `Err` in any of the following cases:
/// * [`Error::AddressResolve`] - the host cannot be resolved to an address of the
///   requested family
/// * [`Error::Network`] - no socket can be created or the request cannot be sent
///   to any of the candidates, or the receive fails
/// * [`Error::Timeout`] - no response within `options.timeout`
/// * [`Error::IncorrectPayload`] - the response is too short
/// * [`Error::Rollover`] - the current time cannot be encoded into the request
pub async fn request<N, T>(
    host: &str,
    network: &N,
    context: NtpContext<T>,
    options: &RequestOptions,
) -> Result<NtpStats>
where
    N: NtpNetwork,
    T: NtpTimestampGenerator + Copy,
{
    #[cfg(feature = "log")]
    debug!("request - Host: {host}, {options:?}");

    let candidates: Vec<_> = network
        .resolve(host, options.port, options.address_family)
        .await?
        .into_iter()
        .filter(|addr| options.address_family.matches(addr))
        .collect();

    if candidates.is_empty() {
        return Err(Error::AddressResolve);
    }

    for dest in candidates {
        let socket = match network.bind(dest).await {
            Ok(socket) => socket,
            Err(_err) => {
                #[cfg(feature = "log")]
                error!("Unable to create socket for {dest}: {_err}");
                continue;
            }
        };

        let sent = match send_request(dest, &socket, context, options.version)
            .await
        {
            Ok(sent) => sent,
            Err(err @ Error::Rollover(_)) => return Err(err),
            Err(_err) => {
                #[cfg(feature = "log")]
                error!("Unable to send request to {dest}: {_err}");
                continue;
            }
        };

        return process_response(dest, &socket, context, sent, options.timeout)
            .await;
    }

    Err(Error::Network)
}

/// Sends an NTP request to an NTP server.
///
/// The request carries mode `client`, the given `version` and the current
/// system time as the transmit timestamp. Every other field is zero.
///
/// The system time is taken right before the request is encoded, the same value is
/// returned in [`SendRequestResult::orig_time`] and used as the originate time in
/// the final [`NtpStats`].
///
/// # Arguments
///
/// * `dest` - the socket address of the NTP server
/// * `socket` - a reference to an object implementing the [`NtpUdpSocket`] trait
/// * `context` - NTP context with a timestamp generator
/// * `version` - protocol version put into the request
///
/// # Errors
///
/// Returns `Err` if:
/// * the current time cannot be encoded ([`Error::Rollover`])
/// * the request fails to be sent or is sent partially ([`Error::Network`])
pub async fn send_request<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
    version: u8,
) -> Result<SendRequestResult>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    #[cfg(feature = "log")]
    debug!("send request - Address: {dest:?}");

    context.timestamp_gen.init();
    let orig_time = context.timestamp_gen.system_time();
    let request = NtpPacket::client_request(version, system_to_ntp_time(orig_time)?);
    let buf = request.encode();

    match socket.send_to(&buf, dest).await {
        Ok(size) if size == buf.len() => Ok(SendRequestResult { orig_time, version }),
        _ => Err(Error::Network),
    }
}

/// Waits for the response from an NTP server and processes it.
///
/// Datagrams coming from an IP address other than the one of `dest` are discarded,
/// waiting continues until the `timeout` measured from the call start expires.
/// The response receive time is taken right after an acceptable datagram arrives.
///
/// # Arguments
///
/// * `dest` - the socket address of the NTP server the request was sent to
/// * `socket` - the socket the request was sent through
/// * `context` - NTP context with a timestamp generator
/// * `send_req_result` - the result of [`send_request`]
/// * `timeout` - time to wait for the response
///
/// # Errors
///
/// This function returns an `Err` in any of the following situations:
/// * [`Error::Timeout`] - no response from the server within `timeout`
/// * [`Error::Network`] - the underlying receive fails
/// * [`Error::IncorrectPayload`] - the response is shorter than the NTP header
pub async fn process_response<U, T>(
    dest: net::SocketAddr,
    socket: &U,
    mut context: NtpContext<T>,
    send_req_result: SendRequestResult,
    timeout: Duration,
) -> Result<NtpStats>
where
    U: NtpUdpSocket,
    T: NtpTimestampGenerator,
{
    // no deadline at all if the timeout does not fit the clock range
    let deadline = Instant::now().checked_add(timeout);
    let mut response_buf = [0u8; RESPONSE_BUFFER_SIZE];

    loop {
        let remaining = deadline.map_or(timeout, |deadline| {
            deadline.saturating_duration_since(Instant::now())
        });

        if remaining.is_zero() {
            return Err(Error::Timeout);
        }

        let (response, src) = socket.recv_from(&mut response_buf, remaining).await?;

        if src.ip() != dest.ip() {
            #[cfg(feature = "log")]
            debug!("Discarded {response} bytes from unexpected source {src}");
            continue;
        }

        context.timestamp_gen.init();
        let dest_time = context.timestamp_gen.system_time();
        #[cfg(feature = "log")]
        debug!("Response: {response}");

        let packet = NtpPacket::decode(&response_buf[..response.min(RESPONSE_BUFFER_SIZE)])?;
        #[cfg(feature = "log")]
        debug_ntp_packet(&packet, dest_time);

        let stats = NtpStats::new(packet, send_req_result.orig_time, dest_time);
        #[cfg(feature = "log")]
        debug!("Roundtrip delay: {} s. Offset: {} s", stats.delay(), stats.offset());

        return Ok(stats);
    }
}

/// Synchronous interface for the NTP client
#[cfg(feature = "sync")]
pub mod sync {
    use crate::net;
    use crate::types::{
        NtpContext, NtpNetwork, NtpTimestampGenerator, NtpUdpSocket,
        RequestOptions, Result, SendRequestResult,
    };
    use crate::NtpStats;

    use core::time::Duration;
    use miniloop::executor::Executor;

    #[cfg(feature = "log")]
    use crate::log::debug;

    /// Send request to a NTP server with the given host name and process the response
    /// in a single call
    ///
    /// That is a synchronous wrapper for [`crate::request`]. It uses an executor
    /// to block the current thread while waiting for the underlying asynchronous
    /// operation to complete, so the network implementation is expected to complete
    /// its futures without an external reactor.
    ///
    /// # Errors
    ///
    /// Same as [`crate::request`]
    pub fn request<N, T>(
        host: &str,
        network: &N,
        context: NtpContext<T>,
        options: &RequestOptions,
    ) -> Result<NtpStats>
    where
        N: NtpNetwork,
        T: NtpTimestampGenerator + Copy,
    {
        let result =
            Executor::<1>::new().block_on(crate::request(host, network, context, options));
        #[cfg(feature = "log")]
        debug!("{result:?}");

        result
    }

    /// Send an NTP request to the specified destination synchronously.
    ///
    /// This function is a synchronous wrapper for the asynchronous [`crate::send_request`].
    ///
    /// # Errors
    ///
    /// Same as [`crate::send_request`]
    pub fn send_request<U, T>(
        dest: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
        version: u8,
    ) -> Result<SendRequestResult>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new().block_on(crate::send_request(dest, socket, context, version))
    }

    /// Processes the response from an NTP server and calculates the offset and
    /// round-trip delay synchronously.
    ///
    /// This is a synchronous wrapper for the asynchronous [`crate::process_response`].
    ///
    /// # Errors
    ///
    /// Same as [`crate::process_response`]
    pub fn process_response<U, T>(
        dest: net::SocketAddr,
        socket: &U,
        context: NtpContext<T>,
        send_req_result: SendRequestResult,
        timeout: Duration,
    ) -> Result<NtpStats>
    where
        U: NtpUdpSocket,
        T: NtpTimestampGenerator + Copy,
    {
        Executor::<1>::new().block_on(crate::process_response(
            dest,
            socket,
            context,
            send_req_result,
            timeout,
        ))
    }
}

#[cfg(feature = "log")]
fn debug_ntp_packet(packet: &NtpPacket, dest_time: f64) {
    let delimiter = "=".repeat(64);
    let time = |timestamp: u64| ntp_to_system_time_near(timestamp, dest_time);

    debug!("{delimiter}");
    debug!("| Mode:\t\t{}", packet.mode);
    debug!("| Version:\t{}", packet.version);
    debug!("| Leap:\t\t{}", packet.leap);
    debug!("| Stratum:\t{}", packet.stratum);
    debug!("| Poll:\t\t{}", packet.poll);
    debug!("| Precision:\t\t{}", packet.precision);
    debug!("| Root delay:\t\t{}", ntp_short_to_system(packet.root_delay));
    debug!(
        "| Root dispersion:\t{}",
        ntp_short_to_system(packet.root_dispersion)
    );
    debug!(
        "| Reference ID:\t\t{}",
        text::ref_id_to_text(packet.ref_id, packet.stratum)
    );
    debug!(
        "| Origin timestamp    (client):\t{:>20.6}",
        time(packet.origin_timestamp)
    );
    debug!(
        "| Receive timestamp   (server):\t{:>20.6}",
        time(packet.recv_timestamp)
    );
    debug!(
        "| Transmit timestamp  (server):\t{:>20.6}",
        time(packet.tx_timestamp)
    );
    debug!("| Receive timestamp   (client):\t{dest_time:>20.6}");
    debug!(
        "| Reference timestamp (server):\t{:>20.6}",
        time(packet.ref_timestamp)
    );
    debug!("{delimiter}");
}

#[cfg(test)]
mod ntpc_client_tests {
    use super::*;
    use crate::net::SocketAddr;

    use core::cell::{Cell, RefCell};
    use miniloop::executor::Executor;
    use std::collections::VecDeque;
    use std::net::IpAddr;
    use std::rc::Rc;

    const BASE: u64 = 1_700_000_000;
    const SERVER: &str = "192.0.2.10:123";

    enum Reply {
        Datagram(SocketAddr, Vec<u8>),
        Timeout,
        Failure,
    }

    #[derive(Default)]
    struct NetworkState {
        replies: VecDeque<Reply>,
        sent: Vec<(SocketAddr, Vec<u8>)>,
        open_sockets: usize,
    }

    struct FakeSocket {
        state: Rc<RefCell<NetworkState>>,
    }

    impl Drop for FakeSocket {
        fn drop(&mut self) {
            self.state.borrow_mut().open_sockets -= 1;
        }
    }

    impl NtpUdpSocket for FakeSocket {
        async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> Result<usize> {
            self.state.borrow_mut().sent.push((addr, buf.to_vec()));
            Ok(buf.len())
        }

        async fn recv_from(
            &self,
            buf: &mut [u8],
            _timeout: Duration,
        ) -> Result<(usize, SocketAddr)> {
            match self.state.borrow_mut().replies.pop_front() {
                Some(Reply::Datagram(src, data)) => {
                    let size = data.len().min(buf.len());
                    buf[..size].copy_from_slice(&data[..size]);
                    Ok((size, src))
                }
                Some(Reply::Failure) => Err(Error::Network),
                Some(Reply::Timeout) | None => Err(Error::Timeout),
            }
        }
    }

    #[derive(Default)]
    struct FakeNetwork {
        addrs: Vec<IpAddr>,
        unbindable: Vec<IpAddr>,
        state: Rc<RefCell<NetworkState>>,
    }

    impl FakeNetwork {
        fn new(addrs: &[&str], replies: Vec<Reply>) -> Self {
            let network = FakeNetwork {
                addrs: addrs.iter().map(|a| a.parse().unwrap()).collect(),
                ..FakeNetwork::default()
            };
            network.state.borrow_mut().replies = replies.into();

            network
        }

        fn sent(&self) -> Vec<(SocketAddr, Vec<u8>)> {
            self.state.borrow().sent.clone()
        }

        fn open_sockets(&self) -> usize {
            self.state.borrow().open_sockets
        }

        fn pending_replies(&self) -> usize {
            self.state.borrow().replies.len()
        }
    }

    impl NtpNetwork for FakeNetwork {
        type Socket = FakeSocket;

        // every address is returned whatever the family, filtering is up to the client
        async fn resolve(
            &self,
            _host: &str,
            port: u16,
            _family: AddressFamily,
        ) -> Result<Vec<SocketAddr>> {
            Ok(self
                .addrs
                .iter()
                .map(|ip| SocketAddr::new(*ip, port))
                .collect())
        }

        async fn bind(&self, peer: SocketAddr) -> Result<FakeSocket> {
            if self.unbindable.contains(&peer.ip()) {
                return Err(Error::Network);
            }

            self.state.borrow_mut().open_sockets += 1;
            Ok(FakeSocket {
                state: Rc::clone(&self.state),
            })
        }
    }

    /// Clock advancing by 250 ms on every reading
    #[derive(Copy, Clone)]
    struct StepClock<'a> {
        base: u64,
        ticks: &'a Cell<u64>,
        now: Duration,
    }

    impl<'a> StepClock<'a> {
        fn new(base: u64, ticks: &'a Cell<u64>) -> Self {
            StepClock {
                base,
                ticks,
                now: Duration::ZERO,
            }
        }
    }

    impl NtpTimestampGenerator for StepClock<'_> {
        fn init(&mut self) {
            let tick = self.ticks.get();

            self.ticks.set(tick + 1);
            self.now = Duration::from_secs(self.base) + Duration::from_millis(250 * tick);
        }

        fn timestamp_sec(&self) -> u64 {
            self.now.as_secs()
        }

        fn timestamp_subsec_nanos(&self) -> u32 {
            self.now.subsec_nanos()
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn base() -> f64 {
        BASE as f64
    }

    fn server_reply(recv_time: f64, tx_time: f64) -> Vec<u8> {
        NtpPacket {
            version: 3,
            mode: NtpPacket::SERVER_MODE,
            stratum: 2,
            poll: 3,
            precision: -20,
            ref_id: 0xc0_00_02_01,
            ref_timestamp: system_to_ntp_time(base() - 64.0).unwrap(),
            origin_timestamp: system_to_ntp_time(base()).unwrap(),
            recv_timestamp: system_to_ntp_time(recv_time).unwrap(),
            tx_timestamp: system_to_ntp_time(tx_time).unwrap(),
            ..NtpPacket::default()
        }
        .encode()
        .to_vec()
    }

    fn server() -> SocketAddr {
        SERVER.parse().unwrap()
    }

    fn run<N: NtpNetwork>(
        network: &N,
        clock: StepClock<'_>,
        options: &RequestOptions,
    ) -> Result<NtpStats> {
        Executor::<1>::new().block_on(request(
            "ntp.example.com",
            network,
            NtpContext::new(clock),
            options,
        ))
    }

    #[test]
    fn test_request_offset_and_delay() {
        let ticks = Cell::new(0);
        let reply = server_reply(base() + 10.0625, base() + 10.125);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![Reply::Datagram(server(), reply)],
        );

        let stats =
            run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default()).unwrap();

        assert_eq!(base(), stats.orig_time());
        assert_eq!(base() + 0.25, stats.dest_time());
        assert_eq!(9.968_75, stats.offset());
        assert_eq!(0.1875, stats.delay());
        assert_eq!(2, stats.stratum());
        assert_eq!(NtpPacket::SERVER_MODE, stats.mode());
        assert_eq!(base() - 64.0, stats.ref_time());
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_request_packet_format() {
        for (version, first_byte) in [(3, 0x1b), (4, 0x23)] {
            let ticks = Cell::new(0);
            let reply = server_reply(base(), base());
            let network = FakeNetwork::new(
                &["192.0.2.10"],
                vec![Reply::Datagram(server(), reply)],
            );
            let options = RequestOptions::default().with_version(version);

            let stats = run(&network, StepClock::new(BASE, &ticks), &options).unwrap();
            let sent = network.sent();

            assert_eq!(1, sent.len());
            assert_eq!(server(), sent[0].0);

            let datagram = &sent[0].1;
            assert_eq!(NTP_PACKET_SIZE, datagram.len());
            assert_eq!(first_byte, datagram[0]);
            assert!(datagram[1..40].iter().all(|b| *b == 0));

            let request = NtpPacket::decode(datagram).unwrap();
            assert_eq!(system_to_ntp_time(base()).unwrap(), request.tx_timestamp);
            assert_eq!(stats.orig_time(), ntp_to_system_time(request.tx_timestamp));
        }
    }

    #[test]
    fn test_request_custom_port() {
        let ticks = Cell::new(0);
        let network = FakeNetwork::new(&["192.0.2.10"], vec![]);
        let options = RequestOptions::default().with_port(1123);

        let result = run(&network, StepClock::new(BASE, &ticks), &options);

        assert_eq!(Err(Error::Timeout), result);
        assert_eq!(1123, network.sent()[0].0.port());
    }

    #[test]
    fn test_timeout_is_not_retried() {
        let ticks = Cell::new(0);
        let reply = server_reply(base(), base());
        let network = FakeNetwork::new(
            &["192.0.2.10", "192.0.2.11"],
            vec![Reply::Timeout, Reply::Datagram(server(), reply)],
        );

        let result = run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default());

        assert_eq!(Err(Error::Timeout), result);
        assert_eq!(1, network.sent().len());
        assert_eq!(1, network.pending_replies());
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_receive_failure() {
        let ticks = Cell::new(0);
        let network = FakeNetwork::new(&["192.0.2.10"], vec![Reply::Failure]);

        let result = run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default());

        assert_eq!(Err(Error::Network), result);
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_zero_timeout() {
        let ticks = Cell::new(0);
        let reply = server_reply(base(), base());
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![Reply::Datagram(server(), reply)],
        );
        let options = RequestOptions::default().with_timeout(Duration::ZERO);

        let result = run(&network, StepClock::new(BASE, &ticks), &options);

        assert_eq!(Err(Error::Timeout), result);
        assert_eq!(1, network.pending_replies());
    }

    #[test]
    fn test_datagram_from_other_source_is_discarded() {
        let ticks = Cell::new(0);
        let stray = server_reply(base() + 500.0, base() + 500.0);
        let reply = server_reply(base() + 10.0625, base() + 10.125);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![
                Reply::Datagram("198.51.100.7:123".parse().unwrap(), stray),
                Reply::Datagram("192.0.2.10:50123".parse().unwrap(), reply),
            ],
        );

        let stats =
            run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default()).unwrap();

        // the stray datagram does not consume a clock reading
        assert_eq!(base() + 0.25, stats.dest_time());
        assert_eq!(9.968_75, stats.offset());
        assert_eq!(0, network.pending_replies());
    }

    #[test]
    fn test_next_candidate_when_bind_fails() {
        let ticks = Cell::new(0);
        let second: SocketAddr = "192.0.2.11:123".parse().unwrap();
        let reply = server_reply(base(), base());
        let mut network = FakeNetwork::new(
            &["192.0.2.10", "192.0.2.11"],
            vec![Reply::Datagram(second, reply)],
        );
        network.unbindable.push("192.0.2.10".parse().unwrap());

        let result = run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default());

        assert!(result.is_ok());
        assert_eq!(vec![second], network.sent().iter().map(|s| s.0).collect::<Vec<_>>());
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_all_candidates_fail() {
        let ticks = Cell::new(0);
        let mut network = FakeNetwork::new(&["192.0.2.10", "192.0.2.11"], vec![]);
        network.unbindable = network.addrs.clone();

        let result = run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default());

        assert_eq!(Err(Error::Network), result);
        assert!(network.sent().is_empty());
    }

    #[test]
    fn test_address_resolution() {
        let ticks = Cell::new(0);
        let network = FakeNetwork::new(&[], vec![]);

        assert_eq!(
            Err(Error::AddressResolve),
            run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default())
        );

        let network = FakeNetwork::new(&["192.0.2.10"], vec![]);
        let options = RequestOptions::default().with_address_family(AddressFamily::Ipv6);

        assert_eq!(
            Err(Error::AddressResolve),
            run(&network, StepClock::new(BASE, &ticks), &options)
        );
        assert!(network.sent().is_empty());
    }

    #[test]
    fn test_address_family_selects_candidate() {
        let ticks = Cell::new(0);
        let v6: SocketAddr = "[2001:db8::10]:123".parse().unwrap();
        let reply = server_reply(base(), base());
        let network = FakeNetwork::new(
            &["192.0.2.10", "2001:db8::10"],
            vec![Reply::Datagram(v6, reply)],
        );
        let options = RequestOptions::default().with_address_family(AddressFamily::Ipv6);

        assert!(run(&network, StepClock::new(BASE, &ticks), &options).is_ok());
        assert_eq!(v6, network.sent()[0].0);
    }

    #[test]
    fn test_truncated_response() {
        let ticks = Cell::new(0);
        let mut reply = server_reply(base(), base());
        reply.truncate(20);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![Reply::Datagram(server(), reply)],
        );

        let result = run(&network, StepClock::new(BASE, &ticks), &RequestOptions::default());

        assert_eq!(
            Err(Error::IncorrectPayload {
                expected: NTP_PACKET_SIZE,
                actual: 20
            }),
            result
        );
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_rollover_is_reported_without_sending() {
        let ticks = Cell::new(0);
        // 2036-02-07 12:00:00 UTC
        let clock = StepClock::new(2_085_998_400, &ticks);
        let network = FakeNetwork::new(&["192.0.2.10", "192.0.2.11"], vec![]);

        let result = run(&network, clock, &RequestOptions::default());

        assert!(matches!(result, Err(Error::Rollover(_))));
        assert!(network.sent().is_empty());
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_sequential_requests_are_ordered() {
        let ticks = Cell::new(0);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![
                Reply::Datagram(server(), server_reply(base(), base())),
                Reply::Datagram(server(), server_reply(base(), base())),
            ],
        );
        let options = RequestOptions::default();

        let first = run(&network, StepClock::new(BASE, &ticks), &options).unwrap();
        let second = run(&network, StepClock::new(BASE, &ticks), &options).unwrap();

        assert!(first.orig_time() < first.dest_time());
        assert!(second.orig_time() > first.orig_time());
        assert!(second.dest_time() > first.dest_time());
    }

    #[test]
    fn test_split_send_and_process() {
        let ticks = Cell::new(0);
        let reply = server_reply(base() + 10.0625, base() + 10.125);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![Reply::Datagram(server(), reply)],
        );
        let context = NtpContext::new(StepClock::new(BASE, &ticks));
        let mut executor = Executor::<1>::new();

        let stats = executor.block_on(async {
            let socket = network.bind(server()).await?;
            let sent = send_request(server(), &socket, context, 4).await?;

            assert_eq!(base(), sent.orig_time());
            assert_eq!(4, sent.version());

            process_response(server(), &socket, context, sent, Duration::from_secs(1)).await
        });

        assert_eq!(9.968_75, stats.unwrap().offset());
        assert_eq!(0x23, network.sent()[0].1[0]);
        assert_eq!(0, network.open_sockets());
    }

    #[test]
    fn test_partial_send_is_network_error() {
        struct ShortSocket;

        impl NtpUdpSocket for ShortSocket {
            async fn send_to(&self, buf: &[u8], _addr: SocketAddr) -> Result<usize> {
                Ok(buf.len() - 1)
            }

            async fn recv_from(
                &self,
                _buf: &mut [u8],
                _timeout: Duration,
            ) -> Result<(usize, SocketAddr)> {
                Err(Error::Timeout)
            }
        }

        let ticks = Cell::new(0);
        let context = NtpContext::new(StepClock::new(BASE, &ticks));
        let result =
            Executor::<1>::new().block_on(send_request(server(), &ShortSocket, context, 3));

        assert_eq!(Err(Error::Network), result);
    }

    #[cfg(feature = "sync")]
    #[test]
    fn test_sync_request() {
        let ticks = Cell::new(0);
        let reply = server_reply(base() + 10.0625, base() + 10.125);
        let network = FakeNetwork::new(
            &["192.0.2.10"],
            vec![Reply::Datagram(server(), reply)],
        );
        let context = NtpContext::new(StepClock::new(BASE, &ticks));

        let stats =
            sync::request("ntp.example.com", &network, context, &RequestOptions::default())
                .unwrap();

        assert_eq!(0.1875, stats.delay());
        assert_eq!(0, network.open_sockets());
    }
}
