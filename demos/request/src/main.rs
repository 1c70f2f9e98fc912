//! Demonstrates how to make a single NTP request and print the server reply
//!
//! You can run the demo in the terminal:
//!
//! ```text
//! cargo run
//! ```
//!
//! That will query `pool.ntp.org` with the default settings. Options available:
//! - `-s`/`--server` - server host name (default: `pool.ntp.org`)
//! - `-p`/`--port` - server port (default: `123`)
//! - `-v`/`--ntp-version` - protocol version of the request (default: `3`)
//! - `-t`/`--timeout` - response timeout in seconds (default: `5`)
//! - `--ipv4`/`--ipv6` - use IPv4/IPv6 addresses only
//!
//! Add `--features log` to see the library debug output.
use ntpc::text::{leap_to_text, mode_to_text, ref_id_to_text, stratum_to_text};
use ntpc::{AddressFamily, NtpContext, NtpStats, RequestOptions, StdTimestampGen, sync::request};
use ntpc_net_std::StdNetwork;

use std::process::ExitCode;
use std::time::Duration;

use chrono::SecondsFormat;
use clap::Parser;

const POOL_NTP_ADDR: &str = "pool.ntp.org";

#[derive(Parser)]
#[command(name = "request")]
#[command(version)]
struct Cli {
    /// NTP server hostname
    #[arg(short, long, default_value = POOL_NTP_ADDR)]
    server: String,

    /// NTP server port
    #[arg(short, long, default_value_t = RequestOptions::DEFAULT_PORT)]
    port: u16,

    /// NTP version put into the request
    #[arg(short = 'v', long, default_value_t = RequestOptions::DEFAULT_VERSION)]
    ntp_version: u8,

    /// Response timeout in seconds
    #[arg(short, long, default_value_t = RequestOptions::DEFAULT_TIMEOUT.as_secs_f64())]
    timeout: f64,

    /// Use IPv4 addresses only
    #[arg(long, conflicts_with = "ipv6")]
    ipv4: bool,

    /// Use IPv6 addresses only
    #[arg(long)]
    ipv6: bool,
}

impl Cli {
    fn options(&self) -> RequestOptions {
        let family = if self.ipv4 {
            AddressFamily::Ipv4
        } else if self.ipv6 {
            AddressFamily::Ipv6
        } else {
            AddressFamily::Unspecified
        };

        RequestOptions::default()
            .with_port(self.port)
            .with_version(self.ntp_version)
            .with_address_family(family)
            .with_timeout(
                Duration::try_from_secs_f64(self.timeout).unwrap_or(RequestOptions::DEFAULT_TIMEOUT),
            )
    }
}

fn print_stats(server: &str, stats: &NtpStats) {
    let transmit = stats
        .tx_datetime()
        .map_or_else(|| "-".to_string(), |time| time.to_rfc3339_opts(SecondsFormat::Micros, true));

    println!("Server:          {server}");
    println!("Offset:          {:+.6} s", stats.offset());
    println!("Delay:           {:.6} s", stats.delay());
    println!("Version:         {}", stats.version());
    println!("Mode:            {}", mode_to_text(stats.mode()));
    println!("Transmit time:   {transmit}");
    println!("Leap:            {}", leap_to_text(stats.leap()));
    println!("Stratum:         {}", stratum_to_text(stats.stratum()));
    println!("Poll:            {} s", 2f64.powi(i32::from(stats.poll())));
    println!("Precision:       {:e} s", 2f64.powi(i32::from(stats.precision())));
    println!("Root delay:      {:.6} s", stats.root_delay());
    println!("Root dispersion: {:.6} s", stats.root_dispersion());
    println!("Reference:       {}", ref_id_to_text(stats.ref_id(), stats.stratum()));
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "log")]
    if cfg!(debug_assertions) {
        simple_logger::init_with_level(log::Level::Trace).unwrap();
    } else {
        simple_logger::init_with_level(log::Level::Info).unwrap();
    }

    let context = NtpContext::new(StdTimestampGen::default());

    match request(&cli.server, &StdNetwork, context, &cli.options()) {
        Ok(stats) => {
            print_stats(&cli.server, &stats);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Unable to get time from {}: {err}", cli.server);
            ExitCode::FAILURE
        }
    }
}
