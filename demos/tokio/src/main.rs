//! Queries several public NTP servers one after another on a Tokio runtime
use ntpc::{NtpContext, RequestOptions, StdTimestampGen, request};
use ntpc_net_tokio::TokioNetwork;

use core::time::Duration;

const SERVERS: [&str; 3] = ["pool.ntp.org", "time.google.com", "time.cloudflare.com"];

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let options = RequestOptions::default().with_timeout(Duration::from_secs(2));

    for server in SERVERS {
        let context = NtpContext::new(StdTimestampGen::default());

        match request(server, &TokioNetwork, context, &options).await {
            Ok(stats) => println!("{server}: {stats}"),
            Err(err) => println!("{server}: ERROR {err}"),
        }
    }
}
