use std::net::{Ipv4Addr, SocketAddr};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{PingReport, Prober};

const PING_WAIT_SECS: &str = "1";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

static LOSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)% packet loss").expect("loss pattern"));

/// Probes with the system `ping` binary and plain TCP connects.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProber;

impl SystemProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for SystemProber {
    async fn ping(&self, address: Ipv4Addr, count: u8) -> PingReport {
        // One second per reply plus slack, in case ping itself hangs.
        let limit: Duration = Duration::from_secs(u64::from(count) * 2 + 2);
        let run = Command::new("ping")
            .args(["-c", &count.to_string(), "-W", PING_WAIT_SECS])
            .arg(address.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(limit, run).await {
            Ok(Ok(output)) if output.status.success() => PingReport {
                reachable: true,
                loss: parse_loss(&String::from_utf8_lossy(&output.stdout)),
            },
            Ok(Ok(_)) => PingReport::unreachable(),
            Ok(Err(e)) => {
                debug!("ping {address} could not run: {e}");
                PingReport::unreachable()
            }
            Err(_elapsed) => {
                debug!("ping {address} timed out");
                PingReport::unreachable()
            }
        }
    }

    async fn port_open(&self, address: Ipv4Addr, port: u16) -> bool {
        let socket_addr: SocketAddr = SocketAddr::from((address, port));
        matches!(
            timeout(CONNECT_TIMEOUT, TcpStream::connect(socket_addr)).await,
            Ok(Ok(_))
        )
    }
}

/// Packet loss from a ping summary, only when it is above zero.
pub fn parse_loss(summary: &str) -> Option<u8> {
    let captures = LOSS.captures(summary)?;
    let percent: f64 = captures[1].parse().ok()?;
    let rounded: u8 = percent.round().clamp(0.0, 100.0) as u8;
    (rounded > 0).then_some(rounded)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_loss_should_read_ping_summary() {
        let summary: &str = "4 packets transmitted, 3 received, 25% packet loss, time 3004ms";
        assert_eq!(parse_loss(summary), Some(25));
        assert_eq!(parse_loss("4 packets transmitted, 4 received, 0% packet loss"), None);
        assert_eq!(parse_loss("3 packets transmitted, 2 received, 33.3333% packet loss"), Some(33));
        assert_eq!(parse_loss("ping: unknown host"), None);
    }

    #[tokio::test]
    async fn port_check_should_see_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port: u16 = listener.local_addr().unwrap().port();

        assert!(SystemProber.port_open(Ipv4Addr::LOCALHOST, port).await);
    }

    #[tokio::test]
    #[ignore]
    async fn ping_should_reach_loopback() {
        let report: PingReport = SystemProber.ping(Ipv4Addr::LOCALHOST, 1).await;
        assert!(report.reachable);
        assert_eq!(report.loss, None);
    }

    #[tokio::test]
    #[ignore]
    async fn port_check_should_time_out_on_unroutable_address() {
        assert!(!SystemProber.port_open(Ipv4Addr::new(203, 0, 113, 1), 443).await);
    }
}
