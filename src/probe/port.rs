//! Loopback port reachability: UDP first, TCP as a fallback.
//!
//! A UDP server that ignores unknown datagrams never answers the probe, so a
//! healthy UDP-only game server usually reports closed here. The process check
//! is the authoritative signal in that case.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use log::debug;
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

use crate::status::{PortCheckResult, ProbeProtocol};

const UDP_PROBE_PAYLOAD: &[u8] = b"serverwatch-ping";
const UDP_RECV_BUFFER: usize = 512;

/// Per-probe time budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub udp: Duration,
    pub tcp: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            udp: Duration::from_secs(1),
            tcp: Duration::from_secs(2),
        }
    }
}

/// Check whether `port` on loopback answers over UDP, falling back to TCP.
///
/// Never fails: every socket error or timeout counts as closed.
pub async fn check_port(port: u16, timeouts: ProbeTimeouts) -> PortCheckResult {
    let target = SocketAddr::from((Ipv4Addr::LOCALHOST, port));

    let udp = probe_udp(target, timeouts.udp).await;
    if udp.is_open {
        return udp;
    }

    probe_tcp(target, timeouts.tcp).await
}

async fn probe_udp(target: SocketAddr, budget: Duration) -> PortCheckResult {
    let started = Instant::now();
    let is_open = match udp_round_trip(target, budget).await {
        Ok(bytes) => {
            debug!("UDP probe to {target} got {bytes} byte reply");
            true
        }
        Err(reason) => {
            debug!("UDP probe to {target} closed: {reason}");
            false
        }
    };

    PortCheckResult {
        is_open,
        response_time_ms: elapsed_ms(started),
        protocol: ProbeProtocol::Udp,
    }
}

async fn udp_round_trip(target: SocketAddr, budget: Duration) -> Result<usize, String> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .map_err(|e| format!("bind failed: {e}"))?;
    socket
        .connect(target)
        .await
        .map_err(|e| format!("connect failed: {e}"))?;
    socket
        .send(UDP_PROBE_PAYLOAD)
        .await
        .map_err(|e| format!("send failed: {e}"))?;

    let mut buf = [0u8; UDP_RECV_BUFFER];
    match timeout(budget, socket.recv(&mut buf)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(format!("receive failed: {e}")),
        Err(_) => Err(format!("no reply within {budget:?}")),
    }
}

async fn probe_tcp(target: SocketAddr, budget: Duration) -> PortCheckResult {
    let started = Instant::now();
    let is_open = match timeout(budget, TcpStream::connect(target)).await {
        Ok(Ok(_stream)) => {
            debug!("TCP probe to {target} connected");
            true
        }
        Ok(Err(e)) => {
            debug!("TCP probe to {target} failed: {e}");
            false
        }
        Err(_) => {
            debug!("TCP probe to {target} timed out after {budget:?}");
            false
        }
    };

    PortCheckResult {
        is_open,
        response_time_ms: elapsed_ms(started),
        protocol: ProbeProtocol::Tcp,
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    async fn free_port() -> u16 {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind ephemeral port");
        listener.local_addr().expect("local addr").port()
    }

    #[tokio::test]
    async fn udp_reply_means_open() {
        let server = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind udp server");
        let port = server.local_addr().expect("local addr").port();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            if let Ok((n, peer)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(&buf[..n], peer).await;
            }
        });

        let result = check_port(port, ProbeTimeouts::default()).await;
        assert!(result.is_open);
        assert_eq!(result.protocol, ProbeProtocol::Udp);
    }

    #[tokio::test]
    async fn tcp_listener_is_found_through_fallback() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind tcp listener");
        let port = listener.local_addr().expect("local addr").port();

        let result = check_port(port, ProbeTimeouts::default()).await;
        assert!(result.is_open);
        assert_eq!(result.protocol, ProbeProtocol::Tcp);
    }

    #[tokio::test]
    async fn silent_udp_listener_counts_as_closed() {
        let silent = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind udp socket");
        let port = silent.local_addr().expect("local addr").port();
        let timeouts = ProbeTimeouts {
            udp: Duration::from_millis(100),
            tcp: Duration::from_millis(200),
        };

        let result = check_port(port, timeouts).await;
        assert!(!result.is_open);
        assert_eq!(result.protocol, ProbeProtocol::Tcp);
    }

    #[tokio::test]
    async fn unreachable_port_resolves_within_budget() {
        let port = free_port().await;
        let started = Instant::now();

        let result = check_port(port, ProbeTimeouts::default()).await;

        assert!(!result.is_open);
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
