use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

/// Liveness probe for one candidate address
///
/// The contract is a single round-trip attempt with a short, bounded
/// timeout; no retries. False negatives under packet loss are expected and
/// acceptable, the next scan cycle picks the host up again.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, addr: Ipv4Addr) -> bool;
}

/// TCP connect probe
///
/// A host counts as reachable if it completes a TCP handshake on the probe
/// port within the timeout. Aimed at the service port of other landrop
/// instances, but any listening port works.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((addr, self.port))).await {
            Ok(Ok(_)) => {
                tracing::trace!(addr = %addr, "probe connected");
                true
            }
            Ok(Err(e)) => {
                tracing::trace!(addr = %addr, error = %e, "probe refused");
                false
            }
            Err(_) => {
                tracing::trace!(addr = %addr, "probe timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_probe_reachable_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(port, Duration::from_millis(500));
        assert!(probe.probe(Ipv4Addr::LOCALHOST).await);
    }

    #[tokio::test]
    async fn test_probe_unreachable_port() {
        // Bind then drop, so the port is known-free.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = TcpProbe::new(port, Duration::from_millis(500));
        assert!(!probe.probe(Ipv4Addr::LOCALHOST).await);
    }
}
