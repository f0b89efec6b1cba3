//! LAN host discovery
//!
//! A long-lived background task probes every candidate address in the
//! local /24 once per interval and publishes the set of responders as one
//! immutable snapshot. Readers always see either the previous cycle's
//! complete set or the new one, never a partially-filled collection.

mod probe;

pub use probe::{Probe, TcpProbe};

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use tokio::sync::watch;

/// Host suffixes probed each cycle: .1 through .254
const SUFFIX_RANGE: std::ops::RangeInclusive<u8> = 1..=254;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("could not resolve local address: {0}")]
    LocalAddr(#[from] local_ip_address::Error),
    #[error("local address {0} is not IPv4")]
    NotIpv4(IpAddr),
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Sleep between scan cycles
    pub interval: Duration,
    /// Port the TCP probe targets
    pub probe_port: u16,
    /// Per-probe timeout; the whole fan-out costs roughly one of these
    pub probe_timeout: Duration,
    /// Upper bound on in-flight probes. At 254 or above every candidate
    /// probes in parallel; a lower bound trades scan latency for fewer
    /// open sockets.
    pub max_concurrent: usize,
    /// Explicit local address override. Hostname resolution on a
    /// multi-homed box can land on a loopback or VPN interface, so the
    /// interface choice stays configurable instead of guessed.
    pub local_addr: Option<Ipv4Addr>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            probe_port: 5000,
            probe_timeout: Duration::from_millis(100),
            max_concurrent: 254,
            local_addr: None,
        }
    }
}

/// Background subnet scanner with a readable snapshot of live hosts
///
/// Cheap to clone; all clones share the same published snapshot. The
/// scanner task is the sole writer, request handlers only read.
#[derive(Clone)]
pub struct SubnetScanner {
    hosts: Arc<RwLock<Arc<Vec<Ipv4Addr>>>>,
    probe: Arc<dyn Probe>,
    config: ScannerConfig,
}

impl SubnetScanner {
    pub fn new(config: ScannerConfig) -> Self {
        let probe = Arc::new(TcpProbe::new(config.probe_port, config.probe_timeout));
        Self::with_probe(config, probe)
    }

    /// Build with a custom probe implementation (used by tests)
    pub fn with_probe(config: ScannerConfig, probe: Arc<dyn Probe>) -> Self {
        Self {
            hosts: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            probe,
            config,
        }
    }

    /// The most recently published discovery snapshot
    ///
    /// Empty until the first cycle completes. The returned set is
    /// immutable; the next cycle replaces it wholesale.
    pub fn current_hosts(&self) -> Arc<Vec<Ipv4Addr>> {
        self.hosts.read().clone()
    }

    /// Run scan cycles until the shutdown signal fires
    ///
    /// A failed cycle is logged and retried on the next tick; the loop
    /// itself never terminates except through `shutdown_rx`.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            probe_port = self.config.probe_port,
            "subnet scanner started"
        );

        let mut interval = tokio::time::interval(self.config.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    tracing::info!("subnet scanner stopped");
                    break;
                }
                _ = interval.tick() => {
                    match self.scan_once().await {
                        Ok(count) => {
                            tracing::debug!(live_hosts = count, "scan cycle complete");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "scan cycle failed, retrying next interval");
                        }
                    }
                }
            }
        }
    }

    /// One full scan cycle: probe the subnet and publish a new snapshot
    pub async fn scan_once(&self) -> Result<usize, ScanError> {
        let local = self.local_addr()?;
        let [a, b, c, own_suffix] = local.octets();

        let candidates = SUFFIX_RANGE
            .filter(move |&i| i != own_suffix)
            .map(move |i| Ipv4Addr::new(a, b, c, i));

        let mut live: Vec<Ipv4Addr> = stream::iter(candidates)
            .map(|addr| {
                let probe = self.probe.clone();
                async move { (addr, probe.probe(addr).await) }
            })
            .buffer_unordered(self.config.max_concurrent.max(1))
            .filter_map(|(addr, up)| async move { up.then_some(addr) })
            .collect()
            .await;

        // Stable output regardless of probe completion order.
        live.sort();

        let count = live.len();
        *self.hosts.write() = Arc::new(live);
        Ok(count)
    }

    fn local_addr(&self) -> Result<Ipv4Addr, ScanError> {
        if let Some(addr) = self.config.local_addr {
            return Ok(addr);
        }
        match local_ip_address::local_ip()? {
            IpAddr::V4(v4) => Ok(v4),
            other => Err(ScanError::NotIpv4(other)),
        }
    }
}
