use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use common::prelude::{PresharedKey, ScannerConfig};

/// Compiled-in pre-shared key, used when no `--key` is supplied.
///
/// The daemon prints the active key in hex at startup so the operator can
/// hand it to clients out-of-band.
pub const DEFAULT_KEY: [u8; 32] = *b"ThisIsASecretKey1234567890123456";

#[derive(Debug)]
pub struct Config {
    // http server configuration
    /// Port for the HTTP server; doubles as the default probe target port,
    /// since the hosts worth discovering run the same service.
    pub listen_port: u16,

    // storage configuration
    /// Directory encrypted blobs are written under
    pub storage_root: PathBuf,
    /// Pre-shared AES-256 key all files are encrypted with
    pub key: PresharedKey,

    // discovery configuration
    /// Sleep between subnet scan cycles
    pub scan_interval: Duration,
    /// Port probed on candidate hosts (defaults to `listen_port`)
    pub probe_port: u16,
    /// Per-probe timeout
    pub probe_timeout: Duration,
    /// Upper bound on concurrently in-flight probes
    pub probe_concurrency: usize,
    /// Explicit local interface address; resolved automatically if unset
    pub local_addr: Option<Ipv4Addr>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            interval: self.scan_interval,
            probe_port: self.probe_port,
            probe_timeout: self.probe_timeout,
            max_concurrent: self.probe_concurrency,
            local_addr: self.local_addr,
        }
    }
}
