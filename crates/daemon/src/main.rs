use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use common::prelude::PresharedKey;
use landrop_daemon::service_config::DEFAULT_KEY;
use landrop_daemon::ServiceConfig;

#[derive(Parser, Debug)]
#[command(name = "landrop")]
#[command(about = "Encrypted LAN file distribution daemon with subnet host discovery")]
struct Args {
    /// Port for the HTTP server
    #[arg(long, default_value_t = 5000)]
    listen_port: u16,

    /// Directory encrypted blobs are stored under
    #[arg(long, default_value = "uploads")]
    storage_root: PathBuf,

    /// Pre-shared AES-256 key in hex (64 chars); a compiled-in default is
    /// used if omitted. The active key is printed at startup either way.
    #[arg(long)]
    key: Option<String>,

    /// Seconds between subnet scan cycles
    #[arg(long, default_value_t = 10)]
    scan_interval_secs: u64,

    /// Port probed on candidate hosts (defaults to the listen port)
    #[arg(long)]
    probe_port: Option<u16>,

    /// Per-probe timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    probe_timeout_ms: u64,

    /// Upper bound on concurrently in-flight probes
    #[arg(long, default_value_t = 254)]
    probe_concurrency: usize,

    /// Local interface address to scan from; resolved automatically if
    /// omitted (may pick the wrong interface on multi-homed hosts)
    #[arg(long)]
    local_addr: Option<Ipv4Addr>,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Directory for log files (stdout only if not set)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let key = match args.key {
        Some(hex) => match PresharedKey::from_hex(&hex) {
            Ok(key) => key,
            Err(e) => {
                eprintln!("Error: invalid --key: {}", e);
                std::process::exit(1);
            }
        },
        None => PresharedKey::from(DEFAULT_KEY),
    };

    let config = ServiceConfig {
        listen_port: args.listen_port,
        storage_root: args.storage_root,
        key,
        scan_interval: Duration::from_secs(args.scan_interval_secs),
        probe_port: args.probe_port.unwrap_or(args.listen_port),
        probe_timeout: Duration::from_millis(args.probe_timeout_ms),
        probe_concurrency: args.probe_concurrency,
        local_addr: args.local_addr,
        log_level: args.log_level,
        log_dir: args.log_dir,
    };

    landrop_daemon::spawn_service(&config).await;
}
