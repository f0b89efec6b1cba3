/**
 * Access control for download requests.
 *  Checks a storage name + requester address
 *  against the registry, per request, statelessly.
 */
pub mod access;
/**
 * Cryptographic types and operations.
 *  - Pre-shared symmetric key
 *  - AES-256-CBC encryption with a fresh IV per file
 */
pub mod crypto;
/**
 * In-memory catalog of uploaded files.
 *  Maps server-generated storage names to
 *  sender/recipient metadata.
 */
pub mod registry;
/**
 * LAN host discovery.
 *  Probes every candidate address in the local /24
 *  concurrently and publishes one immutable snapshot
 *  of live hosts per scan cycle.
 */
pub mod scanner;
/**
 * Encrypted blob storage.
 *  Light wrapper around the filesystem that encrypts
 *  on write and hands back raw ciphertext on read.
 */
pub mod store;

pub mod prelude {
    pub use crate::access::{AccessError, AccessGate};
    pub use crate::crypto::{CryptoError, PresharedKey};
    pub use crate::registry::{FileRecord, FileRegistry, Recipient};
    pub use crate::scanner::{Probe, ScanError, ScannerConfig, SubnetScanner, TcpProbe};
    pub use crate::store::{CipherStore, FileInfo, StoreError, StoredFile};
}
