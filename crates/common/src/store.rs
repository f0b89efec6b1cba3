//! Encrypted blob storage
//!
//! One file per upload under a single storage root, named
//! `<original-name>_<8-hex-random-suffix>.enc`. Writes go through the
//! pre-shared key (`iv || ciphertext` layout); reads hand back the raw
//! ciphertext untouched, since decryption is the recipient's job.
//!
//! There is no deletion path: blobs accumulate for the life of the
//! process, matching the registry. An upload that crashes between the
//! encrypt pass and registration leaves an orphaned blob behind; that is
//! a known gap, not an error.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::PresharedKey;

/// Length of the random hex suffix in a storage name
const SUFFIX_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of storing one encrypted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Server-generated unique name, the sole download key
    pub storage_name: String,
    /// Where the encrypted blob landed on disk
    pub path: PathBuf,
}

/// Filesystem metadata for one stored blob, as served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub created: f64,
    pub modified: f64,
    pub accessed: f64,
    pub created_fmt: String,
    pub modified_fmt: String,
    pub size_fmt: String,
}

/// Encrypts uploads under the pre-shared key and persists them
#[derive(Debug, Clone)]
pub struct CipherStore {
    root: PathBuf,
    key: PresharedKey,
}

impl CipherStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>, key: PresharedKey) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, key })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key(&self) -> &PresharedKey {
        &self.key
    }

    /// Encrypt the plaintext at `plaintext_path` into the store
    ///
    /// Reads the full plaintext into memory, encrypts it under the
    /// pre-shared key with a fresh IV, and writes `iv || ciphertext` under
    /// a newly generated storage name. The source file is left in place;
    /// removing it is the caller's responsibility.
    pub async fn encrypt_to_store(
        &self,
        plaintext_path: &Path,
        original_name: &str,
    ) -> Result<StoredFile, StoreError> {
        let plaintext = tokio::fs::read(plaintext_path).await?;
        let encrypted = self.key.encrypt(&plaintext);

        let storage_name = generate_storage_name(original_name);
        let path = self.root.join(&storage_name);
        tokio::fs::write(&path, &encrypted).await?;

        tracing::debug!(
            storage_name = %storage_name,
            plaintext_bytes = plaintext.len(),
            stored_bytes = encrypted.len(),
            "stored encrypted file"
        );

        Ok(StoredFile { storage_name, path })
    }

    /// Raw encrypted bytes for a stored blob (no decryption server-side)
    pub async fn read_raw(&self, storage_name: &str) -> Result<Vec<u8>, StoreError> {
        Ok(tokio::fs::read(self.root.join(storage_name)).await?)
    }

    /// Stat a stored blob for listing enrichment
    pub async fn file_info(&self, storage_name: &str) -> Result<FileInfo, StoreError> {
        let meta = tokio::fs::metadata(self.root.join(storage_name)).await?;

        let modified = meta.modified()?;
        // Creation time is not available on every filesystem.
        let created = meta.created().unwrap_or(modified);
        let accessed = meta.accessed().unwrap_or(modified);

        Ok(FileInfo {
            name: storage_name.to_string(),
            size: meta.len(),
            created: unix_secs(created),
            modified: unix_secs(modified),
            accessed: unix_secs(accessed),
            created_fmt: format_timestamp(created),
            modified_fmt: format_timestamp(modified),
            size_fmt: format_file_size(meta.len()),
        })
    }
}

/// `<original-name>_<8-hex-random>.enc`
///
/// Unique with overwhelming probability, not guaranteed; the original name
/// is carried verbatim, collisions land on different suffixes.
fn generate_storage_name(original_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}.enc", original_name, &suffix[..SUFFIX_LEN])
}

fn unix_secs(t: SystemTime) -> f64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

fn format_timestamp(t: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(t)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Humanized byte count, e.g. `2.4 MB`
pub fn format_file_size(size: u64) -> String {
    let mut size = size as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PB", size)
}
