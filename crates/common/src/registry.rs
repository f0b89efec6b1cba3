//! In-memory file registry
//!
//! The catalog of every file uploaded during this process's lifetime.
//! Records are appended on upload and never mutated or deleted; the
//! registry is memory-resident only and does not survive a restart.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Wire form of the broadcast recipient
pub const EVERYONE: &str = "Everyone";

/// Who may see and download a file
///
/// Parsed from the user-supplied recipient string: the literal sentinel
/// `"Everyone"` marks a file as visible to any requester, anything else is
/// treated as a specific network address. The format is never validated;
/// a garbage recipient simply matches no requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recipient {
    Everyone,
    Addr(String),
}

impl Recipient {
    /// Whether a file addressed to this recipient is visible to `addr`
    pub fn visible_to(&self, addr: &str) -> bool {
        match self {
            Recipient::Everyone => true,
            Recipient::Addr(a) => a == addr,
        }
    }
}

impl From<String> for Recipient {
    fn from(s: String) -> Self {
        if s == EVERYONE {
            Recipient::Everyone
        } else {
            Recipient::Addr(s)
        }
    }
}

impl From<&str> for Recipient {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}

impl From<Recipient> for String {
    fn from(r: Recipient) -> Self {
        match r {
            Recipient::Everyone => EVERYONE.to_string(),
            Recipient::Addr(a) => a,
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::Everyone => f.write_str(EVERYONE),
            Recipient::Addr(a) => f.write_str(a),
        }
    }
}

/// Metadata for one uploaded file
///
/// `original_name` is user-supplied and not sanitized; it may collide with
/// other uploads or contain path-unsafe characters. `storage_name` is
/// server-generated, carries a random suffix, and is the only retrieval key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub original_name: String,
    pub storage_name: String,
    pub sender: String,
    pub recipient: Recipient,
}

/// Clone-shareable handle to the in-memory registry
///
/// Shared between concurrent upload/list/download handlers; the lock keeps
/// concurrent appends and reads from corrupting the underlying sequence.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    inner: Arc<RwLock<Vec<FileRecord>>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; never rejects (no dedup, no recipient validation)
    pub fn register(&self, record: FileRecord) {
        self.inner.write().push(record);
    }

    /// All records visible to `addr`, in insertion order
    pub fn list_visible_to(&self, addr: &str) -> Vec<FileRecord> {
        self.inner
            .read()
            .iter()
            .filter(|r| r.recipient.visible_to(addr))
            .cloned()
            .collect()
    }

    /// Look up a record by its storage name
    pub fn find_by_storage_name(&self, name: &str) -> Option<FileRecord> {
        self.inner
            .read()
            .iter()
            .find(|r| r.storage_name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
