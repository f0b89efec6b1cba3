//! Per-request download authorization
//!
//! Every download is checked statelessly against the current registry
//! contents; prior decisions are never cached.

use crate::registry::{FileRecord, FileRegistry};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("no file registered under storage name {0}")]
    NotFound(String),
    #[error("recipient mismatch for storage name {0}")]
    Forbidden(String),
}

/// Authorizes retrieval requests against the registry + requester address
#[derive(Debug, Clone)]
pub struct AccessGate {
    registry: FileRegistry,
}

impl AccessGate {
    pub fn new(registry: FileRegistry) -> Self {
        Self { registry }
    }

    /// Permit iff a record exists for `storage_name` and its recipient is
    /// either the requester's address or Everyone.
    pub fn authorize(
        &self,
        storage_name: &str,
        requester_addr: &str,
    ) -> Result<FileRecord, AccessError> {
        let record = self
            .registry
            .find_by_storage_name(storage_name)
            .ok_or_else(|| AccessError::NotFound(storage_name.to_string()))?;

        if !record.recipient.visible_to(requester_addr) {
            return Err(AccessError::Forbidden(storage_name.to_string()));
        }

        Ok(record)
    }
}
