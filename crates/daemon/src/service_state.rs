use common::prelude::{AccessGate, CipherStore, FileRegistry, StoreError, SubnetScanner};

use crate::service_config::Config;

/// Main service state - wires the registry, cipher store, access gate and
/// scanner together for the HTTP handlers
#[derive(Clone)]
pub struct State {
    registry: FileRegistry,
    store: CipherStore,
    gate: AccessGate,
    scanner: SubnetScanner,
}

impl State {
    pub fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup the encrypted store (creates the storage root)
        let store = CipherStore::new(&config.storage_root, config.key.clone())?;
        tracing::info!(root = %config.storage_root.display(), "storage root ready");

        // The key is distributed to clients out-of-band; this is the
        // operator's copy.
        tracing::info!(key = %config.key.to_hex(), "pre-shared key (share with clients)");

        // 2. Setup the registry and the gate that reads it
        let registry = FileRegistry::new();
        let gate = AccessGate::new(registry.clone());

        // 3. Setup the scanner; `process` spawns its run loop
        let scanner = SubnetScanner::new(config.scanner_config());

        Ok(Self {
            registry,
            store,
            gate,
            scanner,
        })
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn store(&self) -> &CipherStore {
        &self.store
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn scanner(&self) -> &SubnetScanner {
        &self.scanner
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("storage setup error: {0}")]
    Store(#[from] StoreError),
}
