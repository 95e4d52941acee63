//! graphkb-memstore: index backend over the slot's own storage directory.
//!
//! Indexes record payloads straight into the slot directory the core hands
//! out and serves case-insensitive label searches from it. Meant for
//! development setups and tests; production deployments plug a real engine
//! in through the same traits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use graphkb_core::{
    CoreRef, DataProvider, DataProviderFactory, Entity, Holder, IndexBackend, Indexer, KbRegistry,
    Result, Searcher, SlotId,
};

/// Identifier the backend registers under (`index-store.factory.class`).
pub const MEMSTORE_BACKEND_ID: &str = "graphkb.backend.memstore";

/// Identifier of the fixture provider factory (`provider.class`).
pub const FIXTURE_PROVIDER_ID: &str = "graphkb.provider.fixture";

/// Backend constructing indexer/searcher pairs over the slot directory.
#[derive(Debug, Default)]
pub struct MemstoreBackend;

impl MemstoreBackend {
    pub fn new() -> Self {
        Self
    }
}

impl IndexBackend for MemstoreBackend {
    fn create_indexer(&self, slot: &SlotId, core: CoreRef<'_>) -> Result<Option<Box<dyn Indexer>>> {
        let db = core.directory(slot)?;
        Ok(Some(Box::new(MemstoreIndexer {
            slot: slot.clone(),
            db,
            running: AtomicBool::new(false),
        })))
    }

    fn create_searcher(
        &self,
        slot: &SlotId,
        core: CoreRef<'_>,
    ) -> Result<Option<Box<dyn Searcher>>> {
        let db = core.directory(slot)?;
        Ok(Some(Box::new(MemstoreSearcher {
            slot: slot.clone(),
            db,
            running: AtomicBool::new(false),
        })))
    }
}

#[derive(Debug)]
struct MemstoreIndexer {
    slot: SlotId,
    db: Arc<sled::Db>,
    running: AtomicBool,
}

impl Indexer for MemstoreIndexer {
    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!(slot = %self.slot, "memstore indexer started");
    }

    fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        self.db.flush()?;
        info!(slot = %self.slot, "memstore indexer stopped");
        Ok(())
    }

    fn index(&self, holder: &Holder) -> Result<()> {
        let bytes = serde_json::to_vec(&holder.payload)?;
        self.db.insert(holder.id.as_bytes(), bytes)?;
        debug!(slot = %self.slot, id = %holder.id, "record indexed");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

struct MemstoreSearcher {
    slot: SlotId,
    db: Arc<sled::Db>,
    running: AtomicBool,
}

impl Searcher for MemstoreSearcher {
    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!(slot = %self.slot, "memstore searcher started");
    }

    fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        info!(slot = %self.slot, "memstore searcher stopped");
        Ok(())
    }

    fn search(&self, term: &str) -> Result<Vec<Entity>> {
        let needle = term.to_lowercase();
        let mut hits = Vec::new();
        for item in self.db.iter() {
            let (_key, value) = item?;
            let payload: serde_json::Value = serde_json::from_slice(&value)?;
            let label = payload
                .get("label")
                .and_then(|l| l.as_str())
                .unwrap_or_default();
            if label.to_lowercase().contains(&needle) {
                let iri = payload.get("iri").and_then(|i| i.as_str()).unwrap_or(label);
                hits.push(Entity::new(iri, label));
            }
        }
        hits.sort_by(|a, b| a.iri.cmp(&b.iri));
        Ok(hits)
    }
}

/// Internal provider factory yielding the JSON records configured under the
/// slot's `provider.records` key. Receives the registry handle so it can read
/// the configuration view.
pub struct FixtureProviderFactory {
    core: Arc<KbRegistry>,
}

impl FixtureProviderFactory {
    /// Constructor shaped for `ProviderCtor::Internal` registration.
    pub fn boxed(core: Arc<KbRegistry>) -> Box<dyn DataProviderFactory> {
        Box::new(Self { core })
    }
}

impl DataProviderFactory for FixtureProviderFactory {
    fn create(&self, slot: &SlotId) -> Result<DataProvider> {
        let key = format!("{}.provider.records", slot.type_path());
        let records = self.core.settings().json_array(&key)?;
        let slot = slot.clone();
        let iter = records
            .into_iter()
            .map(move |payload| Holder::new(slot.clone(), payload));
        Ok(DataProvider::new("fixture", iter))
    }
}
