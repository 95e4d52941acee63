//! Index backend contract: pluggable construction of per-slot indexers and
//! searchers.
//!
//! A backend is resolved once at registry construction from
//! `index-store.factory.class` and invoked during `initialize()` for every
//! enabled slot. Returning `Ok(None)` for one side leaves the slot partially
//! provisioned, which is logged but not fatal.

use crate::data::Holder;
use crate::error::Result;
use crate::model::{Entity, SlotId};
use crate::registry::CoreRef;

/// Writes records into a slot's index.
pub trait Indexer: Send + Sync + std::fmt::Debug {
    fn start(&self);

    fn stop(&self) -> Result<()>;

    fn index(&self, holder: &Holder) -> Result<()>;

    fn flush(&self) -> Result<()>;
}

/// Reads a slot's index, resolving terms to labeled entities.
pub trait Searcher: Send + Sync {
    fn start(&self);

    fn stop(&self) -> Result<()>;

    fn search(&self, term: &str) -> Result<Vec<Entity>>;
}

/// Constructs the indexer/searcher pair for a slot.
///
/// Implementations receive a [`CoreRef`] capability handle and must use it,
/// not the registry's public accessors, to reach shared resources such as
/// the slot's storage directory: construction runs while the registry holds
/// its lifecycle guard.
pub trait IndexBackend: Send + Sync {
    fn create_indexer(&self, slot: &SlotId, core: CoreRef<'_>) -> Result<Option<Box<dyn Indexer>>>;

    fn create_searcher(&self, slot: &SlotId, core: CoreRef<'_>)
        -> Result<Option<Box<dyn Searcher>>>;
}
