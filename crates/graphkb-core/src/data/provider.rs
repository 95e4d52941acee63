//! Data providers: named, ordered sources of pipeline records for one slot.

use super::Holder;
use crate::error::Result;
use crate::model::SlotId;

/// A named stream of records destined for one slot's index.
pub struct DataProvider {
    name: String,
    iter: Box<dyn Iterator<Item = Holder> + Send>,
}

impl DataProvider {
    pub fn new(
        name: impl Into<String>,
        iter: impl Iterator<Item = Holder> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            iter: Box::new(iter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Iterator for DataProvider {
    type Item = Holder;

    fn next(&mut self) -> Option<Holder> {
        self.iter.next()
    }
}

impl std::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Constructs a [`DataProvider`] for a slot.
///
/// Implementations are registered in the plugin registry under the identifier
/// named by the slot's `provider.class` configuration key.
pub trait DataProviderFactory: Send + Sync {
    fn create(&self, slot: &SlotId) -> Result<DataProvider>;
}
