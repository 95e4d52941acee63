//! Per-repository ingestion driver: provider → processor chain → indexer.

use std::sync::Weak;

use tracing::info;

use crate::error::{KbError, Result};
use crate::model::SlotId;
use crate::registry::KbRegistry;

/// Outcome counters of one bulk load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Records that reached the indexer.
    pub sunk: usize,
    /// Records a processor filtered out.
    pub filtered: usize,
}

/// Drives bulk ingestion for one repository's slots. Cached per repository by
/// the registry; holds the registry weakly to avoid a reference cycle.
pub struct KbLoader {
    core: Weak<KbRegistry>,
    repository: String,
}

impl KbLoader {
    pub(crate) fn new(core: Weak<KbRegistry>, repository: String) -> Self {
        Self { core, repository }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Drains the slot's data provider through its processor chain into its
    /// indexer, flushing the indexer at the end.
    pub fn load_all(&self, content_type: &str) -> Result<LoadReport> {
        let core = self.core.upgrade().ok_or(KbError::NotInitialized)?;
        let slot = SlotId::new(self.repository.clone(), content_type);
        let indexer = core.get_indexer(&slot)?;
        let chain = core.create_processor_chain(&slot)?;
        let provider = core.create_data_provider(&slot)?;

        let mut report = LoadReport::default();
        for mut holder in provider {
            if let Some(chain) = &chain {
                chain.run(&mut holder)?;
            }
            if holder.sinkable {
                indexer.index(&holder)?;
                report.sunk += 1;
            } else {
                report.filtered += 1;
            }
        }
        indexer.flush()?;
        info!(slot = %slot, sunk = report.sunk, filtered = report.filtered, "bulk load finished");
        Ok(report)
    }
}
