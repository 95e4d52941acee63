//! Data ingestion pipeline: record envelopes, providers, and processors.

mod processor;
mod provider;

pub use processor::{Processor, ProcessorChain, RegexFilterProcessor, REGEX_FILTER_PROCESSOR_ID};
pub use provider::{DataProvider, DataProviderFactory};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::SlotId;

/// One record travelling through the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holder {
    pub id: Uuid,
    pub slot: SlotId,
    pub payload: serde_json::Value,
    /// Cleared by a processor to filter the record out; non-sinkable holders
    /// never reach the indexer.
    pub sinkable: bool,
    pub created_at: DateTime<Utc>,
}

impl Holder {
    pub fn new(slot: SlotId, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            slot,
            payload,
            sinkable: true,
            created_at: Utc::now(),
        }
    }
}
