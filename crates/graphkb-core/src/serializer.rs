//! Model-aware (de)serialization seam for slot payloads.
//!
//! Binds a slot to its model class so callers encode and decode payloads
//! against the right domain type. The mapping from content type to model
//! class is the closed [`BuiltInModel`] set.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::model::{BuiltInModel, SlotId};

#[derive(Debug)]
pub struct ObjectSerializer {
    slot: SlotId,
    model: BuiltInModel,
}

impl ObjectSerializer {
    /// Fails with an unknown-model error when the slot's content type names
    /// no built-in model class.
    pub fn for_slot(slot: &SlotId) -> Result<Self> {
        let model = BuiltInModel::for_id(slot.content_type())?;
        Ok(Self {
            slot: slot.clone(),
            model,
        })
    }

    pub fn slot(&self) -> &SlotId {
        &self.slot
    }

    pub fn model(&self) -> BuiltInModel {
        self.model
    }

    pub fn encode<T: Serialize>(&self, value: &T) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(value)?)
    }

    pub fn decode<T: DeserializeOwned>(&self, value: serde_json::Value) -> Result<T> {
        Ok(serde_json::from_value(value)?)
    }
}
