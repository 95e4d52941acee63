//! Processors: per-record transformation steps chained between provider and
//! indexer.

use std::fmt;

use regex::Regex;
use tracing::debug;

use super::Holder;
use crate::error::{KbError, Result};

/// Registered id of the built-in [`RegexFilterProcessor`].
pub const REGEX_FILTER_PROCESSOR_ID: &str = "graphkb.processor.regex-filter";

/// A single transformation step over pipeline records.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, holder: &mut Holder) -> Result<()>;
}

/// Ordered processor pipeline for one slot. Short-circuits on the first
/// failing processor.
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorChain {
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self { processors }
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn run(&self, holder: &mut Holder) -> Result<()> {
        for processor in &self.processors {
            processor.run(holder)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProcessorChain").field(&self.names()).finish()
    }
}

/// Marks records non-sinkable when the configured payload field does not
/// match `pattern`. Options: `pattern` (required), `field` (default `label`).
#[derive(Debug)]
pub struct RegexFilterProcessor {
    field: String,
    pattern: Regex,
}

impl RegexFilterProcessor {
    pub fn from_options(options: &serde_json::Value) -> Result<Self> {
        let field = options
            .get("field")
            .and_then(|v| v.as_str())
            .unwrap_or("label")
            .to_string();
        let pattern = options
            .get("pattern")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                KbError::plugin(
                    REGEX_FILTER_PROCESSOR_ID,
                    "missing 'pattern' option".to_string(),
                )
            })?;
        let pattern =
            Regex::new(pattern).map_err(|e| KbError::plugin(REGEX_FILTER_PROCESSOR_ID, e))?;
        Ok(Self { field, pattern })
    }
}

impl Processor for RegexFilterProcessor {
    fn name(&self) -> &str {
        REGEX_FILTER_PROCESSOR_ID
    }

    fn run(&self, holder: &mut Holder) -> Result<()> {
        let matched = holder
            .payload
            .get(&self.field)
            .and_then(|v| v.as_str())
            .map(|s| self.pattern.is_match(s))
            .unwrap_or(false);
        if !matched {
            debug!(slot = %holder.slot, id = %holder.id, field = %self.field, "record filtered");
            holder.sinkable = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotId;
    use serde_json::json;

    fn holder(label: &str) -> Holder {
        Holder::new(SlotId::new("wiki", "entities"), json!({ "label": label }))
    }

    #[test]
    fn regex_filter_marks_non_matching_records() {
        let processor =
            RegexFilterProcessor::from_options(&json!({ "pattern": "^[A-Z]" })).unwrap();
        let mut keep = holder("Berlin");
        let mut drop = holder("berlin");
        processor.run(&mut keep).unwrap();
        processor.run(&mut drop).unwrap();
        assert!(keep.sinkable);
        assert!(!drop.sinkable);
    }

    #[test]
    fn regex_filter_requires_a_pattern() {
        let err = RegexFilterProcessor::from_options(&json!({ "field": "label" })).unwrap_err();
        assert!(matches!(err, KbError::PluginInstantiationFailed { .. }));
    }

    #[test]
    fn chain_runs_in_order_and_reports_names() {
        let a = RegexFilterProcessor::from_options(&json!({ "pattern": "." })).unwrap();
        let b = RegexFilterProcessor::from_options(&json!({ "pattern": "^B" })).unwrap();
        let chain = ProcessorChain::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.names(),
            vec![REGEX_FILTER_PROCESSOR_ID, REGEX_FILTER_PROCESSOR_ID]
        );
        let mut record = holder("Amsterdam");
        chain.run(&mut record).unwrap();
        assert!(!record.sinkable, "second filter requires a leading B");
    }
}
