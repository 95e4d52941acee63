//! Startup-time plugin registry.
//!
//! Maps configuration identifier strings to constructors for index backends,
//! data-provider factories, processors, and entity recognizers. The embedding
//! application registers everything before constructing the resource registry;
//! there is no run-time discovery. Lookups of unregistered identifiers fail
//! with the plugin's identifier and cause attached.

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{DataProviderFactory, Processor, RegexFilterProcessor, REGEX_FILTER_PROCESSOR_ID};
use crate::error::{KbError, Result};
use crate::index::IndexBackend;
use crate::model::Language;
use crate::ner::{EntityRecognizer, TermRecognizer, TERM_RECOGNIZER_ID};
use crate::registry::{CoreRef, KbRegistry};

/// How a data-provider factory is constructed: internal factories receive the
/// registry handle; external ones must build from nothing.
pub enum ProviderCtor {
    Internal(fn(Arc<KbRegistry>) -> Box<dyn DataProviderFactory>),
    External(fn() -> Box<dyn DataProviderFactory>),
}

type ProcessorCtor = fn(&serde_json::Value) -> Result<Box<dyn Processor>>;

type RecognizerCtor =
    Box<dyn Fn(Language, CoreRef<'_>) -> Result<Arc<dyn EntityRecognizer>> + Send + Sync>;

pub struct PluginRegistry {
    backends: HashMap<String, Arc<dyn IndexBackend>>,
    providers: HashMap<String, ProviderCtor>,
    processors: HashMap<String, ProcessorCtor>,
    recognizers: HashMap<String, RecognizerCtor>,
}

impl PluginRegistry {
    /// A registry preloaded with the crate's built-in processor and recognizer.
    pub fn new() -> Self {
        let mut registry = Self {
            backends: HashMap::new(),
            providers: HashMap::new(),
            processors: HashMap::new(),
            recognizers: HashMap::new(),
        };
        registry.register_processor(REGEX_FILTER_PROCESSOR_ID, |options| {
            Ok(Box::new(RegexFilterProcessor::from_options(options)?))
        });
        registry.register_recognizer(TERM_RECOGNIZER_ID, |language, _core| {
            Ok(Arc::new(TermRecognizer::new(language)))
        });
        registry
    }

    pub fn register_backend(&mut self, id: impl Into<String>, backend: Arc<dyn IndexBackend>) {
        self.backends.insert(id.into(), backend);
    }

    pub fn register_provider(&mut self, id: impl Into<String>, ctor: ProviderCtor) {
        self.providers.insert(id.into(), ctor);
    }

    pub fn register_processor(&mut self, id: impl Into<String>, ctor: ProcessorCtor) {
        self.processors.insert(id.into(), ctor);
    }

    pub fn register_recognizer<F>(&mut self, id: impl Into<String>, ctor: F)
    where
        F: Fn(Language, CoreRef<'_>) -> Result<Arc<dyn EntityRecognizer>> + Send + Sync + 'static,
    {
        self.recognizers.insert(id.into(), Box::new(ctor));
    }

    pub(crate) fn backend(&self, id: &str) -> Result<Arc<dyn IndexBackend>> {
        self.backends
            .get(id)
            .cloned()
            .ok_or_else(|| KbError::plugin(id, format!("no index backend registered under '{id}'")))
    }

    pub(crate) fn provider(&self, id: &str) -> Result<&ProviderCtor> {
        self.providers.get(id).ok_or_else(|| {
            KbError::plugin(id, format!("no provider factory registered under '{id}'"))
        })
    }

    pub(crate) fn processor(&self, id: &str) -> Result<ProcessorCtor> {
        self.processors.get(id).copied().ok_or_else(|| {
            KbError::plugin(id, format!("no processor registered under '{id}'"))
        })
    }

    pub(crate) fn recognizer(&self, id: &str) -> Result<&RecognizerCtor> {
        self.recognizers.get(id).ok_or_else(|| {
            KbError::plugin(id, format!("no entity recognizer registered under '{id}'"))
        })
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
