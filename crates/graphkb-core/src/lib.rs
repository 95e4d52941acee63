//! graphkb-core: knowledge-base slot registry and graph-query plan compiler.
//!
//! Two subsystems make up the core:
//!
//! - the resource registry ([`KbRegistry`]): lifecycle, caching, and pluggable
//!   construction of per-slot index/search resources, per-repository
//!   namespaces, recognizers, and ingestion loaders;
//! - the query plan compiler ([`GraphQueryBuilder`]): compiles an ordered
//!   sequence of triple patterns plus placeholder bindings into graph-query
//!   text, tracking incremental entity resolution in a separate ledger.
//!
//! Index backends, data providers, processors, and recognizers plug in
//! through the startup-time [`PluginRegistry`], keyed by the identifiers the
//! configuration tree names.

mod error;
mod loader;
mod model;
mod namespace;
mod ner;
mod plugins;
mod registry;
mod serializer;
mod settings;

pub mod data;
pub mod index;
pub mod query;

pub use data::{
    DataProvider, DataProviderFactory, Holder, Processor, ProcessorChain, RegexFilterProcessor,
    REGEX_FILTER_PROCESSOR_ID,
};
pub use error::{KbError, Result};
pub use index::{IndexBackend, Indexer, Searcher};
pub use loader::{KbLoader, LoadReport};
pub use model::{BuiltInModel, Entity, Language, SlotId};
pub use namespace::Namespace;
pub use ner::{EntityMention, EntityRecognizer, TermRecognizer, TERM_RECOGNIZER_ID};
pub use plugins::{PluginRegistry, ProviderCtor};
pub use query::{
    BindingKind, DataModelBinding, GraphQueryBuilder, QueryPlanPatterns, QueryType, TriplePattern,
    TYPE_MARKER,
};
pub use registry::{CoreRef, KbRegistry};
pub use serializer::ObjectSerializer;
pub use settings::{ProcessorSpec, Settings};
