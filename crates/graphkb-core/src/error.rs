//! Error taxonomy for the knowledge-base core.
//!
//! Configuration and plugin-loading failures are fatal and carry their cause;
//! a missing indexer/searcher for a single slot is non-fatal and only logged.
//! Nothing in this crate retries: every failure is surfaced exactly once.

use thiserror::Error;

/// Result type for all knowledge-base core operations.
pub type Result<T> = std::result::Result<T, KbError>;

#[derive(Debug, Error)]
pub enum KbError {
    #[error("core already initialized")]
    AlreadyInitialized,

    #[error("core not initialized")]
    NotInitialized,

    #[error("no knowledge base configured")]
    NoKnowledgeBaseConfigured,

    #[error("{resource} not found nor initialized: {slot}")]
    ResourceNotFound {
        resource: &'static str,
        slot: String,
    },

    #[error("failed to instantiate plugin '{what}'")]
    PluginInstantiationFailed {
        what: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unbound placeholder '{0}'")]
    UnboundPlaceholder(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("no model registered for id '{0}'")]
    UnknownModel(String),

    #[error("unsupported language tag '{0}'")]
    UnsupportedLanguage(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] sled::Error),
}

impl KbError {
    /// Wraps any plugin lookup or construction failure with its cause attached.
    pub fn plugin(
        what: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::PluginInstantiationFailed {
            what: what.into(),
            source: source.into(),
        }
    }
}
