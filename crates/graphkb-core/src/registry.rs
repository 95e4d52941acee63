//! The knowledge-base resource registry.
//!
//! Owns the per-slot resource caches (indexers, searchers, storage
//! directories) and the per-repository caches (namespaces, recognizers,
//! loaders), all keyed for atomic get-or-create: under concurrent first-time
//! access, construction runs at most once per key and every caller observes
//! the same instance.
//!
//! Lifecycle is construct → `initialize()` → use → `terminate()`. The
//! registry is an explicitly constructed, passed-by-reference object; there
//! is no ambient/static instance.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{error, info, warn};

use crate::data::{DataProvider, ProcessorChain};
use crate::error::{KbError, Result};
use crate::index::{IndexBackend, Indexer, Searcher};
use crate::loader::KbLoader;
use crate::model::{BuiltInModel, Language, SlotId};
use crate::namespace::Namespace;
use crate::ner::EntityRecognizer;
use crate::plugins::{PluginRegistry, ProviderCtor};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Initialized,
    Terminated,
}

pub struct KbRegistry {
    settings: Settings,
    plugins: PluginRegistry,
    data_root: PathBuf,
    backend: Arc<dyn IndexBackend>,
    indexers: DashMap<SlotId, Arc<dyn Indexer>>,
    searchers: DashMap<SlotId, Arc<dyn Searcher>>,
    directories: DashMap<SlotId, Arc<sled::Db>>,
    namespaces: DashMap<String, Arc<Namespace>>,
    recognizers: DashMap<String, Arc<dyn EntityRecognizer>>,
    loaders: DashMap<String, Arc<KbLoader>>,
    lifecycle: RwLock<Lifecycle>,
}

impl std::fmt::Debug for KbRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KbRegistry")
            .field("data_root", &self.data_root)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl KbRegistry {
    /// Builds a registry over the given configuration view, resolving the
    /// index backend once from `index-store.factory.class`.
    pub fn new(settings: Settings, plugins: PluginRegistry) -> Result<Arc<Self>> {
        let data_root = settings.data_root_dir()?;
        let backend_id = settings.backend_factory_id()?;
        let backend = plugins.backend(&backend_id)?;
        info!(backend = %backend_id, root = %data_root.display(), "knowledge base core created");
        Ok(Arc::new(Self {
            settings,
            plugins,
            data_root,
            backend,
            indexers: DashMap::new(),
            searchers: DashMap::new(),
            directories: DashMap::new(),
            namespaces: DashMap::new(),
            recognizers: DashMap::new(),
            loaders: DashMap::new(),
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
        }))
    }

    /// Provisions every enabled slot declared in the configuration: for each
    /// repository that is not disabled, every declared content type gets an
    /// indexer and a searcher from the backend, started and cached. A backend
    /// returning no indexer or no searcher for a slot leaves that resource
    /// absent (logged, non-fatal).
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state_write();
        if *state != Lifecycle::Uninitialized {
            return Err(KbError::AlreadyInitialized);
        }
        self.provision_all()?;
        *state = Lifecycle::Initialized;
        info!(root = %self.data_root.display(), "core initialized");
        Ok(())
    }

    /// Stops every cached indexer and searcher and releases every cached
    /// directory handle. Individual release failures are logged and do not
    /// abort the teardown of the remaining resources. The caches stay
    /// populated: accessors keep returning the stopped resources.
    pub fn terminate(&self) -> Result<()> {
        let mut state = self.state_write();
        if *state != Lifecycle::Initialized {
            return Err(KbError::NotInitialized);
        }
        for entry in self.indexers.iter() {
            if let Err(e) = entry.value().stop() {
                error!(slot = %entry.key(), error = %e, "failed to stop indexer");
            }
        }
        for entry in self.searchers.iter() {
            if let Err(e) = entry.value().stop() {
                error!(slot = %entry.key(), error = %e, "failed to stop searcher");
            }
        }
        for entry in self.directories.iter() {
            if let Err(e) = entry.value().flush() {
                error!(slot = %entry.key(), error = %e, "failed to release slot directory");
            }
        }
        *state = Lifecycle::Terminated;
        info!("core terminated");
        Ok(())
    }

    /// The cached indexer of a slot. Fails if the slot was never provisioned.
    pub fn get_indexer(&self, slot: &SlotId) -> Result<Arc<dyn Indexer>> {
        let _state = self.state_read();
        self.indexers
            .get(slot)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| KbError::ResourceNotFound {
                resource: "indexer",
                slot: slot.to_string(),
            })
    }

    /// The cached searcher of a slot. Fails if the slot was never provisioned.
    pub fn get_searcher(&self, slot: &SlotId) -> Result<Arc<dyn Searcher>> {
        let _state = self.state_read();
        self.searchers
            .get(slot)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| KbError::ResourceNotFound {
                resource: "searcher",
                slot: slot.to_string(),
            })
    }

    /// Get-or-create the slot's storage directory handle at
    /// `<data.root-dir>/<repository>/<content-type>/idx`.
    pub fn get_directory(&self, slot: &SlotId) -> Result<Arc<sled::Db>> {
        let _state = self.state_read();
        CoreRef::new(self).directory(slot)
    }

    /// Get-or-create the repository's namespace.
    pub fn get_namespace(&self, repository: &str) -> Arc<Namespace> {
        let _state = self.state_read();
        CoreRef::new(self).namespace(repository)
    }

    /// Get-or-create the repository's entity recognizer, constructed through
    /// the plugin registry with the repository's configured language.
    pub fn get_entity_recognizer(&self, repository: &str) -> Result<Arc<dyn EntityRecognizer>> {
        let _state = self.state_read();
        CoreRef::new(self).entity_recognizer(repository)
    }

    /// Get-or-create the repository's ingestion loader.
    pub fn get_loader(self: &Arc<Self>, repository: &str) -> Arc<KbLoader> {
        let _state = self.state_read();
        if let Some(loader) = self.loaders.get(repository) {
            return Arc::clone(loader.value());
        }
        let loader = self
            .loaders
            .entry(repository.to_string())
            .or_insert_with(|| {
                Arc::new(KbLoader::new(Arc::downgrade(self), repository.to_string()))
            });
        Arc::clone(loader.value())
    }

    /// Resolves the slot's data-provider factory from configuration and the
    /// plugin registry and asks it for a provider. Every lookup, construction,
    /// or creation failure surfaces as a wrapped plugin error.
    pub fn create_data_provider(self: &Arc<Self>, slot: &SlotId) -> Result<DataProvider> {
        let _state = self.state_read();
        let provider_id = self
            .settings
            .provider_id(slot)
            .map_err(|e| KbError::plugin(format!("data provider for {slot}"), e))?;
        let factory = match self.plugins.provider(&provider_id)? {
            ProviderCtor::Internal(ctor) => ctor(Arc::clone(self)),
            ProviderCtor::External(ctor) => ctor(),
        };
        let provider = factory
            .create(slot)
            .map_err(|e| KbError::plugin(provider_id.clone(), e))?;
        info!(slot = %slot, provider = %provider.name(), "created data provider");
        Ok(provider)
    }

    /// Assembles the slot's processor chain, or `None` when no processors are
    /// configured for it.
    pub fn create_processor_chain(&self, slot: &SlotId) -> Result<Option<ProcessorChain>> {
        let _state = self.state_read();
        let specs = match self.settings.processor_specs(slot)? {
            Some(specs) if !specs.is_empty() => specs,
            _ => {
                warn!(slot = %slot, "no processors configured");
                return Ok(None);
            }
        };
        let mut processors = Vec::with_capacity(specs.len());
        for spec in &specs {
            let ctor = self.plugins.processor(&spec.class)?;
            processors.push(ctor(&spec.options)?);
        }
        let chain = ProcessorChain::new(processors);
        info!(slot = %slot, processors = ?chain.names(), "processor chain assembled");
        Ok(Some(chain))
    }

    /// Language tag of a repository, from configuration.
    pub fn language(&self, repository: &str) -> Result<Language> {
        let _state = self.state_read();
        self.settings.language(repository)
    }

    /// Every provisioned slot.
    pub fn slots(&self) -> Vec<SlotId> {
        let _state = self.state_read();
        self.indexers.iter().map(|e| e.key().clone()).collect()
    }

    /// The provisioned slots of one repository.
    pub fn slots_of(&self, repository: &str) -> Vec<SlotId> {
        let _state = self.state_read();
        self.searchers
            .iter()
            .map(|e| e.key().clone())
            .filter(|slot| slot.repository() == repository)
            .collect()
    }

    pub fn has_repository(&self, repository: &str) -> bool {
        let _state = self.state_read();
        self.indexers
            .iter()
            .any(|e| e.key().repository() == repository)
    }

    /// The model class registered for a content-type id.
    pub fn model_class(&self, model_id: &str) -> Result<BuiltInModel> {
        BuiltInModel::for_id(model_id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn data_root_dir(&self) -> &Path {
        &self.data_root
    }

    fn provision_all(&self) -> Result<()> {
        let repositories = self.settings.repositories()?;
        for repository in repositories {
            if !self.settings.is_enabled(&repository)? {
                info!(repository = %repository, "repository is disabled");
                continue;
            }
            for content_type in self.settings.content_types(&repository)? {
                let slot = SlotId::new(repository.clone(), content_type);
                info!(slot = %slot, "provisioning slot");

                match self.backend.create_indexer(&slot, CoreRef::new(self))? {
                    Some(indexer) => {
                        indexer.start();
                        self.indexers.insert(slot.clone(), Arc::from(indexer));
                    }
                    None => warn!(slot = %slot, "no indexer created"),
                }
                match self.backend.create_searcher(&slot, CoreRef::new(self))? {
                    Some(searcher) => {
                        searcher.start();
                        self.searchers.insert(slot.clone(), Arc::from(searcher));
                    }
                    None => warn!(slot = %slot, "no searcher created"),
                }
            }
        }
        if self.searchers.is_empty() {
            warn!("no slots were provisioned");
        }
        Ok(())
    }

    // Lock poisoning only occurs when another thread panicked mid-operation;
    // the lifecycle flag stays coherent, so recover the guard.
    fn state_write(&self) -> RwLockWriteGuard<'_, Lifecycle> {
        self.lifecycle.write().unwrap_or_else(|e| e.into_inner())
    }

    fn state_read(&self) -> RwLockReadGuard<'_, Lifecycle> {
        self.lifecycle.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Borrowed capability handle handed to backend factories and recognizer
/// constructors while the registry is mid-provisioning.
///
/// Its accessors bypass the lifecycle guard (the guard is held by the
/// provisioning thread and is not reentrant) but go through the same caches,
/// so per-key at-most-once construction still holds.
#[derive(Clone, Copy)]
pub struct CoreRef<'a> {
    core: &'a KbRegistry,
}

impl<'a> CoreRef<'a> {
    pub(crate) fn new(core: &'a KbRegistry) -> Self {
        Self { core }
    }

    pub fn settings(&self) -> &'a Settings {
        &self.core.settings
    }

    pub fn data_root_dir(&self) -> &'a Path {
        &self.core.data_root
    }

    /// Get-or-create the slot's storage directory. The cache entry is locked
    /// while the database opens, so a racing caller waits instead of opening
    /// a second handle on the same path.
    pub fn directory(&self, slot: &SlotId) -> Result<Arc<sled::Db>> {
        if let Some(db) = self.core.directories.get(slot) {
            return Ok(Arc::clone(db.value()));
        }
        match self.core.directories.entry(slot.clone()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let path = self
                    .core
                    .data_root
                    .join(slot.repository())
                    .join(slot.content_type())
                    .join("idx");
                let db = Arc::new(sled::open(&path)?);
                entry.insert(Arc::clone(&db));
                info!(slot = %slot, path = %path.display(), "opened slot directory");
                Ok(db)
            }
        }
    }

    /// Get-or-create the repository's namespace.
    pub fn namespace(&self, repository: &str) -> Arc<Namespace> {
        Arc::clone(
            self.core
                .namespaces
                .entry(repository.to_string())
                .or_insert_with(|| {
                    Arc::new(Namespace::from_settings(&self.core.settings, repository))
                })
                .value(),
        )
    }

    /// Get-or-create the repository's entity recognizer.
    pub fn entity_recognizer(&self, repository: &str) -> Result<Arc<dyn EntityRecognizer>> {
        if let Some(recognizer) = self.core.recognizers.get(repository) {
            return Ok(Arc::clone(recognizer.value()));
        }
        match self.core.recognizers.entry(repository.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let language = self.core.settings.language(repository)?;
                let recognizer_id = self.core.settings.recognizer_id(repository)?;
                let ctor = self.core.plugins.recognizer(&recognizer_id)?;
                let recognizer = ctor(language, *self)?;
                entry.insert(Arc::clone(&recognizer));
                Ok(recognizer)
            }
        }
    }

    /// The cached searcher of a slot, for recognizers that resolve candidate
    /// mentions against already-provisioned slots.
    pub fn searcher(&self, slot: &SlotId) -> Result<Arc<dyn Searcher>> {
        self.core
            .searchers
            .get(slot)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| KbError::ResourceNotFound {
                resource: "searcher",
                slot: slot.to_string(),
            })
    }
}
