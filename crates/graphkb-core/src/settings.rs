//! Typed, read-only view over the hierarchical configuration tree.
//!
//! The registry reads from this view but does not own the tree's lifecycle;
//! the embedding application decides where the configuration comes from
//! (file, string, layered sources).

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};

use crate::error::{KbError, Result};
use crate::model::{Language, SlotId};
use crate::ner::TERM_RECOGNIZER_ID;

/// One entry of a slot's ordered `processors` list: the processor's registered
/// class id plus the full entry as options for its constructor.
#[derive(Debug, Clone)]
pub struct ProcessorSpec {
    pub class: String,
    pub options: serde_json::Value,
}

/// Read-only configuration view keyed by slot name and type.
#[derive(Debug, Clone)]
pub struct Settings {
    cfg: Config,
}

impl Settings {
    pub fn from_config(cfg: Config) -> Self {
        Self { cfg }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::from(path.to_path_buf()))
            .build()?;
        Ok(Self { cfg })
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(Self { cfg })
    }

    /// Absolute filesystem root for all per-slot storage (`data.root-dir`).
    pub fn data_root_dir(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(self.cfg.get_string("data.root-dir")?))
    }

    /// Registered id of the index backend (`index-store.factory.class`).
    pub fn backend_factory_id(&self) -> Result<String> {
        Ok(self.cfg.get_string("index-store.factory.class")?)
    }

    /// Names of all declared repositories, sorted for deterministic iteration.
    /// Fails when the configuration has no `kb` section at all.
    pub fn repositories(&self) -> Result<Vec<String>> {
        let table = self
            .cfg
            .get_table("kb")
            .map_err(|_| KbError::NoKnowledgeBaseConfigured)?;
        if table.is_empty() {
            return Err(KbError::NoKnowledgeBaseConfigured);
        }
        let mut names: Vec<String> = table.into_keys().collect();
        names.sort();
        Ok(names)
    }

    /// Boolean gate for the whole repository (`kb.<repository>.enabled`).
    pub fn is_enabled(&self, repository: &str) -> Result<bool> {
        Ok(self.cfg.get_bool(&format!("kb.{repository}.enabled"))?)
    }

    /// Language tag used by the repository's recognizer.
    pub fn language(&self, repository: &str) -> Result<Language> {
        Language::parse(&self.cfg.get_string(&format!("kb.{repository}.language"))?)
    }

    /// Content types declared under `kb.<repository>.model`, sorted.
    pub fn content_types(&self, repository: &str) -> Result<Vec<String>> {
        let table = self.cfg.get_table(&format!("kb.{repository}.model"))?;
        let mut types: Vec<String> = table.into_keys().collect();
        types.sort();
        Ok(types)
    }

    /// Registered id of the slot's data-provider factory
    /// (`<type-path>.provider.class`).
    pub fn provider_id(&self, slot: &SlotId) -> Result<String> {
        Ok(self
            .cfg
            .get_string(&format!("{}.provider.class", slot.type_path()))?)
    }

    /// Registered id of the repository's entity recognizer. Optional; the
    /// built-in term recognizer is the default.
    pub fn recognizer_id(&self, repository: &str) -> Result<String> {
        match self
            .cfg
            .get_string(&format!("kb.{repository}.recognizer.class"))
        {
            Ok(id) => Ok(id),
            Err(config::ConfigError::NotFound(_)) => Ok(TERM_RECOGNIZER_ID.to_string()),
            Err(e) => Err(e.into()),
        }
    }

    /// The slot's ordered processor list (`<type-path>.processors`), or `None`
    /// when no processors are configured.
    pub fn processor_specs(&self, slot: &SlotId) -> Result<Option<Vec<ProcessorSpec>>> {
        let key = format!("{}.processors", slot.type_path());
        let items = match self.cfg.get_array(&key) {
            Ok(items) => items,
            Err(config::ConfigError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if items.is_empty() {
            return Ok(None);
        }
        let mut specs = Vec::with_capacity(items.len());
        for item in items {
            let options: serde_json::Value = item.try_deserialize()?;
            let class = options
                .get("class")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    KbError::Config(config::ConfigError::Message(format!(
                        "processor entry for {slot} is missing 'class'"
                    )))
                })?
                .to_string();
            specs.push(ProcessorSpec { class, options });
        }
        Ok(Some(specs))
    }

    /// Optional main namespace IRI of a repository
    /// (`kb.<repository>.namespaces.main`).
    pub fn namespace_main(&self, repository: &str) -> Result<Option<String>> {
        match self
            .cfg
            .get_string(&format!("kb.{repository}.namespaces.main"))
        {
            Ok(main) => Ok(Some(main)),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Optional prefix→IRI-base mappings of a repository
    /// (`kb.<repository>.namespaces.prefixes`).
    pub fn namespace_prefixes(&self, repository: &str) -> Result<Vec<(String, String)>> {
        let table = match self
            .cfg
            .get_table(&format!("kb.{repository}.namespaces.prefixes"))
        {
            Ok(table) => table,
            Err(config::ConfigError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut prefixes = Vec::with_capacity(table.len());
        for (prefix, value) in table {
            prefixes.push((prefix, value.into_string()?));
        }
        prefixes.sort();
        Ok(prefixes)
    }

    /// Generic string lookup for plugin-specific keys.
    pub fn string(&self, key: &str) -> Result<String> {
        Ok(self.cfg.get_string(key)?)
    }

    /// Generic array lookup for plugin-specific keys, as JSON values.
    pub fn json_array(&self, key: &str) -> Result<Vec<serde_json::Value>> {
        let items = self.cfg.get_array(key)?;
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(item.try_deserialize()?);
        }
        Ok(values)
    }
}
