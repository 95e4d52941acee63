//! Slot identity, languages, built-in model classes, and labeled entities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{KbError, Result};

/// Identifies one provisionable unit of index/search resources: a repository
/// name plus a content type (e.g. `wiki/entities`).
///
/// This is the sole cache key throughout the registry. Equality and hashing
/// cover both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId {
    repository: String,
    content_type: String,
}

impl SlotId {
    pub fn new(repository: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            content_type: content_type.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Configuration path of the owning repository subtree.
    pub fn kb_path(&self) -> String {
        format!("kb.{}", self.repository)
    }

    /// Configuration path of this slot's type subtree.
    pub fn type_path(&self) -> String {
        format!("kb.{}.model.{}", self.repository, self.content_type)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repository, self.content_type)
    }
}

/// Language tag of a repository, from `kb.<repository>.language`.
/// Consumed by entity recognizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    Pt,
}

impl Language {
    /// Parses a case-insensitive language tag ("EN", "de", ...).
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "de" => Ok(Self::De),
            "fr" => Ok(Self::Fr),
            "pt" => Ok(Self::Pt),
            _ => Err(KbError::UnsupportedLanguage(tag.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Pt => "pt",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Closed set of model classes a slot's content type can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInModel {
    Entities,
    Properties,
    Facts,
    Documents,
}

impl BuiltInModel {
    pub const ALL: [Self; 4] = [Self::Entities, Self::Properties, Self::Facts, Self::Documents];

    /// The model id as it appears in configuration (content type name).
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Entities => "entities",
            Self::Properties => "properties",
            Self::Facts => "facts",
            Self::Documents => "documents",
        }
    }

    /// Looks a model class up by id.
    pub fn for_id(model_id: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.model_id() == model_id)
            .ok_or_else(|| KbError::UnknownModel(model_id.to_string()))
    }
}

impl fmt::Display for BuiltInModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

/// A concrete labeled entity resolved from a knowledge base, as returned by
/// searchers and recorded in a query builder's resolution ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub iri: String,
    pub label: String,
    /// Relevance score assigned by the searcher, when it produces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Entity {
    pub fn new(iri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            label: label.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.label, self.iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_id_paths() {
        let slot = SlotId::new("wiki", "entities");
        assert_eq!(slot.kb_path(), "kb.wiki");
        assert_eq!(slot.type_path(), "kb.wiki.model.entities");
        assert_eq!(slot.to_string(), "wiki/entities");
    }

    #[test]
    fn slot_id_equality_covers_both_fields() {
        assert_eq!(SlotId::new("a", "b"), SlotId::new("a", "b"));
        assert_ne!(SlotId::new("a", "b"), SlotId::new("a", "c"));
        assert_ne!(SlotId::new("a", "b"), SlotId::new("c", "b"));
    }

    #[test]
    fn language_parsing_is_case_insensitive() {
        assert_eq!(Language::parse("EN").unwrap(), Language::En);
        assert_eq!(Language::parse(" de ").unwrap(), Language::De);
        assert!(matches!(
            Language::parse("tlh"),
            Err(KbError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn model_lookup_by_id() {
        assert_eq!(BuiltInModel::for_id("facts").unwrap(), BuiltInModel::Facts);
        assert!(matches!(
            BuiltInModel::for_id("unicorns"),
            Err(KbError::UnknownModel(_))
        ));
    }
}
