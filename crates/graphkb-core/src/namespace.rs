//! Per-repository IRI namespace: shrink full IRIs to prefixed form and back.

use crate::settings::Settings;

/// Namespace mappings of one repository, read from
/// `kb.<repository>.namespaces`. Missing configuration yields an empty
/// namespace that passes IRIs through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    repository: String,
    /// IRI base of the default (`:`) namespace, when configured.
    main: Option<String>,
    /// Longest-prefix-wins mappings of prefix name to IRI base.
    prefixes: Vec<(String, String)>,
}

impl Namespace {
    pub(crate) fn from_settings(settings: &Settings, repository: &str) -> Self {
        let main = settings.namespace_main(repository).unwrap_or_default();
        let prefixes = settings.namespace_prefixes(repository).unwrap_or_default();
        Self {
            repository: repository.to_string(),
            main,
            prefixes,
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn main(&self) -> Option<&str> {
        self.main.as_deref()
    }

    /// Rewrites a full IRI into prefixed form when a mapping applies.
    pub fn shrink(&self, iri: &str) -> String {
        if let Some(main) = &self.main {
            if let Some(rest) = iri.strip_prefix(main.as_str()) {
                return format!(":{rest}");
            }
        }
        // longest matching base wins when prefixes nest
        let mut best: Option<(&str, &str, usize)> = None;
        for (prefix, base) in &self.prefixes {
            if let Some(rest) = iri.strip_prefix(base.as_str()) {
                if best.map(|(_, _, len)| base.len() > len).unwrap_or(true) {
                    best = Some((prefix, rest, base.len()));
                }
            }
        }
        match best {
            Some((prefix, rest, _)) => format!("{prefix}:{rest}"),
            None => iri.to_string(),
        }
    }

    /// Expands a prefixed identifier back into a full IRI when a mapping applies.
    pub fn expand(&self, short: &str) -> String {
        if let Some(rest) = short.strip_prefix(':') {
            if let Some(main) = &self.main {
                return format!("{main}{rest}");
            }
            return short.to_string();
        }
        if let Some((prefix, rest)) = short.split_once(':') {
            if let Some((_, base)) = self.prefixes.iter().find(|(p, _)| p == prefix) {
                return format!("{base}{rest}");
            }
        }
        short.to_string()
    }
}
