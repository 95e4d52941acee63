//! Compiles a query plan into graph-query text and tracks entity resolution.
//!
//! Compilation happens exactly once, synchronously, at construction, from the
//! nominal terms of the supplied bindings. The resolution ledger grows
//! afterwards through [`GraphQueryBuilder::update`] and never rewrites the
//! compiled text.

use std::fmt;

use dashmap::DashMap;

use super::plan::{DataModelBinding, QueryPlanPatterns, QueryType, TriplePattern, TYPE_MARKER};
use crate::error::{KbError, Result};
use crate::model::Entity;

#[derive(Debug)]
pub struct GraphQueryBuilder {
    query_type: QueryType,
    patterns: QueryPlanPatterns,
    bindings: Vec<DataModelBinding>,
    resolutions: DashMap<DataModelBinding, Vec<Entity>>,
    query: String,
}

impl GraphQueryBuilder {
    /// Compiles the plan. Fails without producing a builder on an aggregate
    /// plan or a pattern token with no matching binding.
    pub fn new(
        query_type: QueryType,
        patterns: QueryPlanPatterns,
        bindings: Vec<DataModelBinding>,
    ) -> Result<Self> {
        let query = compile(query_type, &patterns, &bindings)?;
        Ok(Self {
            query_type,
            patterns,
            bindings,
            resolutions: DashMap::new(),
            query,
        })
    }

    /// The compiled query text, fixed for the builder's lifetime.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn patterns(&self) -> &QueryPlanPatterns {
        &self.patterns
    }

    pub fn bindings(&self) -> &[DataModelBinding] {
        &self.bindings
    }

    /// Looks a binding up by placeholder name.
    pub fn binding(&self, placeholder: &str) -> Result<&DataModelBinding> {
        self.bindings
            .iter()
            .find(|b| b.placeholder() == placeholder)
            .ok_or_else(|| KbError::UnboundPlaceholder(placeholder.to_string()))
    }

    /// True once at least one entity has been recorded for the binding.
    pub fn is_resolved(&self, binding: &DataModelBinding) -> bool {
        self.resolutions.contains_key(binding)
    }

    /// Appends a resolved entity to the binding's ledger. Insertion order is
    /// preserved and duplicates are permitted.
    pub fn update(&self, binding: &DataModelBinding, entity: Entity) {
        self.resolutions
            .entry(binding.clone())
            .or_default()
            .push(entity);
    }

    /// The entities recorded for a binding so far, in insertion order.
    pub fn resolved(&self, binding: &DataModelBinding) -> Option<Vec<Entity>> {
        self.resolutions.get(binding).map(|e| e.value().clone())
    }
}

impl fmt::Display for GraphQueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

fn compile(
    query_type: QueryType,
    patterns: &QueryPlanPatterns,
    bindings: &[DataModelBinding],
) -> Result<String> {
    match query_type {
        QueryType::Select => Ok(format!(
            "SELECT * WHERE {{\n {} \n}}",
            compile_clauses(patterns, bindings)?
        )),
        QueryType::Ask => Ok(format!(
            "ASK {{\n {} \n}}",
            compile_clauses(patterns, bindings)?
        )),
        QueryType::Aggregate => Err(KbError::NotImplemented("aggregate query compilation")),
    }
}

fn compile_clauses(patterns: &QueryPlanPatterns, bindings: &[DataModelBinding]) -> Result<String> {
    let mut clauses = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let mut rendered = Vec::with_capacity(3);
        for token in pattern.tokens() {
            if TriplePattern::is_variable(token) {
                rendered.push(token.to_string());
            } else if token == TYPE_MARKER {
                rendered.push("a".to_string());
            } else {
                let binding = bindings
                    .iter()
                    .find(|b| b.placeholder() == token)
                    .ok_or_else(|| KbError::UnboundPlaceholder(token.to_string()))?;
                rendered.push(namespaced(binding));
            }
        }
        clauses.push(rendered.join(" "));
    }
    Ok(format!("{{ {} }}", clauses.join(" . \n ")))
}

/// Renders the binding's nominal term as a default-namespace identifier:
/// whitespace becomes underscores behind the `:` marker.
fn namespaced(binding: &DataModelBinding) -> String {
    let term: String = binding
        .term()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!(":{term}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BindingKind;

    fn person_plan() -> (QueryPlanPatterns, Vec<DataModelBinding>) {
        let patterns = QueryPlanPatterns::new(vec![
            TriplePattern::new("?X", "TYPE", "P1"),
            TriplePattern::new("?X", "P2", "?Y"),
        ]);
        let bindings = vec![
            DataModelBinding::new("P1", "Person", BindingKind::Class),
            DataModelBinding::new("P2", "has name", BindingKind::Property),
        ];
        (patterns, bindings)
    }

    #[test]
    fn ask_compilation_is_deterministic() {
        let (patterns, bindings) = person_plan();
        let builder = GraphQueryBuilder::new(QueryType::Ask, patterns, bindings).unwrap();
        assert_eq!(
            builder.query(),
            "ASK {\n { ?X a :Person . \n ?X :has_name ?Y } \n}"
        );
    }

    #[test]
    fn select_wraps_the_same_clause_body() {
        let (patterns, bindings) = person_plan();
        let builder = GraphQueryBuilder::new(QueryType::Select, patterns, bindings).unwrap();
        assert_eq!(
            builder.query(),
            "SELECT * WHERE {\n { ?X a :Person . \n ?X :has_name ?Y } \n}"
        );
        assert_eq!(builder.to_string(), builder.query());
    }

    #[test]
    fn aggregate_construction_always_fails() {
        let (patterns, bindings) = person_plan();
        let err = GraphQueryBuilder::new(QueryType::Aggregate, patterns, bindings).unwrap_err();
        assert!(matches!(err, KbError::NotImplemented(_)));
    }

    #[test]
    fn unbound_placeholder_fails_compilation() {
        let patterns = QueryPlanPatterns::new(vec![TriplePattern::new("?X", "P9", "?Y")]);
        let err = GraphQueryBuilder::new(QueryType::Ask, patterns, Vec::new()).unwrap_err();
        match err {
            KbError::UnboundPlaceholder(name) => assert_eq!(name, "P9"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn binding_lookup_by_placeholder() {
        let (patterns, bindings) = person_plan();
        let builder = GraphQueryBuilder::new(QueryType::Ask, patterns, bindings).unwrap();
        assert_eq!(builder.binding("P1").unwrap().term(), "Person");
        assert!(matches!(
            builder.binding("P7"),
            Err(KbError::UnboundPlaceholder(_))
        ));
    }

    #[test]
    fn ledger_grows_without_touching_the_compiled_text() {
        let (patterns, bindings) = person_plan();
        let builder = GraphQueryBuilder::new(QueryType::Ask, patterns, bindings).unwrap();
        let before = builder.query().to_string();
        let binding = builder.binding("P1").unwrap().clone();

        assert!(!builder.is_resolved(&binding));
        builder.update(&binding, Entity::new("dbr:Person", "Person"));
        builder.update(&binding, Entity::new("dbr:Human", "Human"));
        builder.update(&binding, Entity::new("dbr:Person", "Person"));

        assert!(builder.is_resolved(&binding));
        let resolved = builder.resolved(&binding).unwrap();
        assert_eq!(resolved.len(), 3, "duplicates are permitted");
        assert_eq!(resolved[0].iri, "dbr:Person");
        assert_eq!(resolved[1].iri, "dbr:Human");
        assert_eq!(builder.query(), before, "resolution never rewrites the text");
    }
}
