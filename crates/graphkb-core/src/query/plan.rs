//! Abstract query plans: triple patterns, variables, and placeholder bindings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The literal token marking an "is-a" relation inside a triple pattern.
pub const TYPE_MARKER: &str = "TYPE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Select,
    Ask,
    /// Declared but has no defined compilation; constructing a builder with
    /// it always fails.
    Aggregate,
}

/// What a placeholder stands for in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Instance,
    Class,
    Property,
}

/// A named, unresolved reference to a domain concept, supplied by the caller
/// before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataModelBinding {
    placeholder: String,
    term: String,
    kind: BindingKind,
}

impl DataModelBinding {
    pub fn new(
        placeholder: impl Into<String>,
        term: impl Into<String>,
        kind: BindingKind,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            term: term.into(),
            kind,
        }
    }

    /// The placeholder name referenced from triple patterns.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The nominal domain term this binding carries.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }
}

impl fmt::Display for DataModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.placeholder, self.term)
    }
}

/// One three-token clause template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    subject: String,
    predicate: String,
    object: String,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    pub fn tokens(&self) -> [&str; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// True for syntactically marked variables, which compile through verbatim.
    pub fn is_variable(token: &str) -> bool {
        token.starts_with('?')
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Ordered sequence of triple patterns; order is significant in the compiled
/// output, where each pattern becomes one conjunct clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlanPatterns(Vec<TriplePattern>);

impl QueryPlanPatterns {
    pub fn new(patterns: Vec<TriplePattern>) -> Self {
        Self(patterns)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TriplePattern> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<TriplePattern>> for QueryPlanPatterns {
    fn from(patterns: Vec<TriplePattern>) -> Self {
        Self(patterns)
    }
}

impl<'a> IntoIterator for &'a QueryPlanPatterns {
    type Item = &'a TriplePattern;
    type IntoIter = std::slice::Iter<'a, TriplePattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for QueryPlanPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pattern in &self.0 {
            if !first {
                f.write_str(" . ")?;
            }
            write!(f, "{pattern}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_marked_by_a_leading_question_mark() {
        assert!(TriplePattern::is_variable("?X"));
        assert!(TriplePattern::is_variable("?VAR_1"));
        assert!(!TriplePattern::is_variable("TYPE"));
        assert!(!TriplePattern::is_variable("P1"));
    }

    #[test]
    fn patterns_display_in_order() {
        let patterns = QueryPlanPatterns::new(vec![
            TriplePattern::new("?X", "TYPE", "P1"),
            TriplePattern::new("?X", "P2", "?Y"),
        ]);
        assert_eq!(patterns.to_string(), "?X TYPE P1 . ?X P2 ?Y");
        assert_eq!(patterns.len(), 2);
    }
}
