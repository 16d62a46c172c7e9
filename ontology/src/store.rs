//! Per-document triple store.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Statement, Term};
use crate::vocab;

/// All statements of one data document plus the types asserted for each
/// individual.
///
/// Built in a single pass with no ontology knowledge.
#[derive(Debug, Clone, Default)]
pub struct TripleStore {
    triples: Vec<Statement>,
    types_by_individual: BTreeMap<Term, BTreeSet<String>>,
}

impl TripleStore {
    /// Indexes `statements`, keeping them in document order.
    #[must_use]
    pub fn from_statements(statements: Vec<Statement>) -> Self {
        let mut types_by_individual: BTreeMap<Term, BTreeSet<String>> = BTreeMap::new();
        for stmt in &statements {
            if stmt.predicate.as_iri() != Some(vocab::RDF_TYPE) {
                continue;
            }
            if let Some(class) = stmt.object.as_iri() {
                types_by_individual
                    .entry(stmt.subject.clone())
                    .or_default()
                    .insert(class.to_owned());
            }
        }
        Self {
            triples: statements,
            types_by_individual,
        }
    }

    /// Statements in document order.
    #[must_use]
    pub fn triples(&self) -> &[Statement] {
        &self.triples
    }

    /// Types asserted for `individual` anywhere in the document.
    #[must_use]
    pub fn types_of(&self, individual: &Term) -> Option<&BTreeSet<String>> {
        self.types_by_individual.get(individual)
    }

    /// Returns true if at least one type is asserted for `individual`.
    #[must_use]
    pub fn is_typed(&self, individual: &Term) -> bool {
        self.types_of(individual).is_some_and(|t| !t.is_empty())
    }

    /// Every individual with at least one asserted type.
    pub fn typed_individuals(&self) -> impl Iterator<Item = (&Term, &BTreeSet<String>)> {
        self.types_by_individual.iter()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the document had no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}
