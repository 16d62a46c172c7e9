//! Constraint checker.
//!
//! Cross-checks one document's [`TripleStore`] against the shared
//! [`OntologyModel`]. Checks run per statement in document order:
//!
//! | Kind | Severity |
//! |------|----------|
//! | UndeclaredPrefix | error |
//! | UndeclaredProperty | warning |
//! | DomainViolation | error |
//! | RangeViolation | error |
//! | DatatypeMismatch | error |
//! | UntypedIndividual | warning |
//! | IsolatedIndividual | warning |
//! | FunctionalCardinality | error |
//!
//! An empty domain or range leaves that axis unconstrained. An individual
//! with several asserted types satisfies a domain or range when any of its
//! types (with superclasses) does. Individuals with no asserted type are not
//! domain/range checked; the untyped-individual warning covers them.
//!
//! Once every statement is checked, typed individuals that take part in no
//! relationship (only `rdf:type` and annotations, never an object) are
//! reported as isolated.

use std::collections::{BTreeSet, HashMap, HashSet};

use antigone_ontology::serializer::turtle::{iri_to_turtle, term_to_turtle};
use antigone_ontology::{
    vocab, Literal, OntologyModel, OntologyProperty, PrefixTable, PropertyKind, Statement, Term,
    TripleStore,
};

use crate::report::{Diagnostic, DiagnosticKind};

/// Checks every statement of `store` and returns the diagnostics ordered by
/// line, then by kind.
#[must_use]
pub fn check(
    store: &TripleStore,
    model: &OntologyModel,
    prefixes: &PrefixTable,
) -> Vec<Diagnostic> {
    let mut checker = Checker {
        store,
        model,
        prefixes,
        diagnostics: Vec::new(),
        untyped_reported: HashSet::new(),
        functional_values: HashMap::new(),
        functional_reported: HashSet::new(),
    };
    for stmt in store.triples() {
        checker.statement(stmt);
    }
    checker.check_isolated();
    let mut diagnostics = checker.diagnostics;
    diagnostics.sort_by_key(|d| (d.line, d.kind));
    diagnostics
}

struct Checker<'a> {
    store: &'a TripleStore,
    model: &'a OntologyModel,
    prefixes: &'a PrefixTable,
    diagnostics: Vec<Diagnostic>,
    untyped_reported: HashSet<&'a Term>,
    functional_values: HashMap<(&'a Term, &'a str), &'a Term>,
    functional_reported: HashSet<(&'a Term, &'a str)>,
}

impl<'a> Checker<'a> {
    fn statement(&mut self, stmt: &'a Statement) {
        self.check_prefixes(stmt);

        let Some(predicate) = stmt.predicate.as_iri() else {
            return;
        };
        let property = if vocab::is_builtin_vocabulary(predicate) {
            None
        } else {
            match self.model.property(predicate) {
                Some(property) => Some(property),
                None => {
                    self.push(
                        DiagnosticKind::UndeclaredProperty,
                        stmt,
                        format!(
                            "property {} is not declared in the ontology",
                            self.show_iri(predicate)
                        ),
                        self.show(&stmt.subject),
                    );
                    None
                }
            }
        };

        if let Some(property) = property.filter(|p| p.kind != PropertyKind::Annotation) {
            self.check_domain(stmt, property);
            self.check_range(stmt, property);
        }

        self.check_typed(stmt);

        if let Some(property) = property.filter(|p| p.functional) {
            self.check_functional(stmt, property);
        }
    }

    fn push(&mut self, kind: DiagnosticKind, stmt: &Statement, message: String, context: String) {
        self.diagnostics
            .push(Diagnostic::new(kind, stmt.line, message, context));
    }

    fn show(&self, term: &Term) -> String {
        term_to_turtle(term, self.prefixes)
    }

    fn show_iri(&self, iri: &str) -> String {
        iri_to_turtle(iri, self.prefixes)
    }

    fn show_set<'s>(&self, iris: impl IntoIterator<Item = &'s str>) -> String {
        let shown: Vec<String> = iris.into_iter().map(|iri| self.show_iri(iri)).collect();
        format!("{{{}}}", shown.join(", "))
    }

    fn namespace_known(&self, iri: &str) -> bool {
        self.prefixes.covers(iri)
            || self.model.prefixes().covers(iri)
            || vocab::IMPLIED_PREFIXES
                .iter()
                .any(|(_, ns)| iri.starts_with(ns))
    }

    fn check_prefixes(&mut self, stmt: &Statement) {
        for term in [&stmt.subject, &stmt.predicate, &stmt.object] {
            let Some(iri) = term.as_iri() else {
                continue;
            };
            if !self.namespace_known(iri) {
                self.push(
                    DiagnosticKind::UndeclaredPrefix,
                    stmt,
                    format!(
                        "<{iri}> is not in any namespace declared by the document or the ontology"
                    ),
                    format!("<{iri}>"),
                );
            }
        }
    }

    /// Superclass-closed types of an individual, or `None` if it has none.
    fn closed_types(&self, individual: &Term) -> Option<BTreeSet<&'a str>> {
        let types = self.store.types_of(individual).filter(|t| !t.is_empty())?;
        Some(self.model.type_closure(types.iter().map(String::as_str)))
    }

    fn check_domain(&mut self, stmt: &Statement, property: &OntologyProperty) {
        if property.domain.is_empty()
            || property.domain.iter().any(|c| vocab::is_universal_class(c))
        {
            return;
        }
        let Some(types) = self.closed_types(&stmt.subject) else {
            return;
        };
        if property.domain.iter().any(|c| types.contains(c.as_str())) {
            return;
        }
        let asserted = self.asserted_types(&stmt.subject);
        self.push(
            DiagnosticKind::DomainViolation,
            stmt,
            format!(
                "domain violation: {} requires a subject in {}, but {} has types {}",
                self.show_iri(&property.iri),
                self.show_set(property.domain.iter().map(String::as_str)),
                self.show(&stmt.subject),
                asserted
            ),
            self.show(&stmt.subject),
        );
    }

    fn check_range(&mut self, stmt: &Statement, property: &OntologyProperty) {
        if property.range.is_empty() {
            return;
        }
        let (datatypes, classes): (Vec<&str>, Vec<&str>) = property
            .range
            .iter()
            .map(String::as_str)
            .partition(|iri| self.model.is_datatype(iri));

        match &stmt.object {
            Term::Literal(lit) => {
                if !datatypes.is_empty() {
                    if !datatypes.iter().any(|dt| literal_matches(lit, dt)) {
                        self.push(
                            DiagnosticKind::DatatypeMismatch,
                            stmt,
                            format!(
                                "datatype mismatch: {} expects {}, but {} has datatype {}",
                                self.show_iri(&property.iri),
                                self.show_set(datatypes.iter().copied()),
                                self.show(&stmt.object),
                                self.show_iri(&lit.datatype)
                            ),
                            self.show(&stmt.subject),
                        );
                    }
                } else if !classes.iter().any(|c| vocab::is_universal_class(c)) {
                    self.push(
                        DiagnosticKind::RangeViolation,
                        stmt,
                        format!(
                            "range violation: {} requires a resource in {}, but the object is the literal {}",
                            self.show_iri(&property.iri),
                            self.show_set(classes.iter().copied()),
                            self.show(&stmt.object)
                        ),
                        self.show(&stmt.subject),
                    );
                }
            }
            object => {
                if classes.is_empty() {
                    self.push(
                        DiagnosticKind::RangeViolation,
                        stmt,
                        format!(
                            "range violation: {} requires a literal of {}, but the object is the resource {}",
                            self.show_iri(&property.iri),
                            self.show_set(datatypes.iter().copied()),
                            self.show(object)
                        ),
                        self.show(&stmt.subject),
                    );
                    return;
                }
                if classes.iter().any(|c| vocab::is_universal_class(c)) {
                    return;
                }
                let Some(types) = self.closed_types(object) else {
                    return;
                };
                if classes.iter().any(|c| types.contains(c)) {
                    return;
                }
                let asserted = self.asserted_types(object);
                self.push(
                    DiagnosticKind::RangeViolation,
                    stmt,
                    format!(
                        "range violation: {} requires an object in {}, but {} has types {}",
                        self.show_iri(&property.iri),
                        self.show_set(classes.iter().copied()),
                        self.show(object),
                        asserted
                    ),
                    self.show(&stmt.subject),
                );
            }
        }
    }

    fn asserted_types(&self, individual: &Term) -> String {
        let types = self
            .store
            .types_of(individual)
            .map(|t| t.iter().map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default();
        self.show_set(types)
    }

    fn check_typed(&mut self, stmt: &'a Statement) {
        if !matches!(stmt.subject, Term::Iri(_)) || self.store.is_typed(&stmt.subject) {
            return;
        }
        if !self.untyped_reported.insert(&stmt.subject) {
            return;
        }
        self.push(
            DiagnosticKind::UntypedIndividual,
            stmt,
            format!(
                "individual {} has no explicit type in this document",
                self.show(&stmt.subject)
            ),
            self.show(&stmt.subject),
        );
    }

    fn is_annotation(&self, predicate: &str) -> bool {
        vocab::is_builtin_vocabulary(predicate)
            || self
                .model
                .property(predicate)
                .is_some_and(|p| p.kind == PropertyKind::Annotation)
    }

    fn check_isolated(&mut self) {
        let store = self.store;
        let mut connected: HashSet<&'a Term> = HashSet::new();
        let mut first_type: HashMap<&'a Term, &'a Statement> = HashMap::new();
        for stmt in store.triples() {
            let Some(predicate) = stmt.predicate.as_iri() else {
                continue;
            };
            if predicate == vocab::RDF_TYPE {
                first_type.entry(&stmt.subject).or_insert(stmt);
                continue;
            }
            connected.insert(&stmt.object);
            if !self.is_annotation(predicate) {
                connected.insert(&stmt.subject);
            }
        }

        for (individual, _) in store.typed_individuals() {
            if !matches!(individual, Term::Iri(_)) || connected.contains(individual) {
                continue;
            }
            let Some(stmt) = first_type.get(individual).copied() else {
                continue;
            };
            self.push(
                DiagnosticKind::IsolatedIndividual,
                stmt,
                format!(
                    "individual {} has no relationships beyond its type and annotations",
                    self.show(individual)
                ),
                self.show(individual),
            );
        }
    }

    fn check_functional(&mut self, stmt: &'a Statement, property: &'a OntologyProperty) {
        let key = (&stmt.subject, property.iri.as_str());
        let first = *self.functional_values.entry(key).or_insert(&stmt.object);
        if first == &stmt.object || !self.functional_reported.insert(key) {
            return;
        }
        self.push(
            DiagnosticKind::FunctionalCardinality,
            stmt,
            format!(
                "functional property {} has more than one value for {}: {} and {}",
                self.show_iri(&property.iri),
                self.show(&stmt.subject),
                self.show(first),
                self.show(&stmt.object)
            ),
            self.show(&stmt.subject),
        );
    }
}

/// Whether a literal satisfies one range datatype. `rdfs:Literal` accepts
/// every literal; language-tagged strings satisfy `xsd:string`.
fn literal_matches(lit: &Literal, datatype: &str) -> bool {
    datatype == vocab::RDFS_LITERAL
        || lit.datatype == datatype
        || (datatype == vocab::XSD_STRING && lit.datatype == vocab::RDF_LANG_STRING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use antigone_ontology::parse_document;

    const ONTOLOGY: &str = r#"
@prefix :     <http://example.org/antigone#> .
@prefix owl:  <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix xsd:  <http://www.w3.org/2001/XMLSchema#> .

:Agent a owl:Class .
:Character a owl:Class ; rdfs:subClassOf :Agent .
:Motivation a owl:Class .
:Law a owl:Class .

:hasMotivation a owl:ObjectProperty ;
    rdfs:domain :Agent ;
    rdfs:range :Motivation .
:verseNumber a owl:DatatypeProperty , owl:FunctionalProperty ;
    rdfs:range xsd:integer .
:name a owl:DatatypeProperty ;
    rdfs:range xsd:string .
:relatedTo a owl:ObjectProperty .
:note a owl:AnnotationProperty ;
    rdfs:domain :Law .
:sibling a owl:ObjectProperty , owl:FunctionalProperty .
"#;

    fn model() -> OntologyModel {
        match parse_document(ONTOLOGY) {
            Ok(doc) => OntologyModel::from_document(&doc),
            Err(e) => panic!("ontology fixture does not parse: {e}"),
        }
    }

    fn run(data: &str) -> Vec<Diagnostic> {
        let doc = match parse_document(data) {
            Ok(doc) => doc,
            Err(e) => panic!("data fixture does not parse: {e}"),
        };
        let store = TripleStore::from_statements(doc.statements);
        check(&store, &model(), &doc.prefixes)
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<(usize, DiagnosticKind)> {
        diagnostics.iter().map(|d| (d.line, d.kind)).collect()
    }

    const PREFIX: &str = "@prefix : <http://example.org/antigone#> .\n";

    #[test]
    fn domain_accepts_subclass() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character .\n:Duty a :Motivation .\n:Antigone :hasMotivation :Duty .\n"
        ));
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn domain_rejects_unrelated_type() {
        let diags = run(&format!(
            "{PREFIX}:Edict a :Law .\n:Duty a :Motivation .\n:Edict :hasMotivation :Duty .\n"
        ));
        assert_eq!(kinds(&diags), vec![(4, DiagnosticKind::DomainViolation)]);
        assert_eq!(diags[0].context, ":Edict");
    }

    #[test]
    fn any_asserted_type_satisfies_domain() {
        let diags = run(&format!(
            "{PREFIX}:Creon a :Law , :Character .\n:Power a :Motivation .\n:Creon :hasMotivation :Power .\n"
        ));
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn range_rejects_wrong_object_type() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character .\n:Edict a :Law .\n:Antigone :hasMotivation :Edict .\n"
        ));
        assert_eq!(kinds(&diags), vec![(4, DiagnosticKind::RangeViolation)]);
    }

    #[test]
    fn domain_and_range_stack() {
        let diags = run(&format!(
            "{PREFIX}:Edict a :Law .\n:Decree a :Law .\n:Edict :hasMotivation :Decree .\n"
        ));
        assert_eq!(
            kinds(&diags),
            vec![
                (4, DiagnosticKind::DomainViolation),
                (4, DiagnosticKind::RangeViolation)
            ]
        );
    }

    #[test]
    fn literal_against_class_range() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ; :hasMotivation \"duty\" .\n"
        ));
        assert_eq!(kinds(&diags), vec![(2, DiagnosticKind::RangeViolation)]);
    }

    #[test]
    fn datatype_mismatch() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ; :verseNumber \"four hundred\" ; :name \"Antigone\"@en .\n"
        ));
        assert_eq!(kinds(&diags), vec![(2, DiagnosticKind::DatatypeMismatch)]);
    }

    #[test]
    fn unconstrained_property_is_permissive() {
        let diags = run(&format!(
            "{PREFIX}:Edict a :Law .\n:Duty a :Motivation .\n:Edict :relatedTo :Duty .\n:Duty :relatedTo \"x\" .\n"
        ));
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn annotation_properties_are_not_constrained() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ; :note \"heroine\" .\n"
        ));
        assert_eq!(kinds(&diags), vec![(2, DiagnosticKind::IsolatedIndividual)]);
    }

    #[test]
    fn undeclared_property_suppresses_other_checks() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ; :mourns :Polyneices .\n"
        ));
        assert_eq!(kinds(&diags), vec![(2, DiagnosticKind::UndeclaredProperty)]);
    }

    #[test]
    fn functional_property_with_two_values() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ;\n  :verseNumber 1 ;\n  :verseNumber 2 ;\n  :verseNumber 3 .\n"
        ));
        assert_eq!(kinds(&diags), vec![(4, DiagnosticKind::FunctionalCardinality)]);
    }

    #[test]
    fn functional_property_repeated_value() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character ; :sibling :Ismene .\n:Antigone :sibling :Ismene .\n:Ismene a :Character .\n"
        ));
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn untyped_subject_warned_once() {
        let diags = run(&format!(
            "{PREFIX}:Haemon :relatedTo :Antigone .\n:Haemon :relatedTo :Creon .\n"
        ));
        assert_eq!(kinds(&diags), vec![(2, DiagnosticKind::UntypedIndividual)]);
        assert!(diags[0].message.contains(":Haemon"));
    }

    #[test]
    fn individual_with_only_type_and_label_is_isolated() {
        let diags = run(&format!(
            "{PREFIX}@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             :Eurydice a :Character ;\n  rdfs:label \"Eurydice\" .\n\
             _:messenger a :Character .\n"
        ));
        assert_eq!(kinds(&diags), vec![(3, DiagnosticKind::IsolatedIndividual)]);
        assert_eq!(diags[0].context, ":Eurydice");
    }

    #[test]
    fn individual_used_as_object_is_not_isolated() {
        let diags = run(&format!(
            "{PREFIX}:Duty a :Motivation .\n:Antigone a :Character ; :hasMotivation :Duty .\n"
        ));
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn foreign_namespace_is_undeclared_prefix() {
        let diags = run(&format!(
            "{PREFIX}:Antigone a :Character .\n:Antigone :relatedTo <http://example.org/antigon#Creon> .\n"
        ));
        assert_eq!(kinds(&diags), vec![(3, DiagnosticKind::UndeclaredPrefix)]);
    }

    #[test]
    fn ontology_namespace_is_implied() {
        let diags = run(
            "<http://example.org/antigone#Antigone> a <http://example.org/antigone#Character> ;\n\
             <http://example.org/antigone#relatedTo> <http://example.org/antigone#Creon> .\n",
        );
        assert!(diags.is_empty(), "{diags:#?}");
    }

    #[test]
    fn diagnostics_sorted_by_line_then_kind() {
        let diags = run(&format!(
            "{PREFIX}:Creon :hasMotivation [ a :Law ] .\n:Creon a :Law .\n"
        ));
        assert_eq!(
            kinds(&diags),
            vec![
                (2, DiagnosticKind::DomainViolation),
                (2, DiagnosticKind::RangeViolation)
            ]
        );
    }
}
