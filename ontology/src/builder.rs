//! Builds an [`OntologyModel`] from a parsed ontology document.
//!
//! Recognized declarations:
//! - classes: `a owl:Class` / `a rdfs:Class`, and both ends of `rdfs:subClassOf`
//! - properties: `a owl:ObjectProperty` / `owl:DatatypeProperty` /
//!   `owl:AnnotationProperty` / `rdf:Property` / `owl:FunctionalProperty`,
//!   and any subject of `rdfs:domain` / `rdfs:range`
//! - domain and range targets given directly or as `owl:unionOf` lists
//! - datatypes: `a rdfs:Datatype`
//!
//! Domain and range targets that are never declared as classes are kept
//! as written; the checker deals with them per use.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::model::{OntologyClass, OntologyModel, OntologyProperty, PropertyKind, Statement, Term};
use crate::parser::ParsedDocument;
use crate::vocab;

impl OntologyModel {
    /// Builds the model from an ontology document's statements.
    ///
    /// Never fails: anything unrecognized is ignored.
    #[must_use]
    pub fn from_document(doc: &ParsedDocument) -> Self {
        let index = SubjectIndex::new(&doc.statements);
        let mut classes: BTreeMap<String, OntologyClass> = BTreeMap::new();
        let mut properties: BTreeMap<String, OntologyProperty> = BTreeMap::new();
        let mut datatypes: BTreeSet<String> = BTreeSet::new();

        for stmt in &doc.statements {
            let (Some(subject), Some(predicate)) = (stmt.subject.as_iri(), stmt.predicate.as_iri())
            else {
                continue;
            };
            match predicate {
                vocab::RDF_TYPE => match stmt.object.as_iri() {
                    Some(vocab::OWL_CLASS | vocab::RDFS_CLASS) => {
                        declare_class(&mut classes, subject);
                    }
                    Some(vocab::OWL_OBJECT_PROPERTY) => {
                        declare_property(&mut properties, subject).kind = PropertyKind::Object;
                    }
                    Some(vocab::OWL_DATATYPE_PROPERTY) => {
                        declare_property(&mut properties, subject).kind = PropertyKind::Datatype;
                    }
                    Some(vocab::OWL_ANNOTATION_PROPERTY) => {
                        declare_property(&mut properties, subject).kind =
                            PropertyKind::Annotation;
                    }
                    Some(vocab::RDF_PROPERTY) => {
                        declare_property(&mut properties, subject);
                    }
                    Some(vocab::OWL_FUNCTIONAL_PROPERTY) => {
                        declare_property(&mut properties, subject).functional = true;
                    }
                    Some(vocab::RDFS_DATATYPE) => {
                        datatypes.insert(subject.to_owned());
                    }
                    _ => {}
                },
                vocab::RDFS_SUBCLASS_OF => {
                    let class = declare_class(&mut classes, subject);
                    if let Some(parent) = stmt.object.as_iri() {
                        class.superclasses.insert(parent.to_owned());
                        declare_class(&mut classes, parent);
                    }
                }
                vocab::RDFS_DOMAIN => {
                    let targets = index.class_targets(&stmt.object);
                    declare_property(&mut properties, subject).domain.extend(targets);
                }
                vocab::RDFS_RANGE => {
                    let targets = index.class_targets(&stmt.object);
                    declare_property(&mut properties, subject).range.extend(targets);
                }
                _ => {}
            }
        }

        let model = OntologyModel::new(classes, properties, datatypes, doc.prefixes.clone());
        debug!(
            classes = model.class_count(),
            properties = model.property_count(),
            prefixes = doc.prefixes.len(),
            "ontology model built"
        );
        model
    }
}

fn declare_class<'a>(
    classes: &'a mut BTreeMap<String, OntologyClass>,
    iri: &str,
) -> &'a mut OntologyClass {
    classes
        .entry(iri.to_owned())
        .or_insert_with(|| OntologyClass {
            iri: iri.to_owned(),
            superclasses: BTreeSet::new(),
        })
}

fn declare_property<'a>(
    properties: &'a mut BTreeMap<String, OntologyProperty>,
    iri: &str,
) -> &'a mut OntologyProperty {
    properties
        .entry(iri.to_owned())
        .or_insert_with(|| OntologyProperty {
            iri: iri.to_owned(),
            kind: PropertyKind::Plain,
            domain: BTreeSet::new(),
            range: BTreeSet::new(),
            functional: false,
        })
}

/// Statements grouped by subject, for following blank-node structures.
struct SubjectIndex<'a> {
    by_subject: HashMap<&'a Term, Vec<&'a Statement>>,
}

impl<'a> SubjectIndex<'a> {
    fn new(statements: &'a [Statement]) -> Self {
        let mut by_subject: HashMap<&Term, Vec<&Statement>> = HashMap::new();
        for stmt in statements {
            by_subject.entry(&stmt.subject).or_default().push(stmt);
        }
        Self { by_subject }
    }

    fn object(&self, subject: &Term, predicate: &str) -> Option<&'a Term> {
        self.by_subject
            .get(subject)?
            .iter()
            .copied()
            .find(|s| s.predicate.as_iri() == Some(predicate))
            .map(|s| &s.object)
    }

    /// IRIs named by a domain/range object: the IRI itself, or the members
    /// of an `owl:unionOf` list hanging off a blank node.
    fn class_targets(&self, object: &Term) -> Vec<String> {
        match object {
            Term::Iri(iri) => vec![iri.clone()],
            Term::BlankNode(_) => self
                .object(object, vocab::OWL_UNION_OF)
                .map(|list| self.list_members(list))
                .unwrap_or_default()
                .into_iter()
                .filter_map(|t| t.as_iri().map(str::to_owned))
                .collect(),
            Term::Literal(_) => Vec::new(),
        }
    }

    /// Walks an `rdf:first`/`rdf:rest` chain. Stops at `rdf:nil`, at a
    /// malformed cell, or on revisiting a cell.
    fn list_members(&self, head: &'a Term) -> Vec<&'a Term> {
        let mut members = Vec::new();
        let mut seen: BTreeSet<&Term> = BTreeSet::new();
        let mut cell = head;
        while cell.as_iri() != Some(vocab::RDF_NIL) && seen.insert(cell) {
            match self.object(cell, vocab::RDF_FIRST) {
                Some(item) => members.push(item),
                None => break,
            }
            match self.object(cell, vocab::RDF_REST) {
                Some(next) => cell = next,
                None => break,
            }
        }
        members
    }
}
