//! Core model types.
//!
//! Parsed documents are flat sequences of [`Statement`]s over [`Term`]s. An
//! ontology document is folded into an [`OntologyModel`] of typed
//! [`OntologyClass`] and [`OntologyProperty`] records; the model is built
//! once and then only read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::parser::PrefixTable;
use crate::vocab;

/// An RDF term in subject, predicate or object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An absolute IRI. Prefixed names are resolved before they get here.
    Iri(String),
    /// A blank node, identified by its label within one document.
    BlankNode(String),
    /// A literal value.
    Literal(Literal),
}

impl Term {
    /// Creates an IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Returns the IRI if this term is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the literal if this term is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::BlankNode(id) => write!(f, "_:{id}"),
            Term::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// A literal with its datatype and optional language tag.
///
/// Untagged literals carry `xsd:string`; language-tagged literals carry
/// `rdf:langString`. Only one of an explicit datatype or a language tag can
/// be written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    /// Lexical form with escapes already decoded.
    pub value: String,
    /// Full IRI of the datatype.
    pub datatype: String,
    /// Language tag, lower-cased, if present.
    pub language: Option<String>,
}

impl Literal {
    /// Creates an untagged `xsd:string` literal.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: vocab::XSD_STRING.to_owned(),
            language: None,
        }
    }

    /// Creates a literal with an explicit datatype.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Creates a language-tagged literal.
    pub fn tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: vocab::RDF_LANG_STRING.to_owned(),
            language: Some(language.into().to_ascii_lowercase()),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.value)?;
        match &self.language {
            Some(lang) => write!(f, "@{lang}"),
            None if self.datatype == vocab::XSD_STRING => Ok(()),
            None => write!(f, "^^<{}>", self.datatype),
        }
    }
}

/// One flat triple produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Subject term (IRI or blank node).
    pub subject: Term,
    /// Predicate term (always an IRI).
    pub predicate: Term,
    /// Object term.
    pub object: Term,
    /// 1-based line of the predicate token that produced this statement.
    pub line: usize,
}

/// How a property was declared in the ontology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// `owl:ObjectProperty`: relates two resources.
    Object,
    /// `owl:DatatypeProperty`: relates a resource to a literal.
    Datatype,
    /// `owl:AnnotationProperty`: documentation only; never constrained.
    Annotation,
    /// `rdf:Property`, or only known through domain/range statements.
    Plain,
}

/// A class declared by the ontology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyClass {
    /// Full IRI.
    pub iri: String,
    /// Full IRIs of direct parents (`rdfs:subClassOf`).
    pub superclasses: BTreeSet<String>,
}

/// A property declared by the ontology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyProperty {
    /// Full IRI.
    pub iri: String,
    /// Object, datatype, annotation or plain property.
    pub kind: PropertyKind,
    /// Classes the subject may belong to. Empty means unconstrained.
    pub domain: BTreeSet<String>,
    /// Classes or datatypes the object may belong to. Empty means
    /// unconstrained.
    pub range: BTreeSet<String>,
    /// Whether this is also an `owl:FunctionalProperty`.
    pub functional: bool,
}

/// The typed constraint model of one ontology document.
///
/// Built by [`OntologyModel::from_document`](crate::OntologyModel::from_document).
/// The subclass closure of every declared class is computed during
/// construction, so lookups never mutate the model and a single instance can
/// be shared by reference across any number of validated files.
#[derive(Debug, Clone)]
pub struct OntologyModel {
    pub(crate) classes: BTreeMap<String, OntologyClass>,
    pub(crate) properties: BTreeMap<String, OntologyProperty>,
    pub(crate) datatypes: BTreeSet<String>,
    pub(crate) prefixes: PrefixTable,
    closure: BTreeMap<String, BTreeSet<String>>,
}

impl OntologyModel {
    /// Assembles a model and computes the subclass closure of every class.
    #[must_use]
    pub fn new(
        classes: BTreeMap<String, OntologyClass>,
        properties: BTreeMap<String, OntologyProperty>,
        datatypes: BTreeSet<String>,
        prefixes: PrefixTable,
    ) -> Self {
        let closure = compute_closure(&classes);
        Self {
            classes,
            properties,
            datatypes,
            prefixes,
            closure,
        }
    }

    /// All declared classes keyed by IRI.
    #[must_use]
    pub fn classes(&self) -> &BTreeMap<String, OntologyClass> {
        &self.classes
    }

    /// All declared properties keyed by IRI.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, OntologyProperty> {
        &self.properties
    }

    /// Looks up a class by IRI.
    #[must_use]
    pub fn class(&self, iri: &str) -> Option<&OntologyClass> {
        self.classes.get(iri)
    }

    /// Looks up a property by IRI.
    #[must_use]
    pub fn property(&self, iri: &str) -> Option<&OntologyProperty> {
        self.properties.get(iri)
    }

    /// Returns true if `iri` names a datatype: declared `rdfs:Datatype`, an
    /// XSD datatype, `rdfs:Literal` or `rdf:langString`.
    #[must_use]
    pub fn is_datatype(&self, iri: &str) -> bool {
        self.datatypes.contains(iri) || vocab::is_builtin_datatype(iri)
    }

    /// The ontology document's prefix table.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Short names of the prefixes the ontology document declares.
    pub fn declared_prefixes(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(|(name, _)| name)
    }

    /// Returns `iri` together with all of its transitive superclasses.
    ///
    /// A class the ontology never declared has the closure `{iri}`.
    #[must_use]
    pub fn subclass_closure<'a>(&'a self, iri: &'a str) -> BTreeSet<&'a str> {
        match self.closure.get(iri) {
            Some(closure) => closure.iter().map(String::as_str).collect(),
            None => BTreeSet::from([iri]),
        }
    }

    /// Union of the subclass closures of every asserted type.
    #[must_use]
    pub fn type_closure<'a, I>(&'a self, types: I) -> BTreeSet<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        types
            .into_iter()
            .flat_map(|t| self.subclass_closure(t))
            .collect()
    }

    /// Returns the number of declared classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns the number of declared properties.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

/// Fixed-point expansion of the direct-superclass edges.
///
/// Each pass replaces a class's set with the union of the sets of its
/// members; the loop ends on the first pass that adds nothing, which also
/// bounds it in the presence of cycles.
fn compute_closure(
    classes: &BTreeMap<String, OntologyClass>,
) -> BTreeMap<String, BTreeSet<String>> {
    let mut closure: BTreeMap<String, BTreeSet<String>> = classes
        .values()
        .map(|class| {
            let mut set = class.superclasses.clone();
            set.insert(class.iri.clone());
            (class.iri.clone(), set)
        })
        .collect();

    loop {
        let mut changed = false;
        let iris: Vec<String> = closure.keys().cloned().collect();
        for iri in &iris {
            let current = match closure.get(iri) {
                Some(set) => set,
                None => continue,
            };
            let mut expanded = current.clone();
            for member in current {
                if let Some(inherited) = closure.get(member) {
                    expanded.extend(inherited.iter().cloned());
                }
            }
            if expanded.len() > current.len() {
                closure.insert(iri.clone(), expanded);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    closure
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(iri: &str, supers: &[&str]) -> (String, OntologyClass) {
        (
            iri.to_owned(),
            OntologyClass {
                iri: iri.to_owned(),
                superclasses: supers.iter().map(|s| (*s).to_owned()).collect(),
            },
        )
    }

    fn model(classes: Vec<(String, OntologyClass)>) -> OntologyModel {
        OntologyModel::new(
            classes.into_iter().collect(),
            BTreeMap::new(),
            BTreeSet::new(),
            PrefixTable::new(),
        )
    }

    #[test]
    fn closure_follows_chain() {
        let m = model(vec![class("C", &["B"]), class("B", &["A"]), class("A", &[])]);
        assert_eq!(m.subclass_closure("C"), BTreeSet::from(["C", "B", "A"]));
        assert_eq!(m.subclass_closure("A"), BTreeSet::from(["A"]));
    }

    #[test]
    fn closure_terminates_on_cycle() {
        let m = model(vec![class("C", &["B"]), class("B", &["C"])]);
        assert_eq!(m.subclass_closure("C"), BTreeSet::from(["C", "B"]));
        assert_eq!(m.subclass_closure("B"), BTreeSet::from(["C", "B"]));
    }

    #[test]
    fn closure_is_independent_of_declaration_order() {
        let forward = model(vec![class("A", &[]), class("B", &["A"]), class("C", &["B"])]);
        let backward = model(vec![class("C", &["B"]), class("B", &["A"]), class("A", &[])]);
        assert_eq!(forward.subclass_closure("C"), backward.subclass_closure("C"));
    }

    #[test]
    fn undeclared_class_closure_is_itself() {
        let m = model(vec![class("A", &[])]);
        assert_eq!(m.subclass_closure("Misc"), BTreeSet::from(["Misc"]));
    }

    #[test]
    fn type_closure_unions_every_type() {
        let m = model(vec![class("B", &["A"]), class("D", &[])]);
        let closure = m.type_closure(["B", "D"]);
        assert_eq!(closure, BTreeSet::from(["A", "B", "D"]));
    }

    #[test]
    fn literal_display() {
        assert_eq!(Literal::plain("x").to_string(), "\"x\"");
        assert_eq!(Literal::tagged("x", "EN").to_string(), "\"x\"@en");
        assert_eq!(
            Literal::typed("1", vocab::XSD_INTEGER).to_string(),
            format!("\"1\"^^<{}>", vocab::XSD_INTEGER)
        );
    }
}
