//! Turtle rendering of single terms.
//!
//! Used to show terms in diagnostics the way the document author wrote them:
//! IRIs compacted through the document's prefixes where possible.

use crate::model::{Literal, Term};
use crate::parser::PrefixTable;
use crate::vocab;

/// Renders a term in Turtle syntax, compacting IRIs with `prefixes`.
#[must_use]
pub fn term_to_turtle(term: &Term, prefixes: &PrefixTable) -> String {
    match term {
        Term::Iri(iri) => iri_to_turtle(iri, prefixes),
        Term::BlankNode(id) => format!("_:{id}"),
        Term::Literal(lit) => literal_to_turtle(lit, prefixes),
    }
}

/// Renders an IRI as `prefix:local` if possible, `<iri>` otherwise.
#[must_use]
pub fn iri_to_turtle(iri: &str, prefixes: &PrefixTable) -> String {
    if iri == vocab::RDF_TYPE {
        return "a".to_owned();
    }
    prefixes
        .compact(iri)
        .unwrap_or_else(|| format!("<{iri}>"))
}

fn literal_to_turtle(lit: &Literal, prefixes: &PrefixTable) -> String {
    let quoted = turtle_string(&lit.value);
    match &lit.language {
        Some(lang) => format!("{quoted}@{lang}"),
        None if lit.datatype == vocab::XSD_STRING => quoted,
        None => {
            let datatype = prefixes
                .compact(&lit.datatype)
                .unwrap_or_else(|| format!("<{}>", lit.datatype));
            format!("{quoted}^^{datatype}")
        }
    }
}

fn turtle_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{}\"", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> PrefixTable {
        let mut table = PrefixTable::new();
        table.declare("", "http://example.org/antigone#", 1);
        table
    }

    #[test]
    fn compacts_declared_and_implied_prefixes() {
        let p = prefixes();
        assert_eq!(
            term_to_turtle(&Term::iri("http://example.org/antigone#Creon"), &p),
            ":Creon"
        );
        assert_eq!(term_to_turtle(&Term::iri(vocab::OWL_THING), &p), "owl:Thing");
        assert_eq!(
            term_to_turtle(&Term::iri("urn:x-verse:905"), &p),
            "<urn:x-verse:905>"
        );
    }

    #[test]
    fn renders_literals() {
        let p = prefixes();
        assert_eq!(
            term_to_turtle(&Term::Literal(Literal::plain("say \"no\"\n")), &p),
            "\"say \\\"no\\\"\\n\""
        );
        assert_eq!(
            term_to_turtle(&Term::Literal(Literal::typed("5", vocab::XSD_INTEGER)), &p),
            "\"5\"^^xsd:integer"
        );
        assert_eq!(
            term_to_turtle(&Term::Literal(Literal::tagged("Ἀντιγόνη", "grc")), &p),
            "\"Ἀντιγόνη\"@grc"
        );
    }

    #[test]
    fn rdf_type_renders_as_a() {
        let p = prefixes();
        assert_eq!(iri_to_turtle(vocab::RDF_TYPE, &p), "a");
        assert_eq!(
            iri_to_turtle("http://example.org/antigone#Character", &p),
            ":Character"
        );
    }
}
