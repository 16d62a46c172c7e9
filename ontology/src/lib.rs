//! Ontology and triple-document model for constraint validation.
//!
//! The `antigone-ontology` crate turns Turtle text into typed data:
//!
//! - [`parser`]: tokenizer and parser producing flat [`Statement`]s with
//!   line numbers, plus the document's [`PrefixTable`]
//! - [`OntologyModel`]: classes, properties (domain, range, functional) and
//!   the memoized subclass closure of an ontology document
//! - [`TripleStore`]: a data document's statements with per-individual type
//!   sets
//! - [`serializer::turtle`]: compact Turtle rendering of terms for messages
//!
//! # Entry Point
//!
//! ```
//! use antigone_ontology::{parse_document, OntologyModel, TripleStore};
//!
//! let ontology = parse_document(
//!     "@prefix : <http://example.org/antigone#> .\n\
//!      @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
//!      :Character a owl:Class .\n",
//! )?;
//! let model = OntologyModel::from_document(&ontology);
//! assert_eq!(model.class_count(), 1);
//!
//! let data = parse_document(
//!     "@prefix : <http://example.org/antigone#> .\n:Antigone a :Character .\n",
//! )?;
//! let store = TripleStore::from_statements(data.statements);
//! assert_eq!(store.len(), 1);
//! # Ok::<(), antigone_ontology::ParseError>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

mod builder;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod store;
pub mod vocab;

pub use model::{
    Literal, OntologyClass, OntologyModel, OntologyProperty, PropertyKind, Statement, Term,
};
pub use parser::{parse_document, ParseError, ParseErrorKind, ParsedDocument, PrefixTable};
pub use store::TripleStore;
