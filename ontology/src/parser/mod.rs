//! Turtle subset parser.
//!
//! Turns document text into a flat, ordered list of [`Statement`]s plus the
//! document's [`PrefixTable`]. The parser is purely structural: it resolves
//! prefixed names and expands predicate/object lists, anonymous blank nodes
//! and collections, but never looks at classes, domains or ranges.
//!
//! Handled syntax:
//! - `@prefix` / `PREFIX` and `@base` / `BASE` directives
//! - `subject predicate object` blocks with `;` and `,` lists, closed by `.`
//! - IRIs, prefixed names, `a`, blank node labels, `[ ... ]`, `( ... )`
//! - short and long string literals with `@lang` or `^^datatype`
//! - integer, decimal, double and boolean literals

mod lexer;
mod prefix;

pub use prefix::{PrefixBinding, PrefixTable};

use thiserror::Error;

use crate::model::{Literal, Statement, Term};
use crate::vocab;
use lexer::{Lexer, Token, TokenKind};

/// What went wrong while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A quoted literal was never closed.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// An `<...>` IRI was never closed on its line.
    #[error("unterminated IRI reference")]
    UnterminatedIri,
    /// A triple block reached the next statement or end of document without `.`.
    #[error("triple block is not terminated by '.'")]
    UnterminatedStatement,
    /// A `[` or `(` was never closed.
    #[error("unclosed '{0}'")]
    Unclosed(char),
    /// A prefixed name used a prefix that had not been declared.
    #[error("undeclared prefix '{0}:'")]
    UndeclaredPrefix(String),
    /// A bare word that is neither a keyword nor a prefixed name.
    #[error("undeclared prefix: bare word '{0}' is not a prefixed name or keyword")]
    BareWord(String),
    /// An `@` directive other than `@prefix` or `@base`.
    #[error("unknown directive '@{0}'")]
    UnknownDirective(String),
    /// A character that cannot start any token.
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    /// An IRI containing characters that IRIs may not contain.
    #[error("invalid character in IRI after '<{0}'")]
    InvalidIri(String),
    /// A backslash escape that is not valid at that position.
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
    /// A token that does not fit the grammar at that position.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the grammar required.
        expected: &'static str,
        /// Description of the token found instead.
        found: String,
    },
    /// The document ended in the middle of a construct.
    #[error("unexpected end of document, expected {0}")]
    UnexpectedEnd(&'static str),
}

/// A fatal syntax error, located by 1-based line.
///
/// For unterminated constructs the line is the one the construct opened on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

/// The structural content of one document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Flat statements in document order.
    pub statements: Vec<Statement>,
    /// Prefixes the document declared.
    pub prefixes: PrefixTable,
}

/// Parses a Turtle document.
///
/// # Errors
///
/// Returns [`ParseError`] on the first syntax error; nothing is returned for
/// the rest of the document.
pub fn parse_document(text: &str) -> Result<ParsedDocument, ParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        doc: ParsedDocument::default(),
        base: None,
        blank_counter: 0,
    };
    parser.document()?;
    Ok(parser.doc)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    doc: ParsedDocument,
    base: Option<String>,
    blank_counter: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, ParseError> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => Err(ParseError {
                line: self.last_line(),
                kind: ParseErrorKind::UnexpectedEnd(expected),
            }),
        }
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |t| t.line)
    }

    fn unexpected(token: &Token, expected: &'static str) -> ParseError {
        ParseError {
            line: token.line,
            kind: ParseErrorKind::UnexpectedToken {
                expected,
                found: token.kind.describe(),
            },
        }
    }

    fn fresh_blank(&mut self) -> Term {
        self.blank_counter += 1;
        Term::BlankNode(format!("genid{}", self.blank_counter))
    }

    fn emit(&mut self, subject: &Term, predicate: &Term, object: Term, line: usize) {
        self.doc.statements.push(Statement {
            subject: subject.clone(),
            predicate: predicate.clone(),
            object,
            line,
        });
    }

    fn document(&mut self) -> Result<(), ParseError> {
        while let Some(token) = self.peek().cloned() {
            match &token.kind {
                TokenKind::PrefixDirective => {
                    self.pos += 1;
                    self.prefix_declaration(token.line)?;
                    self.expect_dot(token.line)?;
                }
                TokenKind::BaseDirective => {
                    self.pos += 1;
                    self.base_declaration()?;
                    self.expect_dot(token.line)?;
                }
                TokenKind::Word(w) if w.eq_ignore_ascii_case("prefix") => {
                    self.pos += 1;
                    self.prefix_declaration(token.line)?;
                }
                TokenKind::Word(w) if w.eq_ignore_ascii_case("base") => {
                    self.pos += 1;
                    self.base_declaration()?;
                }
                _ => self.triples()?,
            }
        }
        Ok(())
    }

    fn expect_dot(&mut self, opened: usize) -> Result<(), ParseError> {
        match self.peek_kind() {
            Some(TokenKind::Dot) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(ParseError {
                line: opened,
                kind: ParseErrorKind::UnterminatedStatement,
            }),
        }
    }

    fn prefix_declaration(&mut self, line: usize) -> Result<(), ParseError> {
        let name = self.next("prefix name")?;
        let prefix = match name.kind {
            TokenKind::PrefixedName { prefix, local } if local.is_empty() => prefix,
            _ => return Err(Self::unexpected(&name, "prefix name ending in ':'")),
        };
        let iri = self.next("namespace IRI")?;
        let namespace = match iri.kind {
            TokenKind::IriRef(ref raw) => self.resolve_relative(raw),
            _ => return Err(Self::unexpected(&iri, "namespace IRI")),
        };
        self.doc.prefixes.declare(prefix, namespace, line);
        Ok(())
    }

    fn base_declaration(&mut self) -> Result<(), ParseError> {
        let iri = self.next("base IRI")?;
        match iri.kind {
            TokenKind::IriRef(ref raw) => {
                self.base = Some(self.resolve_relative(raw));
                Ok(())
            }
            _ => Err(Self::unexpected(&iri, "base IRI")),
        }
    }

    fn resolve_relative(&self, raw: &str) -> String {
        let has_scheme = raw
            .find(':')
            .is_some_and(|i| !raw[..i].contains(['/', '?', '#']));
        match &self.base {
            Some(base) if !has_scheme => {
                if raw.is_empty() {
                    return base.clone();
                }
                if raw.starts_with('#') {
                    let stem = base.split('#').next().unwrap_or(base);
                    return format!("{stem}{raw}");
                }
                let stem = base.rfind('/').map_or(base.as_str(), |i| &base[..=i]);
                format!("{stem}{raw}")
            }
            _ => raw.to_owned(),
        }
    }

    fn resolve_prefixed(
        &self,
        prefix: &str,
        local: &str,
        line: usize,
    ) -> Result<String, ParseError> {
        let namespace = self.doc.prefixes.resolve(prefix).or_else(|| {
            vocab::IMPLIED_PREFIXES
                .iter()
                .find(|(name, _)| *name == prefix)
                .map(|(_, ns)| *ns)
        });
        match namespace {
            Some(ns) => Ok(format!("{ns}{local}")),
            None => Err(ParseError {
                line,
                kind: ParseErrorKind::UndeclaredPrefix(prefix.to_owned()),
            }),
        }
    }

    /// `subject predicateObjectList '.'` or `[ ... ] predicateObjectList? '.'`.
    fn triples(&mut self) -> Result<(), ParseError> {
        let start = self.next("subject")?;
        let subject = match &start.kind {
            TokenKind::OpenBracket => {
                let node = self.blank_node_property_list(start.line)?;
                if matches!(self.peek_kind(), Some(TokenKind::Dot)) {
                    self.pos += 1;
                    return Ok(());
                }
                node
            }
            TokenKind::OpenParen => self.collection(start.line)?,
            _ => self.resource(&start, "subject")?,
        };
        self.predicate_object_list(&subject, start.line)?;
        self.expect_dot(start.line)
    }

    fn predicate_object_list(&mut self, subject: &Term, opened: usize) -> Result<(), ParseError> {
        loop {
            let verb = match self.tokens.get(self.pos) {
                Some(token) => token.clone(),
                None => {
                    return Err(ParseError {
                        line: opened,
                        kind: ParseErrorKind::UnterminatedStatement,
                    })
                }
            };
            self.pos += 1;
            let predicate = self.verb(&verb)?;
            self.object_list(subject, &predicate, verb.line, opened)?;

            if !matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
                return Ok(());
            }
            while matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
                self.pos += 1;
            }
            // A trailing ';' before '.' or ']' is allowed.
            if matches!(
                self.peek_kind(),
                Some(TokenKind::Dot | TokenKind::CloseBracket) | None
            ) {
                return Ok(());
            }
        }
    }

    fn verb(&self, token: &Token) -> Result<Term, ParseError> {
        match &token.kind {
            TokenKind::Word(w) if w == "a" => Ok(Term::iri(vocab::RDF_TYPE)),
            TokenKind::IriRef(_) | TokenKind::PrefixedName { .. } | TokenKind::Word(_) => {
                self.resource(token, "predicate")
            }
            _ => Err(Self::unexpected(token, "predicate")),
        }
    }

    fn object_list(
        &mut self,
        subject: &Term,
        predicate: &Term,
        line: usize,
        opened: usize,
    ) -> Result<(), ParseError> {
        loop {
            let object = self.object(opened)?;
            self.emit(subject, predicate, object, line);
            if !matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                return Ok(());
            }
            self.pos += 1;
        }
    }

    fn object(&mut self, opened: usize) -> Result<Term, ParseError> {
        let token = match self.tokens.get(self.pos) {
            Some(token) => token.clone(),
            None => {
                return Err(ParseError {
                    line: opened,
                    kind: ParseErrorKind::UnterminatedStatement,
                })
            }
        };
        self.pos += 1;
        match &token.kind {
            TokenKind::OpenBracket => self.blank_node_property_list(token.line),
            TokenKind::OpenParen => self.collection(token.line),
            TokenKind::String(value) => self.string_literal(value.clone()),
            TokenKind::Integer(n) => Ok(Term::Literal(Literal::typed(
                n.clone(),
                vocab::XSD_INTEGER,
            ))),
            TokenKind::Decimal(n) => Ok(Term::Literal(Literal::typed(
                n.clone(),
                vocab::XSD_DECIMAL,
            ))),
            TokenKind::Double(n) => Ok(Term::Literal(Literal::typed(
                n.clone(),
                vocab::XSD_DOUBLE,
            ))),
            TokenKind::Word(w) if w == "true" || w == "false" => {
                Ok(Term::Literal(Literal::typed(w.clone(), vocab::XSD_BOOLEAN)))
            }
            _ => self.resource(&token, "object"),
        }
    }

    fn string_literal(&mut self, value: String) -> Result<Term, ParseError> {
        match self.peek_kind() {
            Some(TokenKind::LangTag(tag)) => {
                let tag = tag.clone();
                self.pos += 1;
                Ok(Term::Literal(Literal::tagged(value, tag)))
            }
            Some(TokenKind::DatatypeMarker) => {
                self.pos += 1;
                let token = self.next("datatype IRI")?;
                match &token.kind {
                    TokenKind::IriRef(_) | TokenKind::PrefixedName { .. } => {
                        let datatype = match self.resource(&token, "datatype IRI")? {
                            Term::Iri(iri) => iri,
                            _ => return Err(Self::unexpected(&token, "datatype IRI")),
                        };
                        Ok(Term::Literal(Literal::typed(value, datatype)))
                    }
                    _ => Err(Self::unexpected(&token, "datatype IRI")),
                }
            }
            _ => Ok(Term::Literal(Literal::plain(value))),
        }
    }

    /// IRI, prefixed name or blank node label.
    fn resource(&self, token: &Token, expected: &'static str) -> Result<Term, ParseError> {
        match &token.kind {
            TokenKind::IriRef(raw) => Ok(Term::Iri(self.resolve_relative(raw))),
            TokenKind::PrefixedName { prefix, local } => {
                Ok(Term::Iri(self.resolve_prefixed(prefix, local, token.line)?))
            }
            TokenKind::BlankNodeLabel(id) => Ok(Term::BlankNode(id.clone())),
            TokenKind::Word(w) => Err(ParseError {
                line: token.line,
                kind: ParseErrorKind::BareWord(w.clone()),
            }),
            _ => Err(Self::unexpected(token, expected)),
        }
    }

    /// `[ predicateObjectList? ]`; the `[` has been consumed.
    fn blank_node_property_list(&mut self, opened: usize) -> Result<Term, ParseError> {
        let node = self.fresh_blank();
        if !matches!(self.peek_kind(), Some(TokenKind::CloseBracket)) {
            self.predicate_object_list(&node, opened)
                .map_err(|e| unclosed_at_end(e, '[', opened))?;
        }
        match self.peek_kind() {
            Some(TokenKind::CloseBracket) => {
                self.pos += 1;
                Ok(node)
            }
            _ => Err(ParseError {
                line: opened,
                kind: ParseErrorKind::Unclosed('['),
            }),
        }
    }

    /// `( object* )`; the `(` has been consumed.
    fn collection(&mut self, opened: usize) -> Result<Term, ParseError> {
        let mut items = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::CloseParen) => {
                    self.pos += 1;
                    break;
                }
                None | Some(TokenKind::Dot) => {
                    return Err(ParseError {
                        line: opened,
                        kind: ParseErrorKind::Unclosed('('),
                    })
                }
                Some(_) => {
                    let line = self.peek().map_or(opened, |t| t.line);
                    let item = self
                        .object(opened)
                        .map_err(|e| unclosed_at_end(e, '(', opened))?;
                    items.push((item, line));
                }
            }
        }

        if items.is_empty() {
            return Ok(Term::iri(vocab::RDF_NIL));
        }
        let first = Term::iri(vocab::RDF_FIRST);
        let rest = Term::iri(vocab::RDF_REST);
        let nodes: Vec<Term> = items.iter().map(|_| self.fresh_blank()).collect();
        for (i, (item, line)) in items.into_iter().enumerate() {
            self.emit(&nodes[i], &first, item, line);
            let next = nodes
                .get(i + 1)
                .cloned()
                .unwrap_or_else(|| Term::iri(vocab::RDF_NIL));
            self.emit(&nodes[i], &rest, next, line);
        }
        Ok(nodes[0].clone())
    }
}

/// Reports running out of input inside `[`/`(` as the unclosed opener.
fn unclosed_at_end(err: ParseError, opener: char, opened: usize) -> ParseError {
    match err.kind {
        ParseErrorKind::UnterminatedStatement | ParseErrorKind::UnexpectedEnd(_) => ParseError {
            line: opened,
            kind: ParseErrorKind::Unclosed(opener),
        },
        _ => err,
    }
}
