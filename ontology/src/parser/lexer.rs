//! Tokenizer with line tracking.
//!
//! Every token remembers the line it starts on. Multi-line constructs (long
//! strings) advance the line counter as they are consumed, so tokens after
//! them keep accurate positions.

use super::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    IriRef(String),
    PrefixedName { prefix: String, local: String },
    BlankNodeLabel(String),
    String(String),
    LangTag(String),
    Integer(String),
    Decimal(String),
    Double(String),
    Word(String),
    PrefixDirective,
    BaseDirective,
    DatatypeMarker,
    Dot,
    Semicolon,
    Comma,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::IriRef(iri) => format!("<{iri}>"),
            TokenKind::PrefixedName { prefix, local } => format!("{prefix}:{local}"),
            TokenKind::BlankNodeLabel(id) => format!("_:{id}"),
            TokenKind::String(_) => "string literal".to_owned(),
            TokenKind::LangTag(tag) => format!("@{tag}"),
            TokenKind::Integer(n) | TokenKind::Decimal(n) | TokenKind::Double(n) => n.clone(),
            TokenKind::Word(w) => w.clone(),
            TokenKind::PrefixDirective => "@prefix".to_owned(),
            TokenKind::BaseDirective => "@base".to_owned(),
            TokenKind::DatatypeMarker => "'^^'".to_owned(),
            TokenKind::Dot => "'.'".to_owned(),
            TokenKind::Semicolon => "';'".to_owned(),
            TokenKind::Comma => "','".to_owned(),
            TokenKind::OpenBracket => "'['".to_owned(),
            TokenKind::CloseBracket => "']'".to_owned(),
            TokenKind::OpenParen => "'('".to_owned(),
            TokenKind::CloseParen => "')'".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
}

pub(crate) struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    /// Tokenizes the whole document.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens: Vec<Token> = Vec::new();
        while let Some(c) = self.skip_trivia() {
            let line = self.line;
            let after_string = matches!(
                tokens.last(),
                Some(Token {
                    kind: TokenKind::String(_),
                    ..
                })
            );
            let kind = match c {
                '<' => self.iri_ref()?,
                '"' | '\'' => self.string(c)?,
                '@' => self.at_keyword(after_string)?,
                '^' => {
                    self.pos += 1;
                    if self.peek() == Some('^') {
                        self.pos += 1;
                        TokenKind::DatatypeMarker
                    } else {
                        return Err(self.error(ParseErrorKind::UnexpectedChar('^')));
                    }
                }
                '.' if !self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => {
                    self.pos += 1;
                    TokenKind::Dot
                }
                ';' => self.single(TokenKind::Semicolon),
                ',' => self.single(TokenKind::Comma),
                '[' => self.single(TokenKind::OpenBracket),
                ']' => self.single(TokenKind::CloseBracket),
                '(' => self.single(TokenKind::OpenParen),
                ')' => self.single(TokenKind::CloseParen),
                c if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') => self.number()?,
                c if is_name_start(c) => self.name(),
                other => return Err(self.error(ParseErrorKind::UnexpectedChar(other))),
            };
            tokens.push(Token { kind, line });
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: self.line,
            kind,
        }
    }

    /// Skips whitespace and comments; returns the next significant char.
    fn skip_trivia(&mut self) -> Option<char> {
        loop {
            let c = self.peek()?;
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                return Some(c);
            }
        }
    }

    fn iri_ref(&mut self) -> Result<TokenKind, ParseError> {
        let opened = self.line;
        self.pos += 1;
        let mut iri = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(ParseError {
                        line: opened,
                        kind: ParseErrorKind::UnterminatedIri,
                    })
                }
                Some('>') => {
                    self.pos += 1;
                    return Ok(TokenKind::IriRef(iri));
                }
                Some('\\') => {
                    self.pos += 1;
                    let decoded = self.unicode_escape()?;
                    iri.push(decoded);
                }
                Some(c) if c.is_whitespace() || matches!(c, '"' | '{' | '}' | '|' | '`') => {
                    return Err(self.error(ParseErrorKind::InvalidIri(iri)));
                }
                Some(c) => {
                    self.pos += 1;
                    iri.push(c);
                }
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<TokenKind, ParseError> {
        let opened = self.line;
        let long = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        if long {
            self.pos += 3;
        } else if self.peek_at(1) == Some(quote) {
            self.pos += 2;
            return Ok(TokenKind::String(String::new()));
        } else {
            self.pos += 1;
        }

        let unterminated = ParseError {
            line: opened,
            kind: ParseErrorKind::UnterminatedString,
        };
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(unterminated),
                Some('\n') if !long => return Err(unterminated),
                Some('\\') => {
                    self.pos += 1;
                    let decoded = self.string_escape()?;
                    value.push(decoded);
                }
                Some(c) if c == quote => {
                    if !long {
                        self.pos += 1;
                        return Ok(TokenKind::String(value));
                    }
                    if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                        self.pos += 3;
                        return Ok(TokenKind::String(value));
                    }
                    self.pos += 1;
                    value.push(c);
                }
                Some(_) => {
                    if let Some(c) = self.bump() {
                        value.push(c);
                    }
                }
            }
        }
    }

    /// Decodes the escape after a backslash inside a string literal.
    fn string_escape(&mut self) -> Result<char, ParseError> {
        let decoded = match self.peek() {
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\u{c}',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('\\') => '\\',
            Some('u' | 'U') => return self.unicode_escape(),
            other => {
                let text = other.map(|c| format!("\\{c}")).unwrap_or_else(|| "\\".to_owned());
                return Err(self.error(ParseErrorKind::InvalidEscape(text)));
            }
        };
        self.pos += 1;
        Ok(decoded)
    }

    /// Decodes `\uXXXX` or `\UXXXXXXXX`; the cursor is on the `u`/`U`.
    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let width = match self.peek() {
            Some('u') => 4,
            Some('U') => 8,
            other => {
                let text = other.map(|c| format!("\\{c}")).unwrap_or_else(|| "\\".to_owned());
                return Err(self.error(ParseErrorKind::InvalidEscape(text)));
            }
        };
        let start = self.pos + 1;
        let end = start + width;
        let hex: String = self.chars.get(start..end).unwrap_or_default().iter().collect();
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|_| hex.len() == width)
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                self.pos = end;
                Ok(c)
            }
            None => Err(self.error(ParseErrorKind::InvalidEscape(format!("\\u{hex}")))),
        }
    }

    fn at_keyword(&mut self, after_string: bool) -> Result<TokenKind, ParseError> {
        self.pos += 1;
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                word.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if after_string && !word.is_empty() {
            return Ok(TokenKind::LangTag(word));
        }
        match word.as_str() {
            "prefix" => Ok(TokenKind::PrefixDirective),
            "base" => Ok(TokenKind::BaseDirective),
            _ => Err(self.error(ParseErrorKind::UnknownDirective(word))),
        }
    }

    fn number(&mut self) -> Result<TokenKind, ParseError> {
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            text.push(sign);
            self.pos += 1;
        }
        self.digits(&mut text);
        let mut decimal = false;
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            decimal = true;
            text.push('.');
            self.pos += 1;
            self.digits(&mut text);
        }
        let exponent = matches!(self.peek(), Some('e' | 'E'))
            && match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
        if exponent {
            for _ in 0..2 {
                if let Some(c) = self.peek() {
                    text.push(c);
                    self.pos += 1;
                }
            }
            self.digits(&mut text);
            return Ok(TokenKind::Double(text));
        }
        if !text.chars().any(|c| c.is_ascii_digit()) {
            let c = text.chars().next().unwrap_or('.');
            return Err(self.error(ParseErrorKind::UnexpectedChar(c)));
        }
        Ok(if decimal {
            TokenKind::Decimal(text)
        } else {
            TokenKind::Integer(text)
        })
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek().filter(char::is_ascii_digit) {
            text.push(c);
            self.pos += 1;
        }
    }

    /// Reads a prefixed name, blank node label or bare word.
    fn name(&mut self) -> TokenKind {
        let mut raw = String::new();
        let mut escaped_end = 0;
        while let Some(c) = self.peek() {
            if c == '\\' {
                if let Some(escaped) = self.peek_at(1).filter(|e| is_local_escape(*e)) {
                    raw.push(escaped);
                    escaped_end = raw.len();
                    self.pos += 2;
                    continue;
                }
                break;
            }
            if is_name_char(c) {
                raw.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        // A trailing dot terminates the statement rather than the name. An
        // escaped dot stays part of the name.
        while raw.len() > escaped_end && raw.ends_with('.') {
            raw.pop();
            self.pos -= 1;
        }

        if let Some(label) = raw.strip_prefix("_:") {
            return TokenKind::BlankNodeLabel(label.to_owned());
        }
        match raw.split_once(':') {
            Some((prefix, local)) => TokenKind::PrefixedName {
                prefix: prefix.to_owned(),
                local: local.to_owned(),
            },
            None => TokenKind::Word(raw),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '%' | '\u{b7}')
}

fn is_local_escape(c: char) -> bool {
    matches!(
        c,
        '_' | '~' | '.' | '-' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';'
            | '=' | '/' | '?' | '#' | '@' | '%'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        Lexer::new(text)
            .tokenize()
            .map(|tokens| tokens.into_iter().map(|t| t.kind).collect())
            .unwrap_or_default()
    }

    #[test]
    fn trailing_dot_is_not_part_of_name() {
        assert_eq!(
            kinds(":Antigone a :Character."),
            vec![
                TokenKind::PrefixedName {
                    prefix: String::new(),
                    local: "Antigone".to_owned()
                },
                TokenKind::Word("a".to_owned()),
                TokenKind::PrefixedName {
                    prefix: String::new(),
                    local: "Character".to_owned()
                },
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn escaped_dot_stays_in_name() {
        assert_eq!(
            kinds(r":v450\. ."),
            vec![
                TokenKind::PrefixedName {
                    prefix: String::new(),
                    local: "v450.".to_owned()
                },
                TokenKind::Dot,
            ]
        );
        assert_eq!(
            kinds(r":v450\..."),
            vec![
                TokenKind::PrefixedName {
                    prefix: String::new(),
                    local: "v450.".to_owned()
                },
                TokenKind::Dot,
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn lang_tag_only_after_string() {
        assert_eq!(
            kinds("\"Antigone\"@en"),
            vec![
                TokenKind::String("Antigone".to_owned()),
                TokenKind::LangTag("en".to_owned())
            ]
        );
        assert_eq!(kinds("@prefix"), vec![TokenKind::PrefixDirective]);
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 -3.5 1e10 ."),
            vec![
                TokenKind::Integer("42".to_owned()),
                TokenKind::Decimal("-3.5".to_owned()),
                TokenKind::Double("1e10".to_owned()),
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn long_string_tracks_lines() {
        let tokens = Lexer::new("\"\"\"one\ntwo\nthree\"\"\" .\n:x")
            .tokenize()
            .unwrap_or_default();
        assert_eq!(tokens[0].kind, TokenKind::String("one\ntwo\nthree".to_owned()));
        assert_eq!(tokens[1].line, 3);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(
            kinds(r#""a\"bé\n""#),
            vec![TokenKind::String("a\"bé\n".to_owned())]
        );
    }

    #[test]
    fn short_string_cannot_span_lines() {
        let err = Lexer::new("\n:a :b \"open\n:c :d :e .").tokenize();
        assert_eq!(
            err,
            Err(ParseError {
                line: 2,
                kind: ParseErrorKind::UnterminatedString
            })
        );
    }

    #[test]
    fn iri_must_close_on_its_line() {
        let err = Lexer::new("<http://example.org/\n>").tokenize();
        assert_eq!(
            err,
            Err(ParseError {
                line: 1,
                kind: ParseErrorKind::UnterminatedIri
            })
        );
    }
}
