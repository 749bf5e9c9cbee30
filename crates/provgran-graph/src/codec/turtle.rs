//! Turtle reader and writer.
//!
//! The writer groups triples by subject and predicate and compacts IRIs with
//! the vocabulary prefixes plus the graph namespace (`ex:`). The reader
//! accepts what the writer produces plus `@prefix`, `a`, `;`, `,`, numbers
//! and booleans. Blank nodes and collections are rejected.

use super::lexer::{Lexer, Token};
use crate::error::Result;
use crate::types::{Iri, Literal, LiteralKind, Term, Triple};
use crate::vocabulary::{rdf, xsd, PREFIXES};
use std::collections::HashMap;
use std::fmt::Write as _;

pub(crate) const GRAPH_PREFIX: &str = "ex";

/// Render triples as Turtle. `namespace` is bound to `ex:` when given.
pub fn write<'a>(triples: impl IntoIterator<Item = &'a Triple>, namespace: Option<&str>) -> String {
    let mut prefixes: Vec<(&str, &str)> = Vec::new();
    if let Some(namespace) = namespace {
        prefixes.push((GRAPH_PREFIX, namespace));
    }
    prefixes.extend(PREFIXES.iter().copied());

    let mut triples: Vec<&Triple> = triples.into_iter().collect();
    triples.sort();

    let mut out = String::new();
    for (prefix, iri) in &prefixes {
        let _ = writeln!(out, "@prefix {prefix}: <{iri}> .");
    }

    let mut index = 0;
    while index < triples.len() {
        let subject = &triples[index].subject;
        let end = triples[index..]
            .iter()
            .position(|triple| triple.subject != *subject)
            .map_or(triples.len(), |offset| index + offset);
        out.push('\n');
        out.push_str(&iri_term(subject, &prefixes));

        let block = &triples[index..end];
        let mut predicate_start = 0;
        while predicate_start < block.len() {
            let predicate = &block[predicate_start].predicate;
            let predicate_end = block[predicate_start..]
                .iter()
                .position(|triple| triple.predicate != *predicate)
                .map_or(block.len(), |offset| predicate_start + offset);
            let objects: Vec<String> = block[predicate_start..predicate_end]
                .iter()
                .map(|triple| object_term(&triple.object, &prefixes))
                .collect();
            let predicate_text = if predicate.as_str() == rdf::TYPE {
                "a".to_string()
            } else {
                iri_term(predicate, &prefixes)
            };
            let separator = if predicate_start == 0 { " " } else { " ;\n    " };
            let _ = write!(out, "{separator}{predicate_text} {}", objects.join(", "));
            predicate_start = predicate_end;
        }
        out.push_str(" .\n");
        index = end;
    }
    out
}

fn iri_term(iri: &Iri, prefixes: &[(&str, &str)]) -> String {
    prefixes
        .iter()
        .find_map(|(prefix, namespace)| {
            iri.as_str()
                .strip_prefix(namespace)
                .filter(|local| is_safe_local(local))
                .map(|local| format!("{prefix}:{local}"))
        })
        .unwrap_or_else(|| format!("<{}>", iri.as_str()))
}

fn object_term(term: &Term, prefixes: &[(&str, &str)]) -> String {
    match term {
        Term::Iri(iri) => iri_term(iri, prefixes),
        Term::Literal(literal) => {
            let mut text = format!("\"{}\"", escape(literal.lexical()));
            match literal.kind() {
                LiteralKind::Plain => {}
                LiteralKind::Lang(tag) => {
                    let _ = write!(text, "@{tag}");
                }
                LiteralKind::Typed(datatype) => {
                    let _ = write!(text, "^^{}", iri_term(datatype, prefixes));
                }
            }
            text
        }
    }
}

/// Local parts written in prefixed form: a letter or `_` followed by
/// letters, digits, `_` or `-`.
fn is_safe_local(local: &str) -> bool {
    let mut chars = local.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn parse(input: &str) -> Result<Vec<Triple>> {
    Parser::new(input, Dialect::Turtle).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Turtle,
    NTriples,
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    dialect: Dialect,
    prefixes: HashMap<String, String>,
    triples: Vec<Triple>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a str, dialect: Dialect) -> Self {
        Self {
            lexer: Lexer::new(input),
            dialect,
            prefixes: HashMap::new(),
            triples: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Triple>> {
        while let Some(token) = self.next()? {
            match token {
                Token::PrefixDirective => self.prefix_directive()?,
                token => {
                    let subject = self.subject(token)?;
                    self.predicate_object_list(&subject)?;
                }
            }
        }
        Ok(self.triples)
    }

    /// Next token, rejecting Turtle-only syntax in N-Triples mode.
    fn next(&mut self) -> Result<Option<Token>> {
        let token = self.lexer.next_token()?;
        if self.dialect == Dialect::NTriples {
            if let Some(token) = &token {
                let allowed = matches!(
                    token,
                    Token::Iri(_) | Token::String(_) | Token::LangTag(_) | Token::DatatypeMarker | Token::Dot
                        | Token::BlankNode(_)
                );
                if !allowed {
                    return Err(self
                        .lexer
                        .error(format!("{} is not valid N-Triples", token.describe())));
                }
            }
        }
        Ok(token)
    }

    fn required(&mut self, what: &str) -> Result<Token> {
        self.next()?
            .ok_or_else(|| self.lexer.error(format!("expected {what} at end of input")))
    }

    fn prefix_directive(&mut self) -> Result<()> {
        let prefix = match self.required("prefix name")? {
            Token::Prefixed { prefix, local } if local.is_empty() => prefix,
            other => return Err(self.lexer.error(format!("bad prefix name {}", other.describe()))),
        };
        let namespace = match self.required("namespace IRI")? {
            Token::Iri(iri) => iri,
            other => return Err(self.lexer.error(format!("bad namespace {}", other.describe()))),
        };
        self.lexer.expect(&Token::Dot)?;
        self.prefixes.insert(prefix, namespace);
        Ok(())
    }

    fn iri(&self, token: Token) -> Result<Iri> {
        match token {
            Token::Iri(iri) => Ok(Iri::new(iri)),
            Token::Prefixed { prefix, local } => self
                .prefixes
                .get(&prefix)
                .map(|namespace| Iri::new(format!("{namespace}{local}")))
                .ok_or_else(|| self.lexer.error(format!("undeclared prefix {prefix}:"))),
            Token::BlankNode(_) => Err(self.lexer.error("blank nodes are not supported")),
            other => Err(self.lexer.error(format!("expected an IRI, found {}", other.describe()))),
        }
    }

    fn subject(&self, token: Token) -> Result<Iri> {
        self.iri(token)
    }

    fn predicate_object_list(&mut self, subject: &Iri) -> Result<()> {
        loop {
            let predicate = match self.required("predicate")? {
                Token::A => Iri::from(rdf::TYPE),
                token => self.iri(token)?,
            };
            loop {
                let token = self.required("object")?;
                let object = self.object(token)?;
                self.triples.push(Triple::new(subject, &predicate, object));
                match self.required("'.', ';' or ','")? {
                    Token::Comma => continue,
                    Token::Semicolon => {
                        if self.lexer.peek()? == Some(&Token::Dot) {
                            self.lexer.next_token()?;
                            return Ok(());
                        }
                        break;
                    }
                    Token::Dot => return Ok(()),
                    other => {
                        return Err(self
                            .lexer
                            .error(format!("expected '.', ';' or ',' but found {}", other.describe())));
                    }
                }
            }
        }
    }

    fn object(&mut self, token: Token) -> Result<Term> {
        match token {
            Token::String(lexical) => match self.lexer.peek()?.cloned() {
                Some(Token::LangTag(tag)) => {
                    self.next()?;
                    Ok(Literal::lang(lexical, tag).into())
                }
                Some(Token::DatatypeMarker) => {
                    self.next()?;
                    let datatype = self.required("datatype")?;
                    let datatype = self.iri(datatype)?;
                    Ok(Literal::typed(lexical, datatype).into())
                }
                _ => Ok(Literal::plain(lexical).into()),
            },
            Token::Number { lexical, datatype } => Ok(Literal::typed(lexical, datatype).into()),
            Token::Boolean(value) => Ok(Literal::typed(value.to_string(), xsd::BOOLEAN).into()),
            token => Ok(self.iri(token)?.into()),
        }
    }
}
