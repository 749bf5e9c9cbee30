//! N-Triples: one triple per line, absolute IRIs only.

use super::turtle::{escape, Dialect, Parser};
use crate::error::Result;
use crate::types::{LiteralKind, Term, Triple};
use std::fmt::Write as _;

pub fn write<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> String {
    let mut triples: Vec<&Triple> = triples.into_iter().collect();
    triples.sort();
    let mut out = String::new();
    for triple in triples {
        let _ = write!(out, "<{}> <{}> ", triple.subject, triple.predicate);
        match &triple.object {
            Term::Iri(iri) => {
                let _ = write!(out, "<{iri}>");
            }
            Term::Literal(literal) => {
                let _ = write!(out, "\"{}\"", escape(literal.lexical()));
                match literal.kind() {
                    LiteralKind::Plain => {}
                    LiteralKind::Lang(tag) => {
                        let _ = write!(out, "@{tag}");
                    }
                    LiteralKind::Typed(datatype) => {
                        let _ = write!(out, "^^<{datatype}>");
                    }
                }
            }
        }
        out.push_str(" .\n");
    }
    out
}

pub fn parse(input: &str) -> Result<Vec<Triple>> {
    Parser::new(input, Dialect::NTriples).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProvGraphError;
    use crate::types::Literal;
    use crate::vocabulary::{prov, rdfs};

    #[test]
    fn one_line_per_triple() {
        let triples = [
            Triple::new("https://e.org/b", prov::USED, "https://e.org/a"),
            Triple::new("https://e.org/a", rdfs::LABEL, Literal::lang("Straßen\n", "de")),
        ];
        insta::assert_snapshot!(write(&triples), @r###"
        <https://e.org/a> <http://www.w3.org/2000/01/rdf-schema#label> "Straßen\n"@de .
        <https://e.org/b> <http://www.w3.org/ns/prov#used> <https://e.org/a> .
        "###);
        let mut parsed = parse(&write(&triples)).unwrap();
        parsed.sort();
        let mut expected = triples.to_vec();
        expected.sort();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn turtle_shorthand_is_rejected() {
        let err = parse("<https://e.org/a> a <https://e.org/T> .").unwrap_err();
        assert!(matches!(err, ProvGraphError::Parse { .. }));
    }
}
