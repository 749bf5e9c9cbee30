//! Tokenizer shared by the Turtle and N-Triples readers.

use crate::error::{ProvGraphError, Result};
use std::collections::VecDeque;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Iri(String),
    Prefixed { prefix: String, local: String },
    String(String),
    LangTag(String),
    DatatypeMarker,
    A,
    PrefixDirective,
    Number { lexical: String, datatype: &'static str },
    Boolean(bool),
    BlankNode(String),
    Dot,
    Semicolon,
    Comma,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Iri(iri) => format!("<{iri}>"),
            Token::Prefixed { prefix, local } => format!("{prefix}:{local}"),
            Token::String(value) => format!("\"{value}\""),
            Token::LangTag(tag) => format!("@{tag}"),
            Token::DatatypeMarker => "^^".to_string(),
            Token::A => "a".to_string(),
            Token::PrefixDirective => "@prefix".to_string(),
            Token::Number { lexical, .. } => lexical.clone(),
            Token::Boolean(value) => value.to_string(),
            Token::BlankNode(label) => format!("_:{label}"),
            Token::Dot => ".".to_string(),
            Token::Semicolon => ";".to_string(),
            Token::Comma => ",".to_string(),
        }
    }
}

pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    lookahead: VecDeque<(usize, Token)>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            lookahead: VecDeque::new(),
        }
    }

    pub(crate) fn line(&self) -> usize {
        self.lookahead.front().map_or(self.line, |(line, _)| *line)
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> ProvGraphError {
        ProvGraphError::Parse {
            line: self.line(),
            reason: reason.into(),
        }
    }

    pub(crate) fn peek(&mut self) -> Result<Option<&Token>> {
        if self.lookahead.is_empty() {
            self.fill()?;
        }
        Ok(self.lookahead.front().map(|(_, token)| token))
    }

    pub(crate) fn next_token(&mut self) -> Result<Option<Token>> {
        if self.lookahead.is_empty() {
            self.fill()?;
        }
        Ok(self.lookahead.pop_front().map(|(_, token)| token))
    }

    pub(crate) fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next_token()? {
            Some(token) if token == *expected => Ok(()),
            Some(token) => Err(self.error(format!(
                "expected {} but found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(self.error(format!("expected {} at end of input", expected.describe()))),
        }
    }

    fn push(&mut self, token: Token) {
        self.lookahead.push_back((self.line, token));
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }

    fn skip_trivia(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else if ch == '#' {
                while let Some(ch) = self.bump() {
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn fill(&mut self) -> Result<()> {
        self.skip_trivia();
        let Some(&ch) = self.chars.peek() else {
            return Ok(());
        };
        match ch {
            '<' => {
                self.bump();
                let iri = self.iri_ref()?;
                self.push(Token::Iri(iri));
            }
            '"' => {
                self.bump();
                let value = self.string()?;
                self.push(Token::String(value));
            }
            '@' => {
                self.bump();
                let word = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '-');
                match word.as_str() {
                    "" => return Err(self.error("empty language tag")),
                    "prefix" => self.push(Token::PrefixDirective),
                    "base" => return Err(self.error("@base is not supported")),
                    _ => self.push(Token::LangTag(word)),
                }
            }
            '^' => {
                self.bump();
                if self.bump() != Some('^') {
                    return Err(self.error("expected ^^"));
                }
                self.push(Token::DatatypeMarker);
            }
            '.' => {
                self.bump();
                self.push(Token::Dot);
            }
            ';' => {
                self.bump();
                self.push(Token::Semicolon);
            }
            ',' => {
                self.bump();
                self.push(Token::Comma);
            }
            '+' | '-' | '0'..='9' => self.number(),
            _ => self.word()?,
        }
        Ok(())
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !keep(ch) {
                break;
            }
            word.push(ch);
            self.bump();
        }
        word
    }

    fn iri_ref(&mut self) -> Result<String> {
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(iri),
                Some('\\') => iri.push(self.unicode_escape()?),
                Some(ch) if ch.is_whitespace() => {
                    return Err(self.error("whitespace inside IRI"));
                }
                Some(ch) => iri.push(ch),
                None => return Err(self.error("unterminated IRI")),
            }
        }
    }

    fn string(&mut self) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => {
                    let escaped = match self.chars.peek() {
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('f') => '\u{c}',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('u') | Some('U') => {
                            value.push(self.unicode_escape()?);
                            continue;
                        }
                        _ => return Err(self.error("invalid escape sequence")),
                    };
                    self.bump();
                    value.push(escaped);
                }
                Some('\n') => return Err(self.error("newline inside string literal")),
                Some(ch) => value.push(ch),
                None => return Err(self.error("unterminated string literal")),
            }
        }
    }

    /// `\uXXXX` or `\UXXXXXXXX`, the backslash already consumed.
    fn unicode_escape(&mut self) -> Result<char> {
        let width = match self.bump() {
            Some('u') => 4,
            Some('U') => 8,
            _ => return Err(self.error("invalid escape sequence")),
        };
        let mut digits = String::with_capacity(width);
        for _ in 0..width {
            match self.bump() {
                Some(ch) if ch.is_ascii_hexdigit() => digits.push(ch),
                _ => return Err(self.error("truncated unicode escape")),
            }
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid code point {digits}")))
    }

    fn number(&mut self) {
        let mut lexical = String::new();
        if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
            lexical.push(sign);
            self.bump();
        }
        lexical.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
        let mut datatype = crate::vocabulary::xsd::INTEGER;
        // a trailing dot ends the statement
        let mut probe = self.chars.clone();
        if probe.next() == Some('.') && probe.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.bump();
            lexical.push('.');
            lexical.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
            datatype = crate::vocabulary::xsd::DECIMAL;
        }
        if let Some(&exp @ ('e' | 'E')) = self.chars.peek() {
            self.bump();
            lexical.push(exp);
            if let Some(&sign @ ('+' | '-')) = self.chars.peek() {
                lexical.push(sign);
                self.bump();
            }
            lexical.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
            datatype = crate::vocabulary::xsd::DOUBLE;
        }
        self.push(Token::Number { lexical, datatype });
    }

    fn word(&mut self) -> Result<()> {
        let mut word = self.take_while(|ch| {
            !ch.is_whitespace() && !matches!(ch, ';' | ',' | '<' | '>' | '"' | '(' | ')' | '[' | ']' | '#')
        });
        let mut trailing_dots = 0;
        while word.ends_with('.') {
            word.pop();
            trailing_dots += 1;
        }
        let token = match word.as_str() {
            "" => {
                let ch = self.chars.peek().copied().unwrap_or(' ');
                return Err(self.error(format!("unexpected character {ch:?}")));
            }
            "a" => Token::A,
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            _ => match word.split_once(':') {
                Some(("_", label)) => Token::BlankNode(label.to_string()),
                Some((prefix, local)) => Token::Prefixed {
                    prefix: prefix.to_string(),
                    local: local.to_string(),
                },
                None => return Err(self.error(format!("unexpected word {word:?}"))),
            },
        };
        self.push(token);
        for _ in 0..trailing_dots {
            self.push(Token::Dot);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn prefixed_name_before_final_dot() {
        assert_eq!(
            tokens("ex:a a ex:B."),
            vec![
                Token::Prefixed { prefix: "ex".into(), local: "a".into() },
                Token::A,
                Token::Prefixed { prefix: "ex".into(), local: "B".into() },
                Token::Dot,
            ]
        );
    }

    #[test]
    fn literals_with_suffixes_and_escapes() {
        assert_eq!(
            tokens(r#""a\"bé"@en "1"^^<http://x/y> 0.5 . # trailing comment"#),
            vec![
                Token::String("a\"bé".into()),
                Token::LangTag("en".into()),
                Token::String("1".into()),
                Token::DatatypeMarker,
                Token::Iri("http://x/y".into()),
                Token::Number { lexical: "0.5".into(), datatype: crate::vocabulary::xsd::DECIMAL },
                Token::Dot,
            ]
        );
    }

    #[test]
    fn integer_followed_by_statement_end() {
        assert_eq!(
            tokens("12."),
            vec![
                Token::Number { lexical: "12".into(), datatype: crate::vocabulary::xsd::INTEGER },
                Token::Dot,
            ]
        );
    }

    #[test]
    fn errors_carry_the_line() {
        let mut lexer = Lexer::new("\n\n\"open");
        assert!(matches!(lexer.next_token(), Err(ProvGraphError::Parse { line: 3, .. })));
    }
}
