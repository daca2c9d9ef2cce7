//! Tokenizer shared by the Kotlin and Groovy dialects.
//!
//! Dialect differences handled here:
//! - single-quoted strings are Groovy-only (plain, no templates)
//! - backtick identifiers are Kotlin-only
//!
//! Double-quoted and triple-quoted strings support `$name` / `${name}`
//! templates in both dialects.

use super::{Dialect, Source, Span};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StrPart {
    Text(String),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StrLit {
    pub(crate) parts: Vec<StrPart>,
    /// Bytes between the quotes.
    pub(crate) content: Span,
}

impl StrLit {
    /// The literal's value when it contains no templates.
    pub(crate) fn as_plain(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                StrPart::Text(text) => out.push_str(text),
                StrPart::Var(_) => return None,
            }
        }
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(StrLit),
    Number(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    Semicolon,
    Eq,
    Lt,
    Gt,
    Newline,
    Op(String),
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier `{name}`"),
            Self::Str(_) => "string literal".into(),
            Self::Number(n) => format!("number `{n}`"),
            Self::LParen => "`(`".into(),
            Self::RParen => "`)`".into(),
            Self::LBrace => "`{`".into(),
            Self::RBrace => "`}`".into(),
            Self::LBracket => "`[`".into(),
            Self::RBracket => "`]`".into(),
            Self::Comma => "`,`".into(),
            Self::Dot => "`.`".into(),
            Self::Colon => "`:`".into(),
            Self::Semicolon => "`;`".into(),
            Self::Eq => "`=`".into(),
            Self::Lt => "`<`".into(),
            Self::Gt => "`>`".into(),
            Self::Newline => "end of line".into(),
            Self::Op(op) => format!("`{op}`"),
            Self::Eof => "end of file".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

/// Operators that are recognised but carry no meaning for the manifest.
const OPERATORS: &[&str] = &[
    "===", "!==", "?:", "?.", "!!", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=",
    "->", "::", "..", "++", "--", "+", "-", "*", "/", "%", "!", "?", "&", "|", "@",
];

struct Lexer<'s, 'a> {
    source: &'s Source<'a>,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

pub(crate) fn tokenize(source: &Source<'_>) -> Result<Vec<Token>> {
    let mut lexer = Lexer {
        source,
        bytes: source.text.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl<'s, 'a> Lexer<'s, 'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.pos),
        });
    }

    fn run(&mut self) -> Result<()> {
        while let Some(b) = self.peek() {
            let start = self.pos;
            match b {
                b' ' | b'\t' | b'\r' | b'\x0c' => self.pos += 1,
                b'\n' => {
                    self.pos += 1;
                    self.push(TokenKind::Newline, start);
                }
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment()?,
                b'"' if self.starts_with("\"\"\"") => self.lex_raw_string()?,
                b'"' => self.lex_string(b'"', true)?,
                b'\'' => match self.source.dialect {
                    Dialect::Groovy => self.lex_string(b'\'', false)?,
                    Dialect::Kotlin => {
                        return Err(self.source.parse_error(
                            start,
                            "single-quoted strings are not valid in Kotlin DSL, use double quotes",
                        ));
                    }
                },
                b'`' => self.lex_backtick()?,
                b'0'..=b'9' => self.lex_number(),
                b if b == b'_' || b.is_ascii_alphabetic() || b >= 0x80 => self.lex_ident()?,
                b'(' => self.single(TokenKind::LParen),
                b')' => self.single(TokenKind::RParen),
                b'{' => self.single(TokenKind::LBrace),
                b'}' => self.single(TokenKind::RBrace),
                b'[' => self.single(TokenKind::LBracket),
                b']' => self.single(TokenKind::RBracket),
                b',' => self.single(TokenKind::Comma),
                b';' => self.single(TokenKind::Semicolon),
                b':' if self.peek_at(1) != Some(b':') => self.single(TokenKind::Colon),
                b'.' if self.peek_at(1) != Some(b'.') => self.single(TokenKind::Dot),
                b'=' if self.peek_at(1) != Some(b'=') => self.single(TokenKind::Eq),
                b'<' if self.peek_at(1) != Some(b'=') => self.single(TokenKind::Lt),
                b'>' if self.peek_at(1) != Some(b'=') => self.single(TokenKind::Gt),
                _ => self.lex_operator()?,
            }
        }
        let end = self.pos;
        self.push(TokenKind::Eof, end);
        Ok(())
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.push(kind, start);
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.starts_with("*/") {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(self
            .source
            .parse_error(start, "unterminated block comment"))
    }

    fn lex_operator(&mut self) -> Result<()> {
        let start = self.pos;
        let Some(op) = OPERATORS.iter().find(|op| self.starts_with(op)) else {
            let ch = self.source.text[start..].chars().next().unwrap_or_default();
            return Err(self
                .source
                .parse_error(start, format!("unexpected character `{ch}`")));
        };
        self.pos += op.len();
        self.push(TokenKind::Op((*op).to_string()), start);
        Ok(())
    }

    fn lex_ident(&mut self) -> Result<()> {
        let start = self.pos;
        // Identifiers may contain any non-ASCII letter; walk by char.
        let rest = &self.source.text[start..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            let ch = rest.chars().next().unwrap_or_default();
            return Err(self
                .source
                .parse_error(start, format!("unexpected character `{ch}`")));
        }
        self.pos += len;
        let name = rest[..len].to_string();
        self.push(TokenKind::Ident(name), start);
        Ok(())
    }

    fn lex_backtick(&mut self) -> Result<()> {
        let start = self.pos;
        if self.source.dialect == Dialect::Groovy {
            return Err(self
                .source
                .parse_error(start, "backtick identifiers are not valid in Groovy DSL"));
        }
        self.pos += 1;
        let name_start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'`' => {
                    let name = self.source.text[name_start..self.pos].to_string();
                    self.pos += 1;
                    if name.is_empty() {
                        return Err(self.source.parse_error(start, "empty backtick identifier"));
                    }
                    self.push(TokenKind::Ident(name), start);
                    return Ok(());
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }
        Err(self
            .source
            .parse_error(start, "unterminated backtick identifier"))
    }

    fn lex_number(&mut self) {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let continues = b.is_ascii_alphanumeric()
                || b == b'_'
                || (b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()));
            if !continues {
                break;
            }
            self.pos += 1;
        }
        let text = self.source.text[start..self.pos].to_string();
        self.push(TokenKind::Number(text), start);
    }

    /// Triple-quoted string: no escapes, templates allowed, may span lines.
    fn lex_raw_string(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 3;
        let content_start = self.pos;
        let mut builder = PartsBuilder::default();
        while self.pos < self.bytes.len() {
            if self.starts_with("\"\"\"") {
                let content = Span::new(content_start, self.pos);
                self.pos += 3;
                self.push(
                    TokenKind::Str(StrLit {
                        parts: builder.finish(),
                        content,
                    }),
                    start,
                );
                return Ok(());
            }
            if self.peek() == Some(b'$') && self.lex_template(&mut builder)? {
                continue;
            }
            self.push_char(&mut builder);
        }
        Err(self
            .source
            .parse_error(start, "unterminated string literal"))
    }

    fn lex_string(&mut self, quote: u8, templates: bool) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        let mut builder = PartsBuilder::default();

        while let Some(b) = self.peek() {
            match b {
                _ if b == quote => {
                    let content = Span::new(content_start, self.pos);
                    self.pos += 1;
                    self.push(
                        TokenKind::Str(StrLit {
                            parts: builder.finish(),
                            content,
                        }),
                        start,
                    );
                    return Ok(());
                }
                b'\n' => break,
                b'\\' => {
                    let escape_at = self.pos;
                    let escaped = match self.peek_at(1) {
                        Some(b'n') => '\n',
                        Some(b't') => '\t',
                        Some(b'r') => '\r',
                        Some(b'b') => '\x08',
                        Some(b'\\') => '\\',
                        Some(b'"') => '"',
                        Some(b'\'') => '\'',
                        Some(b'$') => '$',
                        _ => {
                            return Err(self
                                .source
                                .parse_error(escape_at, "invalid escape sequence"));
                        }
                    };
                    self.pos += 2;
                    builder.text.push(escaped);
                }
                b'$' if templates => {
                    if !self.lex_template(&mut builder)? {
                        self.push_char(&mut builder);
                    }
                }
                _ => self.push_char(&mut builder),
            }
        }
        Err(self
            .source
            .parse_error(start, "unterminated string literal"))
    }

    fn push_char(&mut self, builder: &mut PartsBuilder) {
        let ch = self.source.text[self.pos..].chars().next().unwrap_or_default();
        builder.text.push(ch);
        self.pos += ch.len_utf8().max(1);
    }

    /// Lexes `$name` or `${expr}` at the cursor. Returns `false` when the `$`
    /// does not start a template and should be taken literally.
    fn lex_template(&mut self, builder: &mut PartsBuilder) -> Result<bool> {
        let dollar = self.pos;
        match self.peek_at(1) {
            Some(b'{') => {
                let inner_start = self.pos + 2;
                let Some(close) = self.source.text[inner_start..].find('}') else {
                    return Err(self
                        .source
                        .parse_error(dollar, "unterminated string template"));
                };
                let inner = &self.source.text[inner_start..inner_start + close];
                if inner.contains('\n') {
                    return Err(self
                        .source
                        .parse_error(dollar, "unterminated string template"));
                }
                builder.var(inner.trim());
                self.pos = inner_start + close + 1;
                Ok(true)
            }
            Some(b) if b == b'_' || b.is_ascii_alphabetic() => {
                let name_start = self.pos + 1;
                let rest = &self.source.text[name_start..];
                let len = rest
                    .char_indices()
                    .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
                    .map_or(rest.len(), |(i, _)| i);
                builder.var(&rest[..len]);
                self.pos = name_start + len;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
struct PartsBuilder {
    parts: Vec<StrPart>,
    text: String,
}

impl PartsBuilder {
    fn var(&mut self, name: &str) {
        if !self.text.is_empty() {
            self.parts.push(StrPart::Text(std::mem::take(&mut self.text)));
        }
        self.parts.push(StrPart::Var(name.to_string()));
    }

    fn finish(mut self) -> Vec<StrPart> {
        if !self.text.is_empty() || self.parts.is_empty() {
            self.parts.push(StrPart::Text(self.text));
        }
        self.parts
    }
}
