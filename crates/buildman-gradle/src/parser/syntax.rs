//! Block-structured syntax tree for Gradle build scripts.
//!
//! The grammar covers the declarative subset both DSLs share:
//!
//! ```text
//! script     := stmt*
//! stmt       := ("val" | "var" | "def") NAME [":" TYPE] "=" expr
//!             | path ("=" | "+=") expr
//!             | invocation invocation*          (infix / command chains)
//! invocation := segment ("." segment)* [command-args] [block]
//! segment    := NAME ["<" NAME ">"] ["(" args ")"] ["[" expr "]"]
//! block      := "{" [params "->"] stmt* "}"
//! ```
//!
//! Anything else inside an expression (operators, lambdas) is kept as an
//! opaque node so that unrelated Gradle code does not break loading.

use super::lexer::{StrLit, Token, TokenKind};
use super::{Dialect, Source, Span};
use crate::error::{GradleError, Result};

pub(crate) type Block = Vec<Stmt>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub(crate) name: String,
    pub(crate) span: Span,
    pub(crate) type_arg: Option<String>,
    /// `None` when the segment was written without parentheses.
    pub(crate) args: Option<Vec<Arg>>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Invocation {
    pub(crate) segments: Vec<Segment>,
    /// Groovy command arguments or the operand of a Kotlin infix call.
    pub(crate) command_args: Vec<Arg>,
    pub(crate) block: Option<Block>,
    pub(crate) span: Span,
}

impl Invocation {
    pub(crate) fn names(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.name.as_str()).collect()
    }

    /// Arguments of the last segment, or the command arguments.
    pub(crate) fn args(&self) -> &[Arg] {
        match self.segments.last().and_then(|s| s.args.as_deref()) {
            Some(args) if !args.is_empty() => args,
            _ => &self.command_args,
        }
    }

    pub(crate) fn is_bare(&self) -> bool {
        self.segments.iter().all(|s| s.args.is_none())
            && self.command_args.is_empty()
            && self.block.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Arg {
    pub(crate) name: Option<String>,
    pub(crate) value: Expr,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Str(StrLit, Span),
    Number(String, Span),
    /// `a.b(c).d` style references and calls.
    Path(Vec<Segment>, Span),
    List(Vec<Expr>, Span),
    Closure(Block, Span),
    Opaque(Span),
}

impl Expr {
    pub(crate) fn span(&self) -> Span {
        match self {
            Self::Str(_, span)
            | Self::Number(_, span)
            | Self::Path(_, span)
            | Self::List(_, span)
            | Self::Closure(_, span)
            | Self::Opaque(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Stmt {
    Invoke(Vec<Invocation>),
    Assign {
        target: Vec<String>,
        value: Expr,
        /// Declared with `val`/`var`/`def`.
        local: bool,
        span: Span,
    },
    /// Statements that carry nothing for the manifest (`import`, annotations).
    Skipped(Span),
}

const INFIX_KEYWORDS: &[&str] = &["to", "as", "in", "is", "until", "downTo", "step"];
const LOCAL_KEYWORDS: &[&str] = &["val", "var", "def"];

/// Maximum depth of nested blocks and expressions.
const MAX_NESTING: usize = 128;

pub(crate) fn parse(source: &Source<'_>, tokens: Vec<Token>) -> Result<Block> {
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        depth: 0,
    };
    parser.statements(None)
}

struct Parser<'s, 'a> {
    source: &'s Source<'a>,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_, '_> {
    fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(0, |t| t.span.end)
    }

    fn bump(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or_else(|| Token {
                kind: TokenKind::Eof,
                span: self.span(),
            });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> GradleError {
        self.source.parse_error(self.span().start, message)
    }

    fn unexpected(&self, expected: &str) -> GradleError {
        self.error(format!(
            "expected {expected}, found {}",
            self.peek().describe()
        ))
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), TokenKind::Newline) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.pos += 1;
        }
    }

    fn skip_to_line_end(&mut self) {
        while !matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token> {
        if self.peek() == kind {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Statements up to the closing brace (when `open` is the opening brace)
    /// or to the end of input.
    fn statements(&mut self, open: Option<Span>) -> Result<Block> {
        let mut stmts = Vec::new();
        if open.is_some() {
            self.skip_closure_params();
        }
        loop {
            self.skip_separators();
            match self.peek() {
                TokenKind::Eof => {
                    if let Some(open) = open {
                        return Err(self
                            .source
                            .parse_error(open.start, "unclosed `{`, expected `}`"));
                    }
                    break;
                }
                TokenKind::RBrace => {
                    if open.is_some() {
                        self.bump();
                        break;
                    }
                    return Err(self.error("unexpected `}` without a matching `{`"));
                }
                _ => {}
            }

            stmts.push(self.statement()?);

            match self.peek() {
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => {}
                _ => return Err(self.unexpected("end of statement")),
            }
        }
        Ok(stmts)
    }

    /// Skips `a, b ->` at the start of a closure or lambda.
    fn skip_closure_params(&mut self) {
        let save = self.pos;
        self.skip_newlines();
        loop {
            match self.peek() {
                TokenKind::Ident(_) => {
                    self.pos += 1;
                    if matches!(self.peek(), TokenKind::Comma) {
                        self.pos += 1;
                        continue;
                    }
                    if matches!(self.peek(), TokenKind::Op(op) if op == "->") {
                        self.pos += 1;
                        return;
                    }
                }
                TokenKind::Op(op) if op == "->" => {
                    self.pos += 1;
                    return;
                }
                _ => {}
            }
            break;
        }
        self.pos = save;
    }

    fn statement(&mut self) -> Result<Stmt> {
        let start = self.span();

        match self.peek().clone() {
            TokenKind::Ident(kw) if kw == "import" || kw == "package" => {
                self.skip_to_line_end();
                return Ok(Stmt::Skipped(start.to(Span::new(0, self.prev_end()))));
            }
            TokenKind::Op(op) if op == "@" => {
                self.skip_to_line_end();
                return Ok(Stmt::Skipped(start.to(Span::new(0, self.prev_end()))));
            }
            TokenKind::Ident(kw)
                if LOCAL_KEYWORDS.contains(&kw.as_str())
                    && matches!(self.peek_at(1), TokenKind::Ident(_)) =>
            {
                return self.local_declaration(start);
            }
            TokenKind::Ident(_) => {}
            _ => return Err(self.unexpected("a statement")),
        }

        let head = self.invocation(false)?;

        if head.is_bare() {
            let assign = match self.peek() {
                TokenKind::Eq => true,
                TokenKind::Op(op) => matches!(op.as_str(), "+=" | "-="),
                _ => false,
            };
            if assign {
                self.bump();
                self.skip_newlines();
                let value = self.expr(true)?;
                let span = start.to(value.span());
                return Ok(Stmt::Assign {
                    target: head.segments.into_iter().map(|s| s.name).collect(),
                    value,
                    local: false,
                    span,
                });
            }
        }

        let mut chain = vec![head];
        while matches!(self.peek(), TokenKind::Ident(_)) {
            chain.push(self.invocation(true)?);
        }
        Ok(Stmt::Invoke(chain))
    }

    fn local_declaration(&mut self, start: Span) -> Result<Stmt> {
        self.bump();
        let name = match self.bump().kind {
            TokenKind::Ident(name) => name,
            _ => return Err(self.unexpected("a variable name")),
        };
        if matches!(self.peek(), TokenKind::Colon) {
            self.bump();
            self.type_ref()?;
        }
        match self.peek() {
            TokenKind::Eq => {
                self.bump();
                self.skip_newlines();
                let value = self.expr(true)?;
                let span = start.to(value.span());
                Ok(Stmt::Assign {
                    target: vec![name],
                    value,
                    local: true,
                    span,
                })
            }
            // `val x: String by project` and friends
            TokenKind::Ident(kw) if kw == "by" => {
                self.skip_to_line_end();
                Ok(Stmt::Skipped(start.to(Span::new(0, self.prev_end()))))
            }
            _ => Err(self.unexpected("`=`")),
        }
    }

    /// `String`, `List<String>`, `Map<String, Any>?`
    fn type_ref(&mut self) -> Result<()> {
        self.expect_ident("a type")?;
        while matches!(self.peek(), TokenKind::Dot) {
            self.bump();
            self.expect_ident("a type")?;
        }
        if matches!(self.peek(), TokenKind::Lt) {
            self.bump();
            loop {
                self.type_ref()?;
                match self.peek() {
                    TokenKind::Comma => {
                        self.bump();
                    }
                    TokenKind::Gt => {
                        self.bump();
                        break;
                    }
                    _ => return Err(self.unexpected("`,` or `>`")),
                }
            }
        }
        if matches!(self.peek(), TokenKind::Op(op) if op == "?") {
            self.bump();
        }
        Ok(())
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(String, Span)> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                let span = self.bump().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// One `a.b<T>(x).c` path with its arguments and trailing block.
    /// Kotlin accepts a parenthesis-free operand only in chain links
    /// (`version "1.0"`); Groovy accepts command arguments everywhere.
    fn invocation(&mut self, chain_link: bool) -> Result<Invocation> {
        let start = self.span();
        let segments = self.segments()?;

        let mut command_args = Vec::new();
        let last_has_parens = segments.last().is_some_and(|s| s.args.is_some());
        let allow_command = chain_link || self.source.dialect == Dialect::Groovy;
        if allow_command && !last_has_parens && self.starts_command_arg() {
            command_args = self.command_args()?;
        }

        let block = if matches!(self.peek(), TokenKind::LBrace) {
            Some(self.block()?)
        } else {
            None
        };

        Ok(Invocation {
            segments,
            command_args,
            block,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn segments(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        loop {
            let (name, span) = self.expect_ident("an identifier")?;
            let mut segment = Segment {
                name,
                span,
                type_arg: None,
                args: None,
            };

            if matches!(self.peek(), TokenKind::Lt)
                && matches!(self.peek_at(1), TokenKind::Ident(_))
                && matches!(self.peek_at(2), TokenKind::Gt)
            {
                self.bump();
                if let TokenKind::Ident(ty) = self.bump().kind {
                    segment.type_arg = Some(ty);
                }
                self.bump();
            }
            if matches!(self.peek(), TokenKind::LParen) {
                segment.args = Some(self.paren_args()?);
            }
            if matches!(self.peek(), TokenKind::LBracket) {
                self.bump();
                self.skip_newlines();
                self.expr(true)?;
                self.skip_newlines();
                self.expect(&TokenKind::RBracket, "`]`")?;
            }
            segments.push(segment);

            if self.continues_path() {
                continue;
            }
            break;
        }
        Ok(segments)
    }

    /// Consumes `.` / `?.`, also when the dot starts the next line.
    fn continues_path(&mut self) -> bool {
        let save = self.pos;
        self.skip_newlines();
        match self.peek() {
            TokenKind::Dot => {
                self.bump();
                true
            }
            TokenKind::Op(op) if op == "?." => {
                self.bump();
                true
            }
            _ => {
                self.pos = save;
                false
            }
        }
    }

    fn starts_command_arg(&self) -> bool {
        match self.peek() {
            TokenKind::Str(_) | TokenKind::Number(..) | TokenKind::LBracket => true,
            TokenKind::Op(op) => op == "-",
            TokenKind::Ident(_) => true,
            _ => false,
        }
    }

    fn command_args(&mut self) -> Result<Vec<Arg>> {
        let mut args = Vec::new();
        loop {
            args.push(self.arg(false, false)?);
            if matches!(self.peek(), TokenKind::Comma) {
                self.bump();
                self.skip_newlines();
                continue;
            }
            break;
        }
        Ok(args)
    }

    fn paren_args(&mut self) -> Result<Vec<Arg>> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let mut args = Vec::new();
        self.skip_newlines();
        if matches!(self.peek(), TokenKind::RParen) {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.arg(true, true)?);
            self.skip_newlines();
            match self.peek() {
                TokenKind::Comma => {
                    self.bump();
                    self.skip_newlines();
                    if matches!(self.peek(), TokenKind::RParen) {
                        self.bump();
                        break;
                    }
                }
                TokenKind::RParen => {
                    self.bump();
                    break;
                }
                _ => return Err(self.unexpected("`,` or `)`")),
            }
        }
        Ok(args)
    }

    fn arg(&mut self, allow_eq: bool, allow_lambda: bool) -> Result<Arg> {
        let start = self.span();
        let named = matches!(self.peek(), TokenKind::Ident(_))
            && match self.peek_at(1) {
                TokenKind::Colon => true,
                TokenKind::Eq => allow_eq,
                _ => false,
            };
        let name = if named {
            let (name, _) = self.expect_ident("an argument name")?;
            self.bump();
            self.skip_newlines();
            Some(name)
        } else {
            None
        };
        let value = self.expr(allow_lambda)?;
        let span = start.to(value.span());
        Ok(Arg { name, value, span })
    }

    fn expr(&mut self, allow_lambda: bool) -> Result<Expr> {
        let mut expr = self.operand(allow_lambda)?;
        loop {
            let binary = match self.peek() {
                TokenKind::Op(op) => !matches!(op.as_str(), "->" | "@" | "?."),
                TokenKind::Lt | TokenKind::Gt => true,
                TokenKind::Ident(kw) => INFIX_KEYWORDS.contains(&kw.as_str()),
                _ => false,
            };
            if !binary {
                break;
            }
            let op = self.bump();
            let TokenKind::Op(op_text) = &op.kind else {
                self.skip_newlines();
                let rhs = self.operand(allow_lambda)?;
                expr = Expr::Opaque(expr.span().to(rhs.span()));
                continue;
            };
            if matches!(op_text.as_str(), "!!" | "++" | "--") {
                expr = Expr::Opaque(expr.span().to(op.span));
                continue;
            }
            let ternary = op_text == "?";
            self.skip_newlines();
            let mut rhs = self.operand(allow_lambda)?;
            if ternary {
                self.skip_newlines();
                self.expect(&TokenKind::Colon, "`:`")?;
                self.skip_newlines();
                rhs = self.operand(allow_lambda)?;
            }
            expr = Expr::Opaque(expr.span().to(rhs.span()));
        }
        Ok(expr)
    }

    /// A primary followed by any `.member` accesses.
    fn operand(&mut self, allow_lambda: bool) -> Result<Expr> {
        let mut expr = self.primary(allow_lambda)?;
        loop {
            let member = match self.peek() {
                TokenKind::Dot => true,
                TokenKind::Op(op) => op == "?." || op == "!!",
                _ => false,
            };
            if !member {
                break;
            }
            if matches!(self.peek(), TokenKind::Op(op) if op == "!!") {
                let end = self.bump().span;
                expr = Expr::Opaque(expr.span().to(end));
                continue;
            }
            self.bump();
            self.segments()?;
            if allow_lambda && matches!(self.peek(), TokenKind::LBrace) {
                self.block()?;
            }
            expr = Expr::Opaque(expr.span().to(Span::new(0, self.prev_end())));
        }
        Ok(expr)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn primary(&mut self, allow_lambda: bool) -> Result<Expr> {
        self.nested(|p| p.primary_inner(allow_lambda))
    }

    fn primary_inner(&mut self, allow_lambda: bool) -> Result<Expr> {
        let start = self.span();
        match self.peek().clone() {
            TokenKind::Str(lit) => {
                let span = self.bump().span;
                Ok(Expr::Str(lit, span))
            }
            TokenKind::Number(n) => {
                let span = self.bump().span;
                Ok(Expr::Number(n, span))
            }
            TokenKind::Ident(_) => {
                let segments = self.segments()?;
                let path = start.to(Span::new(0, self.prev_end()));
                // `items.map { ... }`
                if allow_lambda && matches!(self.peek(), TokenKind::LBrace) {
                    self.block()?;
                    return Ok(Expr::Opaque(start.to(Span::new(0, self.prev_end()))));
                }
                Ok(Expr::Path(segments, path))
            }
            TokenKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                self.skip_newlines();
                while !matches!(self.peek(), TokenKind::RBracket) {
                    // Groovy map literals: `[key: value]`
                    let arg = self.arg(false, true)?;
                    items.push(arg.value);
                    self.skip_newlines();
                    match self.peek() {
                        TokenKind::Comma => {
                            self.bump();
                            self.skip_newlines();
                        }
                        TokenKind::RBracket => {}
                        _ => return Err(self.unexpected("`,` or `]`")),
                    }
                }
                let end = self.bump().span;
                Ok(Expr::List(items, start.to(end)))
            }
            TokenKind::LParen => {
                self.bump();
                self.skip_newlines();
                let inner = self.expr(true)?;
                self.skip_newlines();
                let end = self.expect(&TokenKind::RParen, "`)`")?.span;
                match inner {
                    Expr::Opaque(_) => Ok(Expr::Opaque(start.to(end))),
                    other => Ok(other),
                }
            }
            TokenKind::LBrace if allow_lambda => {
                let block = self.block()?;
                Ok(Expr::Closure(block, start.to(Span::new(0, self.prev_end()))))
            }
            TokenKind::Op(op) if matches!(op.as_str(), "-" | "!" | "+" | "::") => {
                self.bump();
                let operand = self.operand(allow_lambda)?;
                Ok(Expr::Opaque(start.to(operand.span())))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn block(&mut self) -> Result<Block> {
        self.nested(|p| {
            let open = p.expect(&TokenKind::LBrace, "`{`")?.span;
            p.statements(Some(open))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexer::tokenize;

    fn parse_ok(text: &str, dialect: Dialect) -> Block {
        let source = Source::new(text, dialect);
        let tokens = tokenize(&source).unwrap();
        parse(&source, tokens).unwrap()
    }

    fn parse_err(text: &str, dialect: Dialect) -> (u32, u32, String) {
        let source = Source::new(text, dialect);
        let tokens = tokenize(&source).unwrap();
        match parse(&source, tokens).unwrap_err() {
            GradleError::ParseError { location, message } => {
                (location.line, location.column, message)
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn head(stmt: &Stmt) -> &Invocation {
        match stmt {
            Stmt::Invoke(chain) => &chain[0],
            other => panic!("expected invocation, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_blocks() {
        let script = parse_ok(
            "plugins {\n    java\n    scala\n}\n\nrepositories {\n    mavenCentral()\n}\n",
            Dialect::Kotlin,
        );
        assert_eq!(script.len(), 2);
        let plugins = head(&script[0]);
        assert_eq!(plugins.names(), vec!["plugins"]);
        let body = plugins.block.as_ref().unwrap();
        assert_eq!(body.len(), 2);
        assert!(head(&body[0]).is_bare());

        let repos = head(&script[1]).block.as_ref().unwrap();
        let central = head(&repos[0]);
        assert_eq!(central.segments[0].args, Some(vec![]));
    }

    #[test]
    fn test_kotlin_infix_chain() {
        let script = parse_ok(
            "plugins {\n    id(\"org.x\") version \"1.0\" apply false\n}\n",
            Dialect::Kotlin,
        );
        let body = head(&script[0]).block.as_ref().unwrap();
        let Stmt::Invoke(chain) = &body[0] else {
            panic!("expected chain");
        };
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[1].names(), vec!["version"]);
        assert_eq!(chain[1].command_args.len(), 1);
        assert_eq!(chain[2].names(), vec!["apply"]);
    }

    #[test]
    fn test_groovy_command_chain() {
        let script = parse_ok(
            "plugins {\n    id 'org.x' version '1.0'\n}\n",
            Dialect::Groovy,
        );
        let body = head(&script[0]).block.as_ref().unwrap();
        let Stmt::Invoke(chain) = &body[0] else {
            panic!("expected chain");
        };
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].command_args.len(), 1);
        assert_eq!(chain[1].command_args.len(), 1);
    }

    #[test]
    fn test_groovy_named_command_args() {
        let script = parse_ok(
            "implementation group: 'a', name: 'b', version: '1'\n",
            Dialect::Groovy,
        );
        let inv = head(&script[0]);
        let names: Vec<_> = inv
            .args()
            .iter()
            .map(|a| a.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["group", "name", "version"]);
    }

    #[test]
    fn test_kotlin_named_args() {
        let script = parse_ok(
            "implementation(group = \"a\", name = \"b\", version = \"1\")\n",
            Dialect::Kotlin,
        );
        assert_eq!(head(&script[0]).args().len(), 3);
    }

    #[test]
    fn test_generic_segment_and_trailing_block() {
        let script = parse_ok(
            "tasks.named<Test>(\"test\") {\n    useJUnitPlatform()\n}\n",
            Dialect::Kotlin,
        );
        let inv = head(&script[0]);
        assert_eq!(inv.names(), vec!["tasks", "named"]);
        assert_eq!(inv.segments[1].type_arg.as_deref(), Some("Test"));
        assert_eq!(inv.block.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_path_continues_on_next_line() {
        let script = parse_ok("tasks\n    .test {\n    }\n", Dialect::Kotlin);
        assert_eq!(head(&script[0]).names(), vec!["tasks", "test"]);
    }

    #[test]
    fn test_assignments() {
        let script = parse_ok(
            "val scalaVersion: String = \"2.12.17\"\nversion = \"1.0\"\n",
            Dialect::Kotlin,
        );
        assert!(matches!(&script[0], Stmt::Assign { local: true, target, .. } if target == &vec!["scalaVersion".to_string()]));
        assert!(matches!(&script[1], Stmt::Assign { local: false, .. }));
    }

    #[test]
    fn test_opaque_expressions_do_not_fail() {
        let script = parse_ok(
            "val x = findProperty(\"a\") ?: \"b\"\njava.sourceCompatibility = JavaVersion.VERSION_17\nif (x == \"b\") {\n    println(x)\n} else {\n}\n",
            Dialect::Kotlin,
        );
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_closure_params_skipped() {
        let script = parse_ok(
            "configurations.all { c ->\n    c.resolutionStrategy.cacheChangingModulesFor(0, \"seconds\")\n}\n",
            Dialect::Groovy,
        );
        assert_eq!(head(&script[0]).block.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_imports_and_annotations_skipped() {
        let script = parse_ok(
            "import org.gradle.api.tasks.testing.logging.TestLogEvent.*\n@file:Suppress(\"x\")\njava\n",
            Dialect::Kotlin,
        );
        assert!(matches!(script[0], Stmt::Skipped(_)));
        assert!(matches!(script[1], Stmt::Skipped(_)));
        assert!(matches!(script[2], Stmt::Invoke(_)));
    }

    #[test]
    fn test_unclosed_brace() {
        let (line, column, message) = parse_err(
            "plugins {\n    java\n\ndependencies {\n}\n",
            Dialect::Kotlin,
        );
        assert_eq!((line, column), (1, 9));
        assert!(message.contains("unclosed `{`"));
    }

    #[test]
    fn test_stray_closing_brace() {
        let (line, column, message) = parse_err("java\n}\n", Dialect::Kotlin);
        assert_eq!((line, column), (2, 1));
        assert!(message.contains("unexpected `}`"));
    }

    #[test]
    fn test_unclosed_paren() {
        let (line, _, message) = parse_err(
            "dependencies {\n    implementation(\"a:b:1\"\n}\n",
            Dialect::Kotlin,
        );
        assert_eq!(line, 3);
        assert!(message.contains("expected `,` or `)`"));
    }

    #[test]
    fn test_garbage_after_statement() {
        let (_, _, message) = parse_err("java ) scala\n", Dialect::Kotlin);
        assert!(message.contains("expected end of statement"));
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let depth = 50_000;
        let text = format!("val x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
        let (line, column, message) = parse_err(&text, Dialect::Kotlin);
        assert_eq!(line, 1);
        assert_eq!(column as usize, "val x = ".len() + MAX_NESTING + 1);
        assert_eq!(message, "nesting too deep");

        let text = format!("{}\n{}", "a {\n".repeat(depth), "}\n".repeat(depth));
        let (_, _, message) = parse_err(&text, Dialect::Groovy);
        assert_eq!(message, "nesting too deep");
    }

    #[test]
    fn test_nesting_within_limit() {
        let text = format!("val x = {}1{}\n", "(".repeat(40), ")".repeat(40));
        assert_eq!(parse_ok(&text, Dialect::Kotlin).len(), 1);
        let text = format!("{}{}", "a {\n".repeat(40), "}\n".repeat(40));
        assert_eq!(parse_ok(&text, Dialect::Kotlin).len(), 1);
    }

    #[test]
    fn test_statement_cannot_start_with_string() {
        let (line, column, message) = parse_err("\"oops\"\n", Dialect::Kotlin);
        assert_eq!((line, column), (1, 1));
        assert!(message.contains("expected a statement"));
    }
}
