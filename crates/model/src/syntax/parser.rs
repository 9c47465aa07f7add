//! Recursive-descent parser for pipeline scripts
//!
//! Builds the generic syntax tree from lexer tokens. Covers the Groovy
//! subset pipeline scripts are written in: command calls (`sh 'make'`),
//! calls with trailing closures, closures, lists and maps, operators,
//! declarations and the usual control flow inside `script` blocks.

use super::lexer::{Span, Token, TokenKind};
use super::tree::{Argument, Constant, Node, NodeKind};
use super::SyntaxDiagnostic;

type ParseResult<T> = Result<T, SyntaxDiagnostic>;

/// Binary operators by precedence, lowest first.
const BINARY_LEVELS: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["==", "!=", "=~", "==~"],
    &["<", ">", "<=", ">=", "in", "instanceof", "as"],
    &[".."],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
];

/// Deepest nesting of blocks, brackets and expressions accepted before the
/// parser gives up with a diagnostic instead of exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 128;

const ASSIGNMENT_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/="];

/// Words that never start a command expression.
const KEYWORDS: &[&str] = &[
    "def", "if", "else", "for", "while", "try", "catch", "finally", "return", "throw", "break",
    "continue", "new", "true", "false", "null", "in", "instanceof", "as", "switch", "case",
];

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    current: usize,
    last_end: usize,
    /// Whether newlines separate statements in the current context.
    /// Closures and blocks push `true`; parentheses and brackets `false`.
    newline_modes: Vec<bool>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            current: 0,
            last_end: 0,
            newline_modes: vec![true],
            depth: 0,
        }
    }

    /// Parse a whole script into its top-level statements.
    pub fn program(&mut self) -> ParseResult<Vec<Node>> {
        let statements = self.statements(false)?;
        if !matches!(self.peek().kind, TokenKind::Eof) {
            return Err(self.unexpected());
        }
        Ok(statements)
    }

    // ---- token helpers ----

    fn newlines_significant(&self) -> bool {
        self.newline_modes.last().copied().unwrap_or(true)
    }

    fn skip_insignificant(&mut self) {
        if !self.newlines_significant() {
            self.skip_newlines();
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.tokens[self.current].kind, TokenKind::Newline) {
            self.current += 1;
        }
    }

    fn peek(&mut self) -> &Token {
        self.skip_insignificant();
        &self.tokens[self.current]
    }

    /// Token `offset` places ahead, without skipping newlines.
    fn raw(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> Token {
        self.skip_insignificant();
        let token = self.tokens[self.current].clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.current += 1;
            self.last_end = token.span.end;
        }
        token
    }

    fn check_op(&mut self, op: &str) -> bool {
        self.peek().is_operator(op)
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.check_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_op(&mut self, op: &str) -> ParseResult<Token> {
        if self.check_op(op) {
            Ok(self.advance())
        } else {
            let found = self.unexpected();
            Err(SyntaxDiagnostic::new(
                &format!("{}, expecting '{op}'", found.message),
                found.line,
                found.column,
            ))
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        let name = match &self.peek().kind {
            TokenKind::Identifier(name) => Some(name.clone()),
            _ => None,
        };
        match name {
            Some(name) => {
                self.advance();
                Ok(name)
            }
            None => Err(self.unexpected()),
        }
    }

    fn unexpected(&mut self) -> SyntaxDiagnostic {
        let token = self.peek().clone();
        let message = match token.kind {
            TokenKind::Eof => "unexpected end of input".to_string(),
            TokenKind::Newline => "unexpected newline".to_string(),
            _ => format!(
                "unexpected token: {}",
                &self.source[token.span.start..token.span.end]
            ),
        };
        SyntaxDiagnostic::new(&message, token.span.line, token.span.column)
    }

    fn node(&self, kind: NodeKind, start: Span) -> Node {
        Node {
            kind,
            span: Span {
                end: self.last_end.max(start.start),
                ..start
            },
        }
    }

    fn nested<T>(
        &mut self,
        significant: bool,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.deeper(|p| {
            p.newline_modes.push(significant);
            let result = f(p);
            p.newline_modes.pop();
            result
        })
    }

    fn deeper<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            let span = self.peek().span;
            return Err(SyntaxDiagnostic::new(
                "nesting too deep",
                span.line,
                span.column,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn next_non_newline(&self) -> &Token {
        let mut offset = 0;
        while matches!(self.raw(offset).kind, TokenKind::Newline) {
            offset += 1;
        }
        self.raw(offset)
    }

    // ---- statements ----

    fn statements(&mut self, in_braces: bool) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        loop {
            while matches!(self.raw(0).kind, TokenKind::Newline) || self.raw(0).is_operator(";")
            {
                self.advance_raw();
            }

            let token = self.peek();
            let (at_end, at_close) = (
                matches!(token.kind, TokenKind::Eof),
                token.is_operator("}"),
            );
            if at_end {
                if in_braces {
                    let found = self.unexpected();
                    return Err(SyntaxDiagnostic::new(
                        &format!("{}, expecting '}}'", found.message),
                        found.line,
                        found.column,
                    ));
                }
                break;
            }
            if in_braces && at_close {
                break;
            }

            statements.push(self.statement()?);

            let token = self.raw(0);
            let separated = matches!(token.kind, TokenKind::Newline | TokenKind::Eof)
                || token.is_operator(";")
                || (in_braces && token.is_operator("}"));
            if !separated {
                return Err(self.unexpected());
            }
        }
        Ok(statements)
    }

    fn advance_raw(&mut self) {
        let token = &self.tokens[self.current];
        if !matches!(token.kind, TokenKind::Eof) {
            self.last_end = token.span.end;
            self.current += 1;
        }
    }

    fn statement(&mut self) -> ParseResult<Node> {
        self.deeper(Self::simple_statement)
    }

    fn simple_statement(&mut self) -> ParseResult<Node> {
        let token = self.peek().clone();
        if token.is_operator("@") {
            return self.annotation(token.span);
        }
        if let TokenKind::Identifier(word) = &token.kind {
            match word.as_str() {
                "def" => return self.declaration(),
                "if" => return self.if_statement(),
                "for" => return self.loop_statement("for"),
                "while" => return self.loop_statement("while"),
                "try" => return self.try_statement(),
                "return" => {
                    self.advance();
                    let value = if self.at_statement_end() {
                        None
                    } else {
                        Some(Box::new(self.expression()?))
                    };
                    return Ok(self.node(NodeKind::Return(value), token.span));
                }
                "throw" => {
                    self.advance();
                    let value = self.expression()?;
                    return Ok(self.node(NodeKind::Throw(Box::new(value)), token.span));
                }
                "break" | "continue" => {
                    self.advance();
                    let keyword = if word == "break" { "break" } else { "continue" };
                    return Ok(self.node(NodeKind::Jump(keyword), token.span));
                }
                _ => {}
            }
        }

        if self.is_typed_declaration() {
            return self.declaration();
        }
        if self.is_command_start() {
            return self.command();
        }

        let expression = self.expression()?;
        let operator = match self.peek().kind {
            TokenKind::Operator(op) if ASSIGNMENT_OPERATORS.contains(&op) => Some(op),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            self.skip_newlines();
            let value = self.expression()?;
            return Ok(self.node(
                NodeKind::Assignment {
                    target: Box::new(expression),
                    operator,
                    value: Box::new(value),
                },
                token.span,
            ));
        }
        Ok(expression)
    }

    fn annotation(&mut self, start: Span) -> ParseResult<Node> {
        self.advance();
        let mut name = self.expect_identifier()?;
        while self.raw(0).is_operator(".") {
            self.advance_raw();
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
        let mut arguments = Vec::new();
        if self.raw(0).is_operator("(") {
            self.advance_raw();
            arguments = self.nested(false, |p| {
                let mut arguments = Vec::new();
                while !p.check_op(")") {
                    let named = matches!(p.peek().kind, TokenKind::Identifier(_))
                        && p.raw(1).is_operator("=");
                    if named {
                        let name = p.expect_identifier()?;
                        p.advance();
                        let value = p.expression()?;
                        arguments.push(Argument::Named { name, value });
                    } else {
                        arguments.push(Argument::Positional(p.expression()?));
                    }
                    if !p.eat_op(",") {
                        break;
                    }
                }
                p.expect_op(")")?;
                Ok(arguments)
            })?;
        }
        self.skip_newlines();
        let target = self.statement()?;
        Ok(self.node(
            NodeKind::Annotation {
                name,
                arguments,
                target: Box::new(target),
            },
            start,
        ))
    }

    fn at_statement_end(&self) -> bool {
        let token = self.raw(0);
        matches!(token.kind, TokenKind::Newline | TokenKind::Eof)
            || token.is_operator(";")
            || token.is_operator("}")
    }

    /// `String name = ...`
    fn is_typed_declaration(&self) -> bool {
        matches!(&self.raw(0).kind, TokenKind::Identifier(w) if !KEYWORDS.contains(&w.as_str()))
            && matches!(self.raw(1).kind, TokenKind::Identifier(_))
            && self.raw(2).is_operator("=")
    }

    /// `name arg, key: value` without parentheses.
    fn is_command_start(&self) -> bool {
        let is_name = matches!(
            &self.raw(0).kind,
            TokenKind::Identifier(w) if !KEYWORDS.contains(&w.as_str())
        );
        if !is_name {
            return false;
        }
        match &self.raw(1).kind {
            TokenKind::String { .. } | TokenKind::Integer(_) | TokenKind::Float(_) => true,
            TokenKind::Identifier(w) => !matches!(w.as_str(), "in" | "instanceof" | "as"),
            _ => false,
        }
    }

    fn command(&mut self) -> ParseResult<Node> {
        let start = self.peek().span;
        let method = self.expect_identifier()?;
        let mut arguments = Vec::new();
        loop {
            arguments.push(self.argument()?);
            if self.raw(0).is_operator(",") {
                self.advance_raw();
                self.skip_newlines();
                continue;
            }
            break;
        }
        Ok(self.node(
            NodeKind::Call {
                object: None,
                method,
                arguments,
            },
            start,
        ))
    }

    fn declaration(&mut self) -> ParseResult<Node> {
        let start = self.peek().span;
        // `def` or the declared type
        self.advance();
        let name = self.expect_identifier()?;
        let value = if self.check_op("=") {
            self.advance();
            self.skip_newlines();
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        Ok(self.node(NodeKind::Declaration { name, value }, start))
    }

    fn if_statement(&mut self) -> ParseResult<Node> {
        let start = self.advance().span;
        self.expect_op("(")?;
        let condition = self.nested(false, |p| {
            let condition = p.expression()?;
            p.expect_op(")")?;
            Ok(condition)
        })?;
        let then = self.body()?;

        let otherwise = if self.next_non_newline().is_identifier("else") {
            self.skip_newlines();
            self.advance();
            if self.peek().is_identifier("if") {
                Some(Box::new(self.if_statement()?))
            } else {
                Some(Box::new(self.body()?))
            }
        } else {
            None
        };

        Ok(self.node(
            NodeKind::If {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise,
            },
            start,
        ))
    }

    fn loop_statement(&mut self, keyword: &'static str) -> ParseResult<Node> {
        let start = self.advance().span;
        self.expect_op("(")?;
        let header = self.nested(false, |p| {
            let mut header = Vec::new();
            while !p.check_op(")") {
                header.push(p.statement()?);
                if !p.eat_op(";") {
                    break;
                }
            }
            p.expect_op(")")?;
            Ok(header)
        })?;
        let body = self.body()?;
        Ok(self.node(
            NodeKind::Loop {
                keyword,
                header,
                body: Box::new(body),
            },
            start,
        ))
    }

    fn try_statement(&mut self) -> ParseResult<Node> {
        let start = self.advance().span;
        let body = self.block()?;

        let mut catches = Vec::new();
        while self.next_non_newline().is_identifier("catch") {
            self.skip_newlines();
            self.advance();
            self.expect_op("(")?;
            self.nested(false, |p| {
                while !p.check_op(")") {
                    if matches!(p.peek().kind, TokenKind::Eof) {
                        return Err(p.unexpected());
                    }
                    p.advance();
                }
                p.advance();
                Ok(())
            })?;
            catches.push(self.block()?);
        }

        let finally = if self.next_non_newline().is_identifier("finally") {
            self.skip_newlines();
            self.advance();
            Some(Box::new(self.block()?))
        } else {
            None
        };

        Ok(self.node(
            NodeKind::Try {
                body: Box::new(body),
                catches,
                finally,
            },
            start,
        ))
    }

    /// Body of a control statement: a braced block or a single statement.
    fn body(&mut self) -> ParseResult<Node> {
        self.skip_newlines();
        if self.check_op("{") {
            self.block()
        } else {
            self.statement()
        }
    }

    fn block(&mut self) -> ParseResult<Node> {
        self.skip_newlines();
        let start = self.expect_op("{")?.span;
        let statements = self.nested(true, |p| {
            let statements = p.statements(true)?;
            p.expect_op("}")?;
            Ok(statements)
        })?;
        Ok(self.node(NodeKind::Block(statements), start))
    }

    // ---- expressions ----

    fn expression(&mut self) -> ParseResult<Node> {
        self.deeper(Self::ternary)
    }

    fn ternary(&mut self) -> ParseResult<Node> {
        let start = self.peek().span;
        let condition = self.binary(0)?;

        if self.eat_op("?:") {
            self.skip_newlines();
            let fallback = self.expression()?;
            return Ok(self.node(
                NodeKind::Binary {
                    operator: "?:",
                    left: Box::new(condition),
                    right: Box::new(fallback),
                },
                start,
            ));
        }
        if self.eat_op("?") {
            self.skip_newlines();
            let then = self.expression()?;
            self.skip_newlines();
            self.expect_op(":")?;
            self.skip_newlines();
            let otherwise = self.expression()?;
            return Ok(self.node(
                NodeKind::Ternary {
                    condition: Box::new(condition),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                },
                start,
            ));
        }
        Ok(condition)
    }

    /// Precedence climbing over `BINARY_LEVELS`, binding operators at
    /// `min_level` or tighter. Operators are left associative.
    fn binary(&mut self, min_level: usize) -> ParseResult<Node> {
        let start = self.peek().span;
        let mut left = self.unary()?;
        loop {
            let Some((level, operator)) = self
                .binary_operator()
                .filter(|(level, _)| *level >= min_level)
            else {
                break;
            };
            self.advance();
            self.skip_newlines();
            let right = self.binary(level + 1)?;
            left = self.node(
                NodeKind::Binary {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                start,
            );
        }
        Ok(left)
    }

    fn binary_operator(&mut self) -> Option<(usize, &'static str)> {
        let word = match &self.peek().kind {
            TokenKind::Operator(op) => *op,
            TokenKind::Identifier(word) => word.as_str(),
            _ => return None,
        };
        BINARY_LEVELS.iter().enumerate().find_map(|(level, operators)| {
            operators
                .iter()
                .copied()
                .find(|o| *o == word)
                .map(|o| (level, o))
        })
    }

    fn unary(&mut self) -> ParseResult<Node> {
        let start = self.peek().span;
        let operator = match self.peek().kind {
            TokenKind::Operator(op) if matches!(op, "!" | "-" | "+" | "~" | "++" | "--") => {
                Some(op)
            }
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let operand = self.deeper(Self::unary)?;
            return Ok(self.node(
                NodeKind::Unary {
                    operator,
                    operand: Box::new(operand),
                    postfix: false,
                },
                start,
            ));
        }
        self.postfix()
    }

    fn postfix(&mut self) -> ParseResult<Node> {
        let start = self.peek().span;
        let mut node = self.primary()?;

        loop {
            // Method chains may continue on the next line: `foo\n    .bar()`
            if matches!(self.raw(0).kind, TokenKind::Newline) {
                let next = self.next_non_newline();
                if next.is_operator(".") || next.is_operator("?.") {
                    self.skip_newlines();
                }
            }

            let accessor = match self.peek().kind {
                TokenKind::Operator(op) if matches!(op, "." | "?." | "*.") => Some(op),
                _ => None,
            };
            if let Some(operator) = accessor {
                self.advance();
                self.skip_newlines();
                let name = self.expect_identifier()?;
                node = if self.raw(0).is_operator("(") || self.raw(0).is_operator("{") {
                    let arguments = self.call_arguments()?;
                    self.node(
                        NodeKind::Call {
                            object: Some(Box::new(node)),
                            method: name,
                            arguments,
                        },
                        start,
                    )
                } else {
                    self.node(
                        NodeKind::Property {
                            object: Box::new(node),
                            name,
                            operator,
                        },
                        start,
                    )
                };
                continue;
            }

            if self.raw(0).is_operator("[") {
                self.advance_raw();
                let index = self.nested(false, |p| {
                    let index = p.expression()?;
                    p.expect_op("]")?;
                    Ok(index)
                })?;
                node = self.node(
                    NodeKind::Index {
                        object: Box::new(node),
                        index: Box::new(index),
                    },
                    start,
                );
                continue;
            }

            let increment = match self.raw(0).kind {
                TokenKind::Operator(op) if matches!(op, "++" | "--") => Some(op),
                _ => None,
            };
            if let Some(operator) = increment {
                self.advance_raw();
                node = self.node(
                    NodeKind::Unary {
                        operator,
                        operand: Box::new(node),
                        postfix: true,
                    },
                    start,
                );
                continue;
            }

            break;
        }
        Ok(node)
    }

    fn primary(&mut self) -> ParseResult<Node> {
        let token = self.peek().clone();
        let start = token.span;

        match token.kind {
            TokenKind::Integer(n) => {
                self.advance();
                Ok(self.node(NodeKind::Constant(Constant::Integer(n)), start))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(self.node(NodeKind::Constant(Constant::Float(f)), start))
            }
            TokenKind::String {
                value,
                interpolated,
            } => {
                self.advance();
                let kind = if interpolated {
                    NodeKind::GString(value)
                } else {
                    NodeKind::Constant(Constant::String(value))
                };
                Ok(self.node(kind, start))
            }
            TokenKind::Identifier(word) => {
                self.advance();
                match word.as_str() {
                    "true" => Ok(self.node(NodeKind::Constant(Constant::Boolean(true)), start)),
                    "false" => Ok(self.node(NodeKind::Constant(Constant::Boolean(false)), start)),
                    "null" => Ok(self.node(NodeKind::Constant(Constant::Null), start)),
                    "new" => self.new_instance(start),
                    _ => {
                        if self.raw(0).is_operator("(") || self.raw(0).is_operator("{") {
                            let arguments = self.call_arguments()?;
                            Ok(self.node(
                                NodeKind::Call {
                                    object: None,
                                    method: word,
                                    arguments,
                                },
                                start,
                            ))
                        } else {
                            Ok(self.node(NodeKind::Variable(word), start))
                        }
                    }
                }
            }
            TokenKind::Operator("(") => {
                self.advance();
                let inner = self.nested(false, |p| {
                    let inner = p.expression()?;
                    p.expect_op(")")?;
                    Ok(inner)
                })?;
                Ok(self.node(NodeKind::Paren(Box::new(inner)), start))
            }
            TokenKind::Operator("[") => self.list_or_map(),
            TokenKind::Operator("{") => self.closure(),
            _ => Err(self.unexpected()),
        }
    }

    fn new_instance(&mut self, start: Span) -> ParseResult<Node> {
        let mut class = self.expect_identifier()?;
        while self.raw(0).is_operator(".") {
            self.advance_raw();
            class.push('.');
            class.push_str(&self.expect_identifier()?);
        }
        let arguments = if self.raw(0).is_operator("(") {
            self.call_arguments()?
        } else {
            Vec::new()
        };
        Ok(self.node(NodeKind::New { class, arguments }, start))
    }

    /// Parenthesised arguments followed by any trailing closures on the
    /// same line.
    fn call_arguments(&mut self) -> ParseResult<Vec<Argument>> {
        let mut arguments = Vec::new();
        if self.raw(0).is_operator("(") {
            self.advance_raw();
            arguments = self.nested(false, |p| {
                let mut arguments = Vec::new();
                while !p.check_op(")") {
                    arguments.push(p.argument()?);
                    if !p.eat_op(",") {
                        break;
                    }
                }
                p.expect_op(")")?;
                Ok(arguments)
            })?;
        }
        while self.raw(0).is_operator("{") {
            arguments.push(Argument::Positional(self.closure()?));
        }
        Ok(arguments)
    }

    fn argument(&mut self) -> ParseResult<Argument> {
        self.skip_insignificant();
        let name = match &self.raw(0).kind {
            TokenKind::Identifier(name) if self.raw(1).is_operator(":") => Some(name.clone()),
            TokenKind::String {
                value,
                interpolated: false,
            } if self.raw(1).is_operator(":") => Some(value.clone()),
            _ => None,
        };
        match name {
            Some(name) => {
                self.advance();
                self.advance();
                self.skip_insignificant();
                let value = self.expression()?;
                Ok(Argument::Named { name, value })
            }
            None => Ok(Argument::Positional(self.expression()?)),
        }
    }

    fn list_or_map(&mut self) -> ParseResult<Node> {
        let start = self.advance().span;
        let kind = self.nested(false, |p| {
            if p.eat_op("]") {
                return Ok(NodeKind::List(Vec::new()));
            }
            if p.check_op(":") && p.raw(1).is_operator("]") {
                p.advance();
                p.advance();
                return Ok(NodeKind::Map(Vec::new()));
            }

            let is_map = p.is_map_key();
            let mut items = Vec::new();
            let mut entries = Vec::new();
            loop {
                if is_map {
                    let key = p.map_key()?;
                    p.expect_op(":")?;
                    entries.push((key, p.expression()?));
                } else {
                    items.push(p.expression()?);
                }
                if !p.eat_op(",") || p.check_op("]") {
                    break;
                }
            }
            p.expect_op("]")?;
            Ok(if is_map {
                NodeKind::Map(entries)
            } else {
                NodeKind::List(items)
            })
        })?;
        Ok(self.node(kind, start))
    }

    fn is_map_key(&mut self) -> bool {
        let key_like = matches!(
            self.peek().kind,
            TokenKind::Identifier(_) | TokenKind::String { .. } | TokenKind::Integer(_)
        );
        key_like && self.raw(1).is_operator(":")
    }

    fn map_key(&mut self) -> ParseResult<String> {
        let token = self.advance();
        match token.kind {
            TokenKind::Identifier(key) => Ok(key),
            TokenKind::String { value, .. } => Ok(value),
            TokenKind::Integer(n) => Ok(n.to_string()),
            _ => Err(SyntaxDiagnostic::new(
                "invalid map key",
                token.span.line,
                token.span.column,
            )),
        }
    }

    fn closure(&mut self) -> ParseResult<Node> {
        let open = self.expect_op("{")?;
        let (parameters, body, inner) = self.nested(true, |p| {
            let parameters = p.closure_parameters();
            let body = p.statements(true)?;
            let close_start = p.peek().span.start;
            p.expect_op("}")?;
            Ok((parameters, body, (open.span.end, close_start)))
        })?;
        Ok(self.node(
            NodeKind::Closure {
                parameters,
                body,
                inner,
            },
            open.span,
        ))
    }

    /// Consume `a, b ->` at the start of a closure, if present.
    fn closure_parameters(&mut self) -> Vec<String> {
        let mut index = self.current;
        let token_at = |index: usize| &self.tokens[index.min(self.tokens.len() - 1)];
        while matches!(token_at(index).kind, TokenKind::Newline) {
            index += 1;
        }

        let mut parameters = Vec::new();
        if !token_at(index).is_operator("->") {
            loop {
                let TokenKind::Identifier(first) = &token_at(index).kind else {
                    return Vec::new();
                };
                index += 1;
                // Typed parameter: `String s`
                let name = match &token_at(index).kind {
                    TokenKind::Identifier(second) => {
                        index += 1;
                        second.clone()
                    }
                    _ => first.clone(),
                };
                parameters.push(name);
                if token_at(index).is_operator(",") {
                    index += 1;
                    continue;
                }
                if token_at(index).is_operator("->") {
                    break;
                }
                return Vec::new();
            }
        }

        self.last_end = token_at(index).span.end;
        self.current = index + 1;
        parameters
    }
}
