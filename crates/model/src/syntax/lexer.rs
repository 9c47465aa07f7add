//! Lexer for pipeline scripts
//!
//! Splits script source into tokens carrying byte spans and line/column
//! positions. Newlines are significant in the pipeline grammar, so they are
//! emitted as tokens rather than skipped with other whitespace.

use super::SyntaxDiagnostic;

/// Operators and punctuation, longest first so the scanner is greedy.
const OPERATORS: &[&str] = &[
    "==~", "?.", "*.", "->", "?:", "==", "!=", "<=", ">=", "&&", "||", "=~", "+=", "-=", "*=",
    "/=", "++", "--", "<<", ">>", "..", "{", "}", "(", ")", "[", "]", ",", ":", ";", ".", "?",
    "=", "<", ">", "!", "+", "-", "*", "/", "%", "@", "&", "|", "^", "~",
];

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    /// A string literal; `interpolated` marks double-quoted strings
    /// containing `$` placeholders.
    String { value: String, interpolated: bool },
    Integer(i64),
    Float(f64),
    Operator(&'static str),
    Newline,
    Eof,
}

/// Byte range plus the 1-based position of its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    /// Span from the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            end: other.end,
            ..self
        }
    }
}

/// Token with position information
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Operator(o) if o == op)
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(s) if s == name)
    }
}

struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    i: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    errors: Vec<SyntaxDiagnostic>,
}

/// Tokenize the input string into tokens.
///
/// Unexpected characters are all reported; an unterminated string or
/// comment ends the scan.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<SyntaxDiagnostic>> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().collect(),
        i: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        errors: Vec::new(),
    };
    lexer.run();
    if lexer.errors.is_empty() {
        Ok(lexer.tokens)
    } else {
        Err(lexer.errors)
    }
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        // Shebang line
        if self.source.starts_with("#!") {
            while self.current().is_some_and(|c| c != '\n') {
                self.bump();
            }
        }

        while let Some(c) = self.current() {
            let start = self.offset();
            let (line, column) = (self.line, self.column);

            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start, line, column);
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '\\' if self.peek_char(1) == Some('\n') => {
                    // Explicit line continuation
                    self.bump();
                    self.bump();
                }
                '/' if self.peek_char(1) == Some('/') => {
                    while self.current().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '/' if self.peek_char(1) == Some('*') => {
                    if !self.block_comment() {
                        self.error("unterminated comment", line, column);
                        return;
                    }
                }
                '\'' | '"' => {
                    if !self.string(c, start, line, column) {
                        return;
                    }
                }
                c if c.is_ascii_digit() => self.number(start, line, column),
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                    let mut value = String::new();
                    while let Some(c) = self.current() {
                        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                            value.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    self.push(TokenKind::Identifier(value), start, line, column);
                }
                _ => {
                    if let Some(op) = self.operator() {
                        for _ in 0..op.chars().count() {
                            self.bump();
                        }
                        self.push(TokenKind::Operator(op), start, line, column);
                    } else {
                        self.error(&format!("unexpected character: {c}"), line, column);
                        self.bump();
                    }
                }
            }
        }

        let end = self.source.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span {
                start: end,
                end,
                line: self.line,
                column: self.column,
            },
        });
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.i).map(|(_, c)| *c)
    }

    fn peek_char(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.i)
            .map_or(self.source.len(), |(offset, _)| *offset)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.current()?;
        self.i += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: u32, column: u32) {
        let end = self.offset();
        self.tokens.push(Token {
            kind,
            span: Span {
                start,
                end,
                line,
                column,
            },
        });
    }

    fn error(&mut self, message: &str, line: u32, column: u32) {
        self.errors
            .push(SyntaxDiagnostic::new(message, line, column));
    }

    fn operator(&self) -> Option<&'static str> {
        let rest = &self.source[self.offset()..];
        OPERATORS.iter().copied().find(|op| rest.starts_with(op))
    }

    fn block_comment(&mut self) -> bool {
        self.bump();
        self.bump();
        while let Some(c) = self.bump() {
            if c == '*' && self.current() == Some('/') {
                self.bump();
                return true;
            }
        }
        false
    }

    /// Scan a string literal. Returns false on an unterminated literal.
    fn string(&mut self, quote: char, start: usize, line: u32, column: u32) -> bool {
        let triple = self.peek_char(1) == Some(quote) && self.peek_char(2) == Some(quote);
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.bump();
        }

        let mut value = String::new();
        let mut interpolated = false;
        loop {
            let Some(c) = self.current() else {
                self.error("unterminated string literal", line, column);
                return false;
            };

            if c == quote
                && (!triple
                    || (self.peek_char(1) == Some(quote) && self.peek_char(2) == Some(quote)))
            {
                for _ in 0..quote_len {
                    self.bump();
                }
                break;
            }
            if c == '\n' && !triple {
                self.error("unterminated string literal", line, column);
                return false;
            }

            if c == '\\' {
                self.bump();
                match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('b') => value.push('\u{8}'),
                    Some('f') => value.push('\u{c}'),
                    Some('u') => {
                        let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(ch) => value.push(ch),
                            None => {
                                self.error("invalid unicode escape", self.line, self.column);
                            }
                        }
                    }
                    Some('\n') => {}
                    Some(other) => value.push(other),
                    None => {
                        self.error("unterminated string literal", line, column);
                        return false;
                    }
                }
                continue;
            }

            if c == '$' && quote == '"' {
                interpolated = true;
                if self.peek_char(1) == Some('{') {
                    // Keep the placeholder intact, braces included
                    let mut depth = 0usize;
                    while let Some(ch) = self.bump() {
                        value.push(ch);
                        match ch {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    continue;
                }
            }

            value.push(c);
            self.bump();
        }

        self.push(
            TokenKind::String {
                value,
                interpolated,
            },
            start,
            line,
            column,
        );
        true
    }

    fn number(&mut self, start: usize, line: u32, column: u32) {
        let mut text = String::new();
        let mut is_float = false;

        if self.current() == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            while let Some(c) = self.current().filter(|c| c.is_ascii_hexdigit() || *c == '_') {
                if c != '_' {
                    text.push(c);
                }
                self.bump();
            }
            match i64::from_str_radix(&text, 16) {
                Ok(n) => self.push(TokenKind::Integer(n), start, line, column),
                Err(e) => self.error(&format!("invalid number: {e}"), line, column),
            }
            return;
        }

        self.digits(&mut text);
        if self.current() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.bump();
            self.digits(&mut text);
        }
        if matches!(self.current(), Some('e' | 'E')) {
            let sign = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                self.digits(&mut text);
            }
        }
        match self.current() {
            Some('d' | 'D' | 'f' | 'F') => {
                is_float = true;
                self.bump();
            }
            Some('l' | 'L' | 'g' | 'G' | 'i' | 'I') => {
                self.bump();
            }
            _ => {}
        }

        let kind = if is_float {
            text.parse::<f64>().map(TokenKind::Float).ok()
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .or_else(|_| text.parse::<f64>().map(TokenKind::Float))
                .ok()
        };
        match kind {
            Some(kind) => self.push(kind, start, line, column),
            None => self.error(&format!("invalid number: {text}"), line, column),
        }
    }

    fn digits(&mut self, text: &mut String) {
        while let Some(c) = self.current().filter(|c| c.is_ascii_digit() || *c == '_') {
            if c != '_' {
                text.push(c);
            }
            self.bump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_tokenize_command_call() {
        assert_eq!(
            kinds("sh 'make'\n"),
            vec![
                TokenKind::Identifier("sh".to_string()),
                TokenKind::String {
                    value: "make".to_string(),
                    interpolated: false
                },
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_interpolated_string() {
        let tokens = kinds(r#"echo "v${env.BUILD_ID}""#);
        assert_eq!(
            tokens[1],
            TokenKind::String {
                value: "v${env.BUILD_ID}".to_string(),
                interpolated: true
            }
        );
    }

    #[test]
    fn test_tokenize_escapes_and_triple_quotes() {
        let tokens = kinds("'it\\'s' '''a\nb'''");
        assert_eq!(
            tokens[0],
            TokenKind::String {
                value: "it's".to_string(),
                interpolated: false
            }
        );
        assert_eq!(
            tokens[1],
            TokenKind::String {
                value: "a\nb".to_string(),
                interpolated: false
            }
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        assert_eq!(
            kinds("42 1.5 2e3 10L 0x1F"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Float(1.5),
                TokenKind::Float(2000.0),
                TokenKind::Integer(10),
                TokenKind::Integer(31),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_are_greedy() {
        assert_eq!(
            kinds("a ==~ b ?. c -> d"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Operator("==~"),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Operator("?."),
                TokenKind::Identifier("c".to_string()),
                TokenKind::Operator("->"),
                TokenKind::Identifier("d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_comments() {
        assert_eq!(
            kinds("a // note\n/* block\n comment */ b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Newline,
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_token_positions() {
        let tokens = tokenize("pipeline {\n  agent any\n}").unwrap();
        let agent = &tokens[3];
        assert!(agent.is_identifier("agent"));
        assert_eq!((agent.span.line, agent.span.column), (2, 3));
        assert_eq!(&"pipeline {\n  agent any\n}"[agent.span.start..agent.span.end], "agent");
    }

    #[test]
    fn test_unterminated_string() {
        let errors = tokenize("echo 'oops\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unterminated string literal");
        assert_eq!((errors[0].line, errors[0].column), (1, 6));
    }

    #[test]
    fn test_unexpected_characters_all_reported() {
        let errors = tokenize("a # b\nc `").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].line, 2);
    }
}
