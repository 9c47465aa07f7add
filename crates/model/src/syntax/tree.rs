//! Generic syntax tree produced by the script front end.
//!
//! The tree knows nothing about pipelines: `stage('Build') { ... }` is just
//! a call with a string and a closure argument.

use super::lexer::Span;

/// A constant in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Node),
    Named { name: String, value: Node },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Constant(Constant),
    /// Double-quoted string with `$` placeholders.
    GString(String),
    Variable(String),
    Property {
        object: Box<Node>,
        name: String,
        operator: &'static str,
    },
    Index {
        object: Box<Node>,
        index: Box<Node>,
    },
    /// Method call. `object` is `None` for calls on the implicit receiver,
    /// which covers every pipeline section and step.
    Call {
        object: Option<Box<Node>>,
        method: String,
        arguments: Vec<Argument>,
    },
    New {
        class: String,
        arguments: Vec<Argument>,
    },
    List(Vec<Node>),
    Map(Vec<(String, Node)>),
    Closure {
        parameters: Vec<String>,
        body: Vec<Node>,
        /// Byte range of the text between the braces.
        inner: (usize, usize),
    },
    Paren(Box<Node>),
    Unary {
        operator: &'static str,
        operand: Box<Node>,
        postfix: bool,
    },
    Binary {
        operator: &'static str,
        left: Box<Node>,
        right: Box<Node>,
    },
    Ternary {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Declaration {
        name: String,
        value: Option<Box<Node>>,
    },
    Assignment {
        target: Box<Node>,
        operator: &'static str,
        value: Box<Node>,
    },
    Block(Vec<Node>),
    If {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },
    /// `for (...)` and `while (...)`.
    Loop {
        keyword: &'static str,
        header: Vec<Node>,
        body: Box<Node>,
    },
    Try {
        body: Box<Node>,
        catches: Vec<Node>,
        finally: Option<Box<Node>>,
    },
    Return(Option<Box<Node>>),
    Throw(Box<Node>),
    /// `break` and `continue`.
    Jump(&'static str),
    /// `@Name(arguments)` applied to the statement that follows it, as in
    /// `@Library('shared') _`. Named arguments use `key = value`.
    Annotation {
        name: String,
        arguments: Vec<Argument>,
        target: Box<Node>,
    },
}

impl Node {
    /// Source text covered by this node.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    /// The `(name, arguments)` of a call on the implicit receiver.
    pub fn as_call(&self) -> Option<(&str, &[Argument])> {
        match &self.kind {
            NodeKind::Call {
                object: None,
                method,
                arguments,
            } => Some((method, arguments)),
            _ => None,
        }
    }

    pub fn as_closure(&self) -> Option<(&[Node], (usize, usize))> {
        match &self.kind {
            NodeKind::Closure { body, inner, .. } => Some((body, *inner)),
            _ => None,
        }
    }
}
