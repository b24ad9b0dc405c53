//! Abstract Syntax Tree (AST) representation for MiniJ
//!
//! The tree is built by the parser and then walked by every later phase:
//! attribution, dead-variable elimination and code generation. It is a closed
//! sum type, so every phase matches exhaustively on [`Stmt`] and [`Expr`].

mod nodes;
mod visitor;
mod printer;

pub use nodes::*;
pub use visitor::*;
pub use printer::*;

use std::fmt;

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Location {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// AST node trait that all AST nodes implement
pub trait AstNode {
    /// 1-based source line of the node
    fn line(&self) -> usize;

    /// Accept a visitor
    fn accept<'ast, V: AstVisitor<'ast>>(&'ast self, visitor: &mut V) -> V::Output;
}

/// A name as written in the source, with the line it appeared on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub line: usize,
}

impl Identifier {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self { name: name.into(), line }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
