//! Parser module for MiniJ
//!
//! This module handles lexical analysis and parsing of MiniJ source into an AST.

pub mod lexer;
pub mod parser;
pub mod error;

pub use lexer::{Lexer, LexicalToken, Token};
pub use parser::Parser;
pub use error::ParseError;

use crate::ast::Program;
use crate::error::Result;

/// Parse a MiniJ source file into a program
pub fn parse_minij(source: &str) -> Result<Program> {
    parser::parse(source)
}
