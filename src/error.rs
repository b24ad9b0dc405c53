use thiserror::Error;

use crate::wash::error::SemanticErrors;

/// Result type for minijc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the minijc compiler
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Lexical error: {message}")]
    Lexical { message: String },

    /// The complete, line-sorted list of semantic diagnostics
    #[error("{0}")]
    Semantic(SemanticErrors),

    #[error("Code generation error: {message}")]
    CodeGen { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a parse error with location information
    pub fn parse_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a lexical error
    pub fn lexical_error(message: impl Into<String>) -> Self {
        Self::Lexical { message: message.into() }
    }

    /// Create a code generation error
    pub fn codegen_error(message: impl Into<String>) -> Self {
        Self::CodeGen { message: message.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Semantic diagnostics carried by this error, if any
    pub fn semantic_errors(&self) -> Option<&SemanticErrors> {
        match self {
            Self::Semantic(errors) => Some(errors),
            _ => None,
        }
    }
}
