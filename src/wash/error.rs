//! Semantic diagnostics
//!
//! Every diagnostic is a [`SemanticError`]: a source line plus a typed kind.
//! The analyzer accumulates them and never stops at the first one.

use std::fmt;

use thiserror::Error;

use crate::ast::{BinaryOp, Type};

/// Broad class of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Duplicates, undeclared names, unknown classes or methods
    Declaration,
    /// Operand, assignment, argument and return mismatches
    Type,
    /// Problems caught by cheap static checks, such as a literal zero divisor
    StaticApproximation,
    /// Declared names that are never read
    Usage,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("variable '{name}' already declared in this scope")]
    DuplicateVariable { name: String },

    #[error("variable '{name}' not declared")]
    UndeclaredVariable { name: String },

    #[error("class '{name}' already declared")]
    DuplicateClass { name: String },

    #[error("class '{name}' not found")]
    ClassNotFound { name: String },

    #[error("parent class '{parent}' of '{class}' not found")]
    ParentClassNotFound { class: String, parent: String },

    #[error("cyclic inheritance: {path}")]
    CyclicInheritance { path: String },

    #[error("method '{method}' does not exist in hierarchy: {path}")]
    MethodNotFound { method: String, path: String },

    #[error("wrong number of arguments for '{method}': expected {expected}, got {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("argument {index} of method '{method}': cannot pass {found} where {expected} expected")]
    ArgumentType {
        method: String,
        index: usize,
        expected: Type,
        found: Type,
    },

    #[error("method call requires an object receiver, found {found}")]
    CallOnNonObject { found: Type },

    #[error("cannot initialize '{name}' of type {expected} with {found}")]
    InitializerMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("cannot assign {found} to '{name}' of type {expected}")]
    AssignMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("method '{method}' cannot return {found} where {expected} expected")]
    ReturnMismatch {
        method: String,
        expected: Type,
        found: Type,
    },

    #[error("condition must be int, found {found}")]
    ConditionNotInt { found: Type },

    #[error("print argument must be int, found {found}")]
    PrintNotInt { found: Type },

    #[error("'{name}' is not an array")]
    NotAnArray { name: String },

    #[error("array access requires int[], found {found}")]
    IndexedNonArray { found: Type },

    #[error("length only applies to arrays, found {found}")]
    LengthOfNonArray { found: Type },

    #[error("array index must be int, found {found}")]
    ArrayIndexNotInt { found: Type },

    #[error("array element must be int, found {found}")]
    ArrayElementNotInt { found: Type },

    #[error("array size must be int, found {found}")]
    ArraySizeNotInt { found: Type },

    #[error("operator '{op}' requires int operands, found {left} and {right}")]
    OperandMismatch { op: BinaryOp, left: Type, right: Type },

    #[error("operator '{op}' cannot compare {left} with {right}")]
    IncomparableOperands { op: BinaryOp, left: Type, right: Type },

    #[error("division by zero")]
    DivisionByZero,

    #[error("'this' used outside of a class")]
    ThisOutsideClass,

    #[error("variable '{name}' declared but never used")]
    UnusedVariable { name: String },
}

impl SemanticErrorKind {
    pub fn category(&self) -> ErrorCategory {
        use SemanticErrorKind::*;
        match self {
            DuplicateVariable { .. }
            | UndeclaredVariable { .. }
            | DuplicateClass { .. }
            | ClassNotFound { .. }
            | ParentClassNotFound { .. }
            | CyclicInheritance { .. }
            | MethodNotFound { .. }
            | ThisOutsideClass => ErrorCategory::Declaration,
            ArgumentCount { .. }
            | ArgumentType { .. }
            | CallOnNonObject { .. }
            | InitializerMismatch { .. }
            | AssignMismatch { .. }
            | ReturnMismatch { .. }
            | ConditionNotInt { .. }
            | PrintNotInt { .. }
            | NotAnArray { .. }
            | IndexedNonArray { .. }
            | LengthOfNonArray { .. }
            | ArrayIndexNotInt { .. }
            | ArrayElementNotInt { .. }
            | ArraySizeNotInt { .. }
            | OperandMismatch { .. }
            | IncomparableOperands { .. } => ErrorCategory::Type,
            DivisionByZero => ErrorCategory::StaticApproximation,
            UnusedVariable { .. } => ErrorCategory::Usage,
        }
    }
}

/// A diagnostic attached to a source line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct SemanticError {
    pub line: usize,
    pub kind: SemanticErrorKind,
}

impl SemanticError {
    pub fn new(line: usize, kind: SemanticErrorKind) -> Self {
        Self { line, kind }
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// Line-sorted list of diagnostics from one analysis
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SemanticErrors(pub Vec<SemanticError>);

impl SemanticErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SemanticError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<SemanticError> {
        self.0
    }
}

impl From<Vec<SemanticError>> for SemanticErrors {
    fn from(errors: Vec<SemanticError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for SemanticErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} semantic error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SemanticErrors {
    type Item = &'a SemanticError;
    type IntoIter = std::slice::Iter<'a, SemanticError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
