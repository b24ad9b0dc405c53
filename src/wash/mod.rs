//! Semantic analysis pipeline
//!
//! The phases run between parsing and code generation:
//!
//! - Enter: class table construction (`enter`)
//! - Attr: name resolution, type checking and usage tracking (`attr`)
//! - Optimize: dead local and field declaration removal (`optimize`)
//!
//! Attribution never stops early. It returns every diagnostic it found,
//! stably sorted by line, and an empty list means the program may be lowered
//! to bytecode.

pub mod enter;
pub mod attr;
pub mod scope;
pub mod error;
pub mod optimize;

use crate::ast::{AstVisitor, Program};

pub use enter::{ClassTable, MethodLookup};
pub use error::{ErrorCategory, SemanticError, SemanticErrorKind, SemanticErrors};
pub use optimize::{DeadVarOptimizer, OptimizationReport};
pub use scope::{ScopeError, ScopeStack, Symbol};

/// Runs Enter then Attr over one program
pub struct SemanticAnalyzer<'ast> {
    program: &'ast Program,
    classes: ClassTable<'ast>,
}

impl<'ast> SemanticAnalyzer<'ast> {
    pub fn new(program: &'ast Program) -> Self {
        Self {
            program,
            classes: ClassTable::build(program),
        }
    }

    pub fn class_table(&self) -> &ClassTable<'ast> {
        &self.classes
    }

    /// Check the whole program and return the line-sorted diagnostics
    pub fn analyze(&self) -> Vec<SemanticError> {
        log::debug!("attr start: main={}, classes={}", self.program.main.name, self.classes.len());

        let mut attr = attr::Attr::new(&self.classes);
        attr.visit_program(self.program);
        let mut errors = attr.into_errors();
        errors.sort_by_key(|e| e.line);

        log::debug!("attr complete: {} error(s)", errors.len());
        errors
    }
}

/// Analyze `program` and return its diagnostics sorted by line
pub fn analyze(program: &Program) -> Vec<SemanticError> {
    SemanticAnalyzer::new(program).analyze()
}
