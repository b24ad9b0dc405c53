//! MiniJ Compiler (minijc)
//!
//! Compiles MiniJ, a small Java subset with classes, single inheritance,
//! `int`, `int[]` and object types, to Jasmin assembly (`.j` files).
//!
//! ## Architecture
//!
//! - **parser**: Lexical analysis and parsing of MiniJ source into an AST
//! - **ast**: Abstract Syntax Tree, visitor and printers
//! - **wash**: Semantic analysis (Enter → Attr) and the dead-variable optimizer
//! - **codegen**: Lowering to stack instructions and Jasmin text
//! - **verify**: Structural checks over generated classes
//! - **bin**: Command-line interface
//!
//! ## Compilation Flow
//!
//! ```text
//! MiniJ Source → Parser → AST → Attr ──errors──→ Error::Semantic
//!                                 │
//!                                 └─ clean → Optimize → Codegen → Verify → .j files
//! ```

pub mod ast;
pub mod parser;
pub mod wash;
pub mod codegen;
pub mod verify;
pub mod error;
pub mod config;
pub mod consts;

pub use config::Config;
pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use codegen::ClassFile;
use wash::{DeadVarOptimizer, SemanticError, SemanticErrors};

/// Parse and analyze `source`, returning every semantic diagnostic sorted by line
///
/// Syntax errors are returned as `Err`; an empty list means the program is
/// well formed.
pub fn check(source: &str) -> Result<Vec<SemanticError>> {
    let program = parser::parse_minij(source)?;
    Ok(wash::analyze(&program))
}

/// Compile MiniJ source to class files without writing anything
///
/// Semantic errors abort before optimization and code generation and are
/// returned together as [`Error::Semantic`].
pub fn compile(source: &str, config: &Config) -> Result<Vec<ClassFile>> {
    log::info!("parse");
    let mut program = parser::parse_minij(source)?;
    log::debug!("parsed main class {} and {} class(es)", program.main.name, program.classes.len());

    log::info!("attr");
    let errors = wash::analyze(&program);
    if !errors.is_empty() {
        log::info!("attr reported {} error(s), skipping code generation", errors.len());
        return Err(Error::Semantic(SemanticErrors::from(errors)));
    }

    if config.optimize {
        log::info!("optimize");
        let report = DeadVarOptimizer::new().run(&mut program);
        log::debug!("optimize removed {} declaration(s)", report.removed.len());
    }

    log::info!("codegen");
    let class_files = codegen::generate(&program, config)?;
    log::info!("generated {} class file(s)", class_files.len());
    Ok(class_files)
}

/// Complete pipeline: compile `source` and write one `.j` file per class
///
/// Nothing is written when parsing or analysis fails.
pub fn compile2file(source: &str, output_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let class_files = compile(source, config)?;
    codegen::write_class_files(&class_files, output_dir, config)
}

/// Compile a MiniJ source file into `output_dir`
pub fn compile_file(input_path: &Path, output_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    log::info!("compiling {}", input_path.display());
    let source = std::fs::read_to_string(input_path)?;
    compile2file(&source, output_dir, config)
}
