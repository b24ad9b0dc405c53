//! Code generation module for MiniJ
//!
//! Lowers an analyzed [`Program`] to one [`ClassFile`] per class and writes
//! each as a Jasmin `.j` file. Generation assumes attribution found no
//! errors.

pub mod class;
pub mod code;
pub mod descriptor;
pub mod error;
pub mod gen;
pub mod opcodes;
pub mod register_alloc;
pub mod writer;

pub use class::{ClassFile, FieldInfo, MethodInfo};
pub use error::{CodeGenError, CodeGenResult};
pub use opcodes::{Cond, Instruction, MemberRef};
pub use writer::class_file_to_text;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::ast::{AstVisitor, Program};
use crate::config::Config;
use crate::error::Result;
use crate::wash::enter::ClassTable;

/// Generate the class files for `program`, main class first
pub fn generate(program: &Program, config: &Config) -> Result<Vec<ClassFile>> {
    let classes = ClassTable::build(program);
    let mut gen = gen::Gen::new(&classes);
    gen.visit_program(program);
    let class_files = gen.into_class_files();

    let mut names = HashSet::new();
    for class_file in &class_files {
        let name = config.artifact_name(&class_file.name);
        if !names.insert(name.clone()) {
            return Err(CodeGenError::DuplicateArtifact { name }.into());
        }
        if config.verify {
            crate::verify::verify(class_file).map_err(|source| CodeGenError::Verification {
                class: class_file.name.clone(),
                source,
            })?;
        }
    }
    Ok(class_files)
}

/// Generate `program` and write one file per class into `output_dir`
pub fn generate_to_dir(program: &Program, output_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    let class_files = generate(program, config)?;
    write_class_files(&class_files, output_dir, config)
}

/// Write each class as `<name>.<ext>` under `output_dir`, creating it if needed
pub fn write_class_files(class_files: &[ClassFile], output_dir: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(class_files.len());
    for class_file in class_files {
        let path = output_dir.join(config.artifact_name(&class_file.name));
        std::fs::write(&path, class_file_to_text(class_file))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
