use crate::codegen::class::ClassFile;
use crate::consts::INIT_METHOD;

use super::{fields, methods};

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Empty class name")]
    EmptyClassName,
    #[error("Class '{0}' has no superclass")]
    MissingSuperClass(String),
    #[error("Class '{0}' has no instance initializer")]
    MissingInitializer(String),
    #[error("Field error: {0}")]
    Field(#[from] fields::FieldVerifyError),
    #[error("Method error: {0}")]
    Method(#[from] methods::MethodVerifyError),
}

/// Verify the ClassFile by orchestrating all sub-verifiers
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    log::debug!("verify start: class={}", class_file.name);
    verify_this_class(class_file)?;
    verify_super_class(class_file)?;
    fields::verify(class_file)?;
    methods::verify(class_file)?;
    if class_file.method(INIT_METHOD).is_none() {
        return Err(VerifyError::MissingInitializer(class_file.name.clone()));
    }
    Ok(())
}

fn verify_this_class(class_file: &ClassFile) -> VerifyResult<()> {
    if class_file.name.trim().is_empty() {
        return Err(VerifyError::EmptyClassName);
    }
    Ok(())
}

fn verify_super_class(class_file: &ClassFile) -> VerifyResult<()> {
    if class_file.super_name.trim().is_empty() {
        return Err(VerifyError::MissingSuperClass(class_file.name.clone()));
    }
    Ok(())
}
