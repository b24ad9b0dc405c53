use std::collections::HashSet;

use crate::codegen::class::ClassFile;
use crate::codegen::descriptor::is_field_descriptor;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FieldVerifyError {
    #[error("Empty field name")]
    EmptyName,
    #[error("Duplicate field: {0}")]
    Duplicate(String),
    #[error("Invalid descriptor '{descriptor}' for field {name}")]
    InvalidDescriptor { name: String, descriptor: String },
}

pub type Result<T> = std::result::Result<T, FieldVerifyError>;

pub fn verify(class_file: &ClassFile) -> Result<()> {
    let mut seen = HashSet::new();
    for field in &class_file.fields {
        if field.name.is_empty() {
            return Err(FieldVerifyError::EmptyName);
        }
        if !seen.insert(field.name.as_str()) {
            return Err(FieldVerifyError::Duplicate(field.name.clone()));
        }
        if !is_field_descriptor(&field.descriptor) {
            return Err(FieldVerifyError::InvalidDescriptor {
                name: field.name.clone(),
                descriptor: field.descriptor.clone(),
            });
        }
    }
    Ok(())
}
