//! Errors raised while producing class files

use thiserror::Error;

use crate::verify::VerifyError;

#[derive(Error, Debug)]
pub enum CodeGenError {
    #[error("class {class} failed verification: {source}")]
    Verification {
        class: String,
        #[source]
        source: VerifyError,
    },
    #[error("more than one class would be written as {name}")]
    DuplicateArtifact { name: String },
}

pub type CodeGenResult<T> = std::result::Result<T, CodeGenError>;

impl From<CodeGenError> for crate::error::Error {
    fn from(err: CodeGenError) -> Self {
        crate::error::Error::codegen_error(err.to_string())
    }
}
