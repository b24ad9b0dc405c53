//! Verifiers for generated classes
//!
//! Structural checks over a [`ClassFile`](crate::codegen::ClassFile) run
//! before it is written out: class header, field table, and per-routine
//! control and stack flow.

mod verifier;
pub mod fields;
pub mod methods;

pub use verifier::{verify, VerifyError, VerifyResult};
