//! Per-routine flow checks
//!
//! Walks every reachable instruction with a worklist, carrying the operand
//! stack depth. Each label must be entered at a single depth, the depth must
//! stay within `.limit stack`, every local slot must be below
//! `.limit locals`, and no path may run past the last instruction.

use std::collections::{HashMap, HashSet};

use crate::codegen::class::{ClassFile, MethodInfo};
use crate::codegen::descriptor::parse_method_descriptor;
use crate::codegen::opcodes::Instruction;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MethodVerifyError {
    #[error("Duplicate method: {name}{descriptor}")]
    Duplicate { name: String, descriptor: String },
    #[error("Invalid descriptor '{descriptor}' in {method}")]
    BadDescriptor { method: String, descriptor: String },
    #[error("Label {label} defined twice in {method}")]
    DuplicateLabel { method: String, label: String },
    #[error("Jump to undefined label {label} in {method}")]
    UndefinedLabel { method: String, label: String },
    #[error("Stack underflow at instruction {index} in {method}")]
    StackUnderflow { method: String, index: usize },
    #[error("Stack depth {depth} exceeds limit {limit} at instruction {index} in {method}")]
    StackOverflow {
        method: String,
        index: usize,
        depth: u16,
        limit: u16,
    },
    #[error("Instruction {index} in {method} reached with depths {first} and {second}")]
    InconsistentDepth {
        method: String,
        index: usize,
        first: u16,
        second: u16,
    },
    #[error("Local slot {slot} outside limit {limit} in {method}")]
    LocalOutOfRange { method: String, slot: u16, limit: u16 },
    #[error("Parameters of {method} need {needed} locals but limit is {limit}")]
    ParametersExceedLocals { method: String, needed: u16, limit: u16 },
    #[error("Control falls off the end of {method}")]
    FallsOffEnd { method: String },
}

pub type Result<T> = std::result::Result<T, MethodVerifyError>;

pub fn verify(class_file: &ClassFile) -> Result<()> {
    let mut seen = HashSet::new();
    for method in &class_file.methods {
        if !seen.insert((method.name.as_str(), method.descriptor.as_str())) {
            return Err(MethodVerifyError::Duplicate {
                name: method.name.clone(),
                descriptor: method.descriptor.clone(),
            });
        }
        verify_method(method)?;
    }
    Ok(())
}

pub fn verify_method(method: &MethodInfo) -> Result<()> {
    let name = &method.name;
    let shape = parse_method_descriptor(&method.descriptor).ok_or_else(|| MethodVerifyError::BadDescriptor {
        method: name.clone(),
        descriptor: method.descriptor.clone(),
    })?;
    let needed = shape.arg_count as u16 + u16::from(!method.is_static);
    if needed > method.max_locals {
        return Err(MethodVerifyError::ParametersExceedLocals {
            method: name.clone(),
            needed,
            limit: method.max_locals,
        });
    }

    let code = &method.code;
    if code.is_empty() {
        return Err(MethodVerifyError::FallsOffEnd { method: name.clone() });
    }
    let labels = label_positions(method)?;

    let mut depths: Vec<Option<u16>> = vec![None; code.len()];
    let mut worklist = vec![(0usize, 0u16)];
    while let Some((index, depth)) = worklist.pop() {
        match depths[index] {
            Some(known) if known == depth => continue,
            Some(known) => {
                return Err(MethodVerifyError::InconsistentDepth {
                    method: name.clone(),
                    index,
                    first: known,
                    second: depth,
                })
            }
            None => depths[index] = Some(depth),
        }

        let instruction = &code[index];
        let after = step(method, index, instruction, depth)?;

        if let Some(label) = instruction.branch_target() {
            let target = labels.get(label).copied().ok_or_else(|| MethodVerifyError::UndefinedLabel {
                method: name.clone(),
                label: label.to_string(),
            })?;
            worklist.push((target, after));
        }
        if !instruction.ends_flow() {
            if index + 1 == code.len() {
                return Err(MethodVerifyError::FallsOffEnd { method: name.clone() });
            }
            worklist.push((index + 1, after));
        }
    }
    Ok(())
}

fn label_positions(method: &MethodInfo) -> Result<HashMap<&str, usize>> {
    let mut labels = HashMap::new();
    for (index, instruction) in method.code.iter().enumerate() {
        if let Instruction::Label(label) = instruction {
            if labels.insert(label.as_str(), index).is_some() {
                return Err(MethodVerifyError::DuplicateLabel {
                    method: method.name.clone(),
                    label: label.clone(),
                });
            }
        }
    }
    Ok(labels)
}

/// Depth after executing `instruction` at `depth`
fn step(method: &MethodInfo, index: usize, instruction: &Instruction, depth: u16) -> Result<u16> {
    if let Some(slot) = instruction.local_slot() {
        if slot >= method.max_locals {
            return Err(MethodVerifyError::LocalOutOfRange {
                method: method.name.clone(),
                slot,
                limit: method.max_locals,
            });
        }
    }
    let effect = instruction.stack_effect().ok_or_else(|| MethodVerifyError::BadDescriptor {
        method: method.name.clone(),
        descriptor: instruction.to_string(),
    })?;
    if depth < effect.pops {
        return Err(MethodVerifyError::StackUnderflow {
            method: method.name.clone(),
            index,
        });
    }
    let after = depth - effect.pops + effect.pushes;
    if after > method.max_stack {
        return Err(MethodVerifyError::StackOverflow {
            method: method.name.clone(),
            index,
            depth: after,
            limit: method.max_stack,
        });
    }
    Ok(after)
}
