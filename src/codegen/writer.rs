//! Textual serialization of a [`ClassFile`] as Jasmin assembly

use std::fmt::Write;

use super::class::{ClassFile, MethodInfo};
use super::opcodes::Instruction;

const INDENT: &str = "    ";

/// Render `class_file` as the contents of a `.j` file
pub fn class_file_to_text(class_file: &ClassFile) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_class(&mut out, class_file);
    out
}

fn write_class(out: &mut String, class_file: &ClassFile) -> std::fmt::Result {
    writeln!(out, ".class public {}", class_file.name)?;
    writeln!(out, ".super {}", class_file.super_name)?;

    if !class_file.fields.is_empty() {
        writeln!(out)?;
        for field in &class_file.fields {
            writeln!(out, ".field public {} {}", field.name, field.descriptor)?;
        }
    }

    for method in &class_file.methods {
        writeln!(out)?;
        write_method(out, method)?;
    }
    Ok(())
}

fn write_method(out: &mut String, method: &MethodInfo) -> std::fmt::Result {
    let modifiers = if method.is_static { "public static" } else { "public" };
    writeln!(out, ".method {} {}{}", modifiers, method.name, method.descriptor)?;
    writeln!(out, "{}.limit stack {}", INDENT, method.max_stack)?;
    writeln!(out, "{}.limit locals {}", INDENT, method.max_locals)?;
    for instruction in &method.code {
        match instruction {
            Instruction::Label(_) => writeln!(out, "{}", instruction)?,
            _ => writeln!(out, "{}{}", INDENT, instruction)?,
        }
    }
    writeln!(out, ".end method")
}
