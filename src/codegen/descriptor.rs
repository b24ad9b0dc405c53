//! Utilities to build and read method/field descriptors

use crate::ast::Type;
use crate::consts::ENTRY_ARGS_TYPE;

pub fn type_to_descriptor(ty: &Type) -> String {
    match ty {
        Type::Int => "I".to_string(),
        Type::IntArray => "[I".to_string(),
        Type::Class(name) if name == ENTRY_ARGS_TYPE => "[Ljava/lang/String;".to_string(),
        Type::Class(name) => format!("L{};", name.replace('.', "/")),
    }
}

pub fn method_descriptor<'t>(params: impl IntoIterator<Item = &'t Type>, ret: &Type) -> String {
    let mut d = String::from("(");
    for p in params {
        d.push_str(&type_to_descriptor(p));
    }
    d.push(')');
    d.push_str(&type_to_descriptor(ret));
    d
}

/// Descriptor assumed for a call whose target cannot be resolved: all-int
/// arguments and an int result
pub fn fallback_method_descriptor(arg_count: usize) -> String {
    format!("({}){}", "I".repeat(arg_count), "I")
}

/// Parsed shape of a method descriptor, enough for stack accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodShape {
    pub arg_count: usize,
    pub returns_value: bool,
}

/// Length of the field descriptor at the start of `s`
fn field_len(s: &[u8]) -> Option<usize> {
    let mut i = 0;
    while s.get(i) == Some(&b'[') {
        i += 1;
    }
    match s.get(i)? {
        b'I' | b'Z' | b'B' | b'C' | b'S' | b'J' | b'F' | b'D' => Some(i + 1),
        b'L' => {
            let end = s[i..].iter().position(|&c| c == b';')?;
            if end < 2 {
                return None;
            }
            Some(i + end + 1)
        }
        _ => None,
    }
}

pub fn is_field_descriptor(descriptor: &str) -> bool {
    field_len(descriptor.as_bytes()) == Some(descriptor.len())
}

pub fn parse_method_descriptor(descriptor: &str) -> Option<MethodShape> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return None;
    }
    let mut i = 1;
    let mut arg_count = 0;
    while bytes.get(i)? != &b')' {
        i += field_len(&bytes[i..])?;
        arg_count += 1;
    }
    let ret = &descriptor[i + 1..];
    let returns_value = match ret {
        "V" => false,
        _ if is_field_descriptor(ret) => true,
        _ => return None,
    };
    Some(MethodShape { arg_count, returns_value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_for_minij_types() {
        assert_eq!(type_to_descriptor(&Type::Int), "I");
        assert_eq!(type_to_descriptor(&Type::IntArray), "[I");
        assert_eq!(type_to_descriptor(&Type::class("Fac")), "LFac;");
        assert_eq!(type_to_descriptor(&Type::class(ENTRY_ARGS_TYPE)), "[Ljava/lang/String;");
        assert_eq!(
            method_descriptor(&[Type::Int, Type::IntArray, Type::class("A")], &Type::class("B")),
            "(I[ILA;)LB;"
        );
        assert_eq!(fallback_method_descriptor(2), "(II)I");
        assert_eq!(fallback_method_descriptor(0), "()I");
    }

    #[test]
    fn parse_method_shapes() {
        assert_eq!(
            parse_method_descriptor("(I[ILA;)LB;"),
            Some(MethodShape { arg_count: 3, returns_value: true })
        );
        assert_eq!(
            parse_method_descriptor("([Ljava/lang/String;)V"),
            Some(MethodShape { arg_count: 1, returns_value: false })
        );
        assert_eq!(parse_method_descriptor("()V"), Some(MethodShape { arg_count: 0, returns_value: false }));
        assert_eq!(parse_method_descriptor("(I"), None);
        assert_eq!(parse_method_descriptor("(L;)V"), None);
        assert_eq!(parse_method_descriptor("I)V"), None);
        assert_eq!(parse_method_descriptor("()Q"), None);
    }
}
