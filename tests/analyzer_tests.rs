mod common;

use minijc::ast::Type;
use minijc::parser::parse_minij;
use minijc::wash::{self, ErrorCategory, SemanticAnalyzer, SemanticError, SemanticErrorKind};
use minijc::Result;

fn analyze(source: &str) -> Result<Vec<SemanticError>> {
    let program = parse_minij(source)?;
    Ok(wash::analyze(&program))
}

fn kinds(errors: &[SemanticError]) -> Vec<&SemanticErrorKind> {
    errors.iter().map(|e| &e.kind).collect()
}

#[test]
fn test_well_formed_programs_have_no_errors() -> Result<()> {
    for source in [common::FACTORIAL, common::ARRAY_SUM, common::INHERITANCE] {
        let errors = analyze(source)?;
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }
    Ok(())
}

#[test]
fn test_duplicate_local_reported_once_at_second_declaration() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().f());
    }
}
class A {
    public int f() {
        int x;
        int x;
        x = 1;
        return x;
    }
}"#,
    )?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(errors[0].line, 9);
    assert_eq!(errors[0].kind, SemanticErrorKind::DuplicateVariable { name: "x".into() });
    Ok(())
}

#[test]
fn test_object_assigned_to_int_is_one_mismatch() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().f());
    }
}
class A {
    public int f() {
        int x;
        x = new A();
        return x;
    }
}"#,
    )?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(errors[0].line, 9);
    assert_eq!(
        errors[0].kind,
        SemanticErrorKind::AssignMismatch {
            name: "x".into(),
            expected: Type::Int,
            found: Type::class("A"),
        }
    );
    assert_eq!(errors[0].kind.category(), ErrorCategory::Type);
    Ok(())
}

#[test]
fn test_division_by_literal_zero_only() -> Result<()> {
    let literal = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(10 / 0);
    }
}"#,
    )?;
    assert_eq!(kinds(&literal), vec![&SemanticErrorKind::DivisionByZero]);
    assert_eq!(literal[0].line, 3);
    assert_eq!(literal[0].kind.category(), ErrorCategory::StaticApproximation);

    let variable = analyze(
        r#"class M {
    public static void main(String[] a) {
        int zero;
        zero = 0;
        System.out.println(10 / zero);
    }
}"#,
    )?;
    assert!(variable.is_empty(), "{:?}", variable);
    Ok(())
}

const IDENTITY: &str = r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().f(CALL_ARGS));
    }
}
class A {
    public int f(int n) {
        return n;
    }
}"#;

#[test]
fn test_call_with_matching_argument_resolves_to_int() -> Result<()> {
    let program = parse_minij(&IDENTITY.replace("CALL_ARGS", "7"))?;
    let analyzer = SemanticAnalyzer::new(&program);
    assert!(analyzer.analyze().is_empty());
    match analyzer.class_table().find_method("A", "f") {
        wash::MethodLookup::Found { method, owner } => {
            assert_eq!(method.return_type, Type::Int);
            assert_eq!(owner.name.as_str(), "A");
        }
        other => panic!("f should resolve, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_call_with_no_arguments_is_one_count_error() -> Result<()> {
    let errors = analyze(&IDENTITY.replace("CALL_ARGS", ""))?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(
        errors[0].kind,
        SemanticErrorKind::ArgumentCount {
            method: "f".into(),
            expected: 1,
            found: 0,
        }
    );
    Ok(())
}

#[test]
fn test_call_with_wrong_argument_type() -> Result<()> {
    let errors = analyze(&IDENTITY.replace("CALL_ARGS", "new int[2]"))?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(matches!(
        &errors[0].kind,
        SemanticErrorKind::ArgumentType { index: 1, expected: Type::Int, found: Type::IntArray, .. }
    ));
    Ok(())
}

const HIERARCHY: &str = r#"class M {
    public static void main(String[] a) {
        System.out.println(new C().CALL());
    }
}
class A {
    public int base() {
        return 1;
    }
}
class B extends A {
}
class C extends B {
}"#;

#[test]
fn test_method_found_two_links_up() -> Result<()> {
    let errors = analyze(&HIERARCHY.replace("CALL", "base"))?;
    assert!(errors.is_empty(), "{:?}", errors);
    Ok(())
}

#[test]
fn test_missing_method_names_full_path() -> Result<()> {
    let errors = analyze(&HIERARCHY.replace("CALL", "missing"))?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(
        errors[0].to_string(),
        "line 3: method 'missing' does not exist in hierarchy: C -> B -> A"
    );
    assert_eq!(errors[0].kind.category(), ErrorCategory::Declaration);
    Ok(())
}

#[test]
fn test_subclass_instance_passes_as_parent_argument() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new User().take(new B()));
    }
}
class A {
}
class B extends A {
}
class User {
    public int take(A value) {
        A copy;
        copy = value;
        return 1;
    }
}"#,
    )?;
    // `copy` is written but never read
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::UnusedVariable { name: "copy".into() }]);
    assert_eq!(errors[0].line, 12);
    Ok(())
}

#[test]
fn test_written_but_never_read_is_unused() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        int unused;
        unused = 10;
        System.out.println(1);
    }
}"#,
    )?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
    assert_eq!(errors[0].kind.category(), ErrorCategory::Usage);
    Ok(())
}

#[test]
fn test_unused_field_reported_at_declaration() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().get());
    }
}
class A {
    int kept;
    int dropped;
    public int get() {
        return kept;
    }
}"#,
    )?;
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::UnusedVariable { name: "dropped".into() }]);
    assert_eq!(errors[0].line, 8);
    Ok(())
}

#[test]
fn test_parameters_are_never_unused() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().f(1, 2));
    }
}
class A {
    public int f(int used, int ignored) {
        return used;
    }
}"#,
    )?;
    assert!(errors.is_empty(), "{:?}", errors);
    Ok(())
}

#[test]
fn test_errors_are_sorted_by_line_and_all_reported() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(y);
        System.out.println(new int[3]);
        while (new A()) {
            z = 1;
        }
    }
}
class A {
    public int f() {
        return new A();
    }
}"#,
    )?;
    let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
    assert!(matches!(errors[0].kind, SemanticErrorKind::UndeclaredVariable { .. }));
    assert!(matches!(errors[1].kind, SemanticErrorKind::PrintNotInt { found: Type::IntArray }));
    assert!(matches!(errors[2].kind, SemanticErrorKind::ConditionNotInt { .. }));
    assert!(matches!(errors[3].kind, SemanticErrorKind::UndeclaredVariable { .. }));
    assert!(matches!(errors[4].kind, SemanticErrorKind::ReturnMismatch { .. }));
    assert_eq!(errors.len(), 5);
    Ok(())
}

#[test]
fn test_inner_scope_shadows_field() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new A().f());
    }
}
class A {
    int[] v;
    public int f() {
        int v;
        v = 3;
        return v;
    }
}"#,
    )?;
    // The local hides the field, which is then never read
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::UnusedVariable { name: "v".into() }]);
    assert_eq!(errors[0].line, 7);
    Ok(())
}

#[test]
fn test_array_checks() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        int n;
        int[] xs;
        n = 1;
        xs = new int[n];
        n[0] = 1;
        xs[xs] = 2;
        System.out.println(n.length + xs[0]);
    }
}"#,
    )?;
    assert_eq!(errors.len(), 3, "{:?}", errors);
    assert_eq!(errors[0].kind, SemanticErrorKind::NotAnArray { name: "n".into() });
    assert_eq!(errors[1].kind, SemanticErrorKind::ArrayIndexNotInt { found: Type::IntArray });
    assert_eq!(errors[2].kind, SemanticErrorKind::LengthOfNonArray { found: Type::Int });
    Ok(())
}

#[test]
fn test_this_in_entry_class_has_entry_class_type() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        if (this == this) System.out.println(1); else System.out.println(0);
    }
}"#,
    )?;
    assert!(errors.is_empty(), "{:?}", errors);

    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(this.f());
    }
}"#,
    )?;
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(matches!(errors[0].kind, SemanticErrorKind::MethodNotFound { .. }));
    Ok(())
}

#[test]
fn test_entry_class_name_reused_by_another_class() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(1);
    }
}
class M {
}"#,
    )?;
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::DuplicateClass { name: "M".into() }]);
    assert_eq!(errors[0].line, 6);
    Ok(())
}

#[test]
fn test_undeclared_assignment_target_skips_value() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        x = y;
    }
}"#,
    )?;
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::UndeclaredVariable { name: "x".into() }]);
    Ok(())
}

#[test]
fn test_element_store_does_not_read_array() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        int[] arr;
        arr = new int[2];
        arr[0] = 1;
    }
}"#,
    )?;
    assert_eq!(kinds(&errors), vec![&SemanticErrorKind::UnusedVariable { name: "arr".into() }]);
    assert_eq!(errors[0].line, 3);
    Ok(())
}

#[test]
fn test_class_declaration_errors() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new Ghost().f());
    }
}
class A extends Missing {
}
class A {
}
class P extends Q {
}
class Q extends P {
}"#,
    )?;
    let found = kinds(&errors);
    let ghosts = found
        .iter()
        .filter(|k| matches!(k, SemanticErrorKind::ClassNotFound { .. }))
        .count();
    assert_eq!(ghosts, 1);
    assert!(found.contains(&&SemanticErrorKind::ParentClassNotFound {
        class: "A".into(),
        parent: "Missing".into(),
    }));
    assert!(found.contains(&&SemanticErrorKind::DuplicateClass { name: "A".into() }));
    let cycles = errors
        .iter()
        .filter(|e| matches!(e.kind, SemanticErrorKind::CyclicInheritance { .. }))
        .count();
    // One report per class on the cycle
    assert_eq!(cycles, 2);
    Ok(())
}

#[test]
fn test_comparisons_need_matching_operands() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        if (new A() == new A()) System.out.println(1); else System.out.println(0);
        if (1 == new A()) System.out.println(1); else System.out.println(0);
        if (new A() < 1) System.out.println(1); else System.out.println(0);
    }
}
class A {
}"#,
    )?;
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(matches!(errors[0].kind, SemanticErrorKind::IncomparableOperands { .. }));
    assert_eq!(errors[0].line, 4);
    assert!(matches!(errors[1].kind, SemanticErrorKind::OperandMismatch { .. }));
    assert_eq!(errors[1].line, 5);
    Ok(())
}

#[test]
fn test_comparison_across_subclass_is_allowed() -> Result<()> {
    let errors = analyze(
        r#"class M {
    public static void main(String[] a) {
        System.out.println(new B().f(new A()));
    }
}
class A {
}
class B extends A {
    public int f(A x) {
        B y;
        y = this;
        return x == y;
    }
}"#,
    )?;
    assert!(errors.is_empty(), "{:?}", errors);
    Ok(())
}

#[test]
fn test_check_entry_point_reports_errors() -> Result<()> {
    let errors = minijc::check(
        r#"class M {
    public static void main(String[] a) {
        x = 1;
    }
}"#,
    )?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].to_string(), "line 3: variable 'x' not declared");
    Ok(())
}
