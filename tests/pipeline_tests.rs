mod common;

use std::fs;

use minijc::codegen::generate_to_dir;
use minijc::parser::parse_minij;
use minijc::{compile2file, compile_file, Config, Error, Result};
use tempfile::tempdir;

#[test]
fn test_compile2file_writes_one_file_per_class() -> Result<()> {
    let dir = tempdir()?;
    let written = compile2file(common::FACTORIAL, dir.path(), &Config::default())?;

    assert_eq!(written, vec![dir.path().join("Factorial.j"), dir.path().join("Fac.j")]);
    let main = fs::read_to_string(dir.path().join("Factorial.j"))?;
    assert!(main.starts_with(".class public Factorial\n.super java/lang/Object\n"));
    assert!(main.contains(".method public static main([Ljava/lang/String;)V"));
    assert!(main.contains("    invokevirtual java/io/PrintStream/println(I)V\n"));

    let fac = fs::read_to_string(dir.path().join("Fac.j"))?;
    assert!(fac.contains(".method public ComputeFac(I)I\n"));
    assert!(fac.contains("    ireturn\n.end method\n"));
    Ok(())
}

#[test]
fn test_output_directory_is_created() -> Result<()> {
    let dir = tempdir()?;
    let nested = dir.path().join("out").join("classes");
    compile2file(common::ARRAY_SUM, &nested, &Config::default())?;
    assert!(nested.join("ArraySum.j").is_file());
    assert!(nested.join("Summer.j").is_file());
    Ok(())
}

#[test]
fn test_semantic_errors_write_nothing() -> Result<()> {
    let dir = tempdir()?;
    let source = r#"class M {
    public static void main(String[] a) {
        System.out.println(10 / 0);
        x = 2;
    }
}"#;
    let err = compile2file(source, dir.path(), &Config::default()).unwrap_err();
    match &err {
        Error::Semantic(errors) => {
            assert_eq!(errors.len(), 2);
            let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
            assert_eq!(lines, vec![3, 4]);
        }
        other => panic!("expected semantic errors, got {other}"),
    }
    assert_eq!(
        err.to_string(),
        "2 semantic error(s)\n  line 3: division by zero\n  line 4: variable 'x' not declared"
    );
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_syntax_errors_write_nothing() -> Result<()> {
    let dir = tempdir()?;
    let err = compile2file("class M {", dir.path(), &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }), "got {err}");
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_compile_file_reads_source() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("Inheritance.minij");
    fs::write(&input, common::INHERITANCE)?;
    let out = dir.path().join("out");

    let written = compile_file(&input, &out, &Config::default())?;
    assert_eq!(written.len(), 3);
    assert!(out.join("Base.j").is_file());

    let missing = compile_file(&dir.path().join("nope.minij"), &out, &Config::default());
    assert!(matches!(missing, Err(Error::Io(_))));
    Ok(())
}

#[test]
fn test_custom_extension() -> Result<()> {
    let dir = tempdir()?;
    let config = Config::default().with_output_extension("jasmin");
    let written = compile2file(common::FACTORIAL, dir.path(), &config)?;
    assert!(written.iter().all(|p| p.extension().map_or(false, |e| e == "jasmin")));
    Ok(())
}

#[test]
fn test_generate_to_dir_matches_text_writer() -> Result<()> {
    let dir = tempdir()?;
    let program = parse_minij(common::FACTORIAL)?;
    let written = generate_to_dir(&program, dir.path(), &Config::default())?;
    let classes = common::compile(common::FACTORIAL);
    for (path, class) in written.iter().zip(&classes) {
        assert_eq!(fs::read_to_string(path)?, minijc::codegen::class_file_to_text(class));
    }
    Ok(())
}

#[test]
fn test_verification_can_be_disabled() -> Result<()> {
    let checked = minijc::compile(common::FACTORIAL, &Config::default())?;
    let unchecked = minijc::compile(common::FACTORIAL, &Config::default().with_verify(false))?;
    assert_eq!(checked, unchecked);
    Ok(())
}
