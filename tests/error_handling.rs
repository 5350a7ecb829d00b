// tests/error_handling.rs

use std::io::Write;
use tempfile::NamedTempFile;
use topotask::config::load_and_validate;
use topotask::errors::TopoError;

fn plan(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_plan_cycle_returns_structured_error() {
    let file = plan(
        r#"
[task.A]
op = "sum"
after = ["B"]

[task.B]
op = "sum"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TopoError::CycleDetected { cycle }) => {
            assert_eq!(cycle.len(), 3);
            assert_eq!(cycle.first(), cycle.last());
            assert!(cycle.iter().any(|id| id.contains('A')));
            assert!(cycle.iter().any(|id| id.contains('B')));
        }
        Err(e) => panic!("Expected CycleDetected error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let file = plan(
        r#"
[task.A]
op = "sum"
after = ["A"]
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(err.is_cycle(), "{err:?}");
    assert!(err.to_string().starts_with("cycle detected: "));
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    let file = plan(
        r#"
[task.A]
op = "sum"
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TopoError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_identity_without_value_is_rejected() {
    let file = plan(
        r#"
[task.A]
op = "identity"
"#,
    );

    match load_and_validate(file.path()) {
        Err(TopoError::ConfigError(msg)) => assert!(msg.contains("no `value`"), "{msg}"),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_zero_timeout_is_rejected() {
    let file = plan(
        r#"
[config]
timeout_ms = 0

[task.A]
op = "identity"
value = 1
"#,
    );

    match load_and_validate(file.path()) {
        Err(TopoError::ConfigError(msg)) => assert!(msg.contains("timeout_ms")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_empty_plan_is_rejected() {
    let file = plan("[config]\ntimeout_ms = 100\n");

    match load_and_validate(file.path()) {
        Err(TopoError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_malformed_toml_returns_toml_error() {
    let file = plan("[task.A\nop = ");

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TopoError::TomlError(_)), "{err:?}");
}

#[test]
fn test_unknown_field_and_unknown_op_are_rejected() {
    let unknown_field = plan(
        r#"
[task.A]
op = "sum"
cmd = "echo A"
"#,
    );
    let err = load_and_validate(unknown_field.path()).unwrap_err();
    assert!(matches!(err, TopoError::TomlError(_)), "{err:?}");

    let unknown_op = plan(
        r#"
[task.A]
op = "divide"
"#,
    );
    let err = load_and_validate(unknown_op.path()).unwrap_err();
    assert!(matches!(err, TopoError::TomlError(_)), "{err:?}");
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_and_validate(dir.path().join("Missing.toml")).unwrap_err();
    assert!(matches!(err, TopoError::IoError(_)), "{err:?}");
}

#[test]
fn test_valid_plan_loads() {
    let file = plan(
        r#"
[config]
timeout_ms = 250

[task.a]
op = "identity"
value = 2

[task.b]
op = "product"
after = ["a", "a"]
delay_ms = 5
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.config.timeout_ms, Some(250));
    assert_eq!(cfg.task["b"].after, vec!["a", "a"]);
    assert_eq!(cfg.task["b"].delay_ms, Some(5));
}
