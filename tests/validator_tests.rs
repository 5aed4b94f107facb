//! Tests for the argument validator: boundary conditions per type and
//! the exact user-facing message strings the 400 responses carry.

use regex::Regex;
use routedef::{validate, Constraints, ParamSpec, ParamType};
use serde_json::{json, Value};

fn check(spec: &ParamSpec, raw: Option<Value>, omissible: bool) -> Result<(), String> {
    validate(spec, raw.as_ref(), omissible).map_err(|e| e.to_string())
}

#[test]
fn test_number_boundaries_inclusive() {
    let spec =
        ParamSpec::new("id", ParamType::Number).validate(Constraints::new().min(1.0).max(999.0));

    assert!(check(&spec, Some(json!("1")), false).is_ok());
    assert!(check(&spec, Some(json!("999")), false).is_ok());
    assert_eq!(
        check(&spec, Some(json!("0")), false).unwrap_err(),
        "'id' value 0 greater than 1."
    );
    assert_eq!(
        check(&spec, Some(json!("1000")), false).unwrap_err(),
        "'id' value 1000 less than 999."
    );
}

#[test]
fn test_number_rejects_non_numeric() {
    let spec = ParamSpec::new("id", ParamType::Number);
    assert_eq!(
        check(&spec, Some(json!("ABC")), false).unwrap_err(),
        "Invalid number type 'ABC' of key id."
    );
    assert!(check(&spec, Some(json!(12345)), false).is_ok());
}

#[test]
fn test_required_missing_message() {
    let spec = ParamSpec::new("param1", ParamType::String).required();
    assert_eq!(
        check(&spec, None, true).unwrap_err(),
        "'param1' is not defined."
    );
}

#[test]
fn test_optional_missing_passes() {
    let spec = ParamSpec::new("param1", ParamType::String);
    assert!(check(&spec, None, true).is_ok());
}

#[test]
fn test_string_length_boundaries() {
    let spec = ParamSpec::new("param1", ParamType::String)
        .validate(Constraints::new().min_length(5).max_length(10));

    assert!(check(&spec, Some(json!("ABCDE")), true).is_ok());
    assert!(check(&spec, Some(json!("ABCDEFGHIJ")), true).is_ok());
    assert_eq!(
        check(&spec, Some(json!("ABCD")), true).unwrap_err(),
        "'param1' length greater than 5 characters."
    );
    assert_eq!(
        check(&spec, Some(json!("ABCDEFGHIJK")), true).unwrap_err(),
        "'param1' length less than 10 characters."
    );
}

#[test]
fn test_string_exact_length() {
    let spec = ParamSpec::new("arg3", ParamType::String).validate(Constraints::new().length(8));
    assert!(check(&spec, Some(json!("ABCDEFGH")), false).is_ok());
    assert_eq!(
        check(&spec, Some(json!("ABC")), false).unwrap_err(),
        "'arg3' length must be 8 characters."
    );
}

#[test]
fn test_string_pattern() {
    let spec = ParamSpec::new("param3", ParamType::String)
        .validate(Constraints::new().pattern(Regex::new("^(Foo|Bar)$").unwrap()));
    assert!(check(&spec, Some(json!("Foo")), true).is_ok());
    assert!(check(&spec, Some(json!("Bar")), true).is_ok());
    assert_eq!(
        check(&spec, Some(json!("Other")), true).unwrap_err(),
        "'param3' is not match with RegExp patterns."
    );
}

#[test]
fn test_string_rejects_non_string() {
    let spec = ParamSpec::new("param3", ParamType::String);
    assert_eq!(
        check(&spec, Some(json!(123)), true).unwrap_err(),
        "Invalid type. 'param3' must be string."
    );
}

#[test]
fn test_boolean_literals_any_case() {
    let spec = ParamSpec::new("flag", ParamType::Boolean);
    for raw in ["true", "false", "TRUE", "False", "tRuE"] {
        assert!(check(&spec, Some(json!(raw)), false).is_ok(), "raw: {raw}");
    }
    assert!(check(&spec, Some(json!(true)), false).is_ok());
    assert_eq!(
        check(&spec, Some(json!("foo")), false).unwrap_err(),
        "Invalid boolean type 'foo' of key flag."
    );
}

#[test]
fn test_number_accepts_string_with_constraint_display() {
    // Fractional values keep their fractional rendering in messages.
    let spec = ParamSpec::new("n", ParamType::Number).validate(Constraints::new().min(1.5));
    assert_eq!(
        check(&spec, Some(json!("1.25")), false).unwrap_err(),
        "'n' value 1.25 greater than 1.5."
    );
}
