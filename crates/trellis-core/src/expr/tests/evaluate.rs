//! Evaluation tests

use super::helpers::{eval, person};
use super::*;
use serde_json::json;

#[test]
fn test_expressions_that_are_true() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    for source in [
        "true",
        "'x' == 'x'",
        "\"x\" == \"x\"",
        "'x' == \"x\"",
        "'hello' instanceof string",
        "true; return true",
        " 5 >= 2 ",
        "true ? true : false",
        "!false && (1 < 2 || false)",
        "null instanceof null",
        "12 == 12.0",
        "'abc'.startsWith('a')",
    ] {
        let compiled = compiler.compile(source).unwrap();
        assert_eq!(
            compiled.evaluate_bool(&Value::Null),
            Ok(true),
            "'{}' should be true",
            source
        );
    }
}

#[test]
fn test_nested_numeric_path() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    let data = json!({ "grid": [[1, 2], [3, 4]] });
    let compiled = compiler.compile("grid.1.0").unwrap();
    assert_eq!(compiled.evaluate(&data), Ok(json!(3)));
}

#[test]
fn test_property_reads() {
    assert_eq!(eval("name"), Ok(json!("Dhanji")));
    assert_eq!(eval("owner.login"), Ok(json!("dhanji")));
    assert_eq!(eval("tags.1"), Ok(json!("web")));
    assert_eq!(eval("nickname"), Ok(Value::Null));
}

#[test]
fn test_arithmetic_keeps_integers_exact() {
    assert_eq!(eval("id + 1"), Ok(json!(13)));
    assert_eq!(eval("id / 4"), Ok(json!(3)));
    assert_eq!(eval("id % 5"), Ok(json!(2)));
    assert_eq!(eval("-id"), Ok(json!(-12)));
    assert_eq!(eval("id / 5"), Ok(json!(2.4)));
    assert_eq!(eval("score * 2"), Ok(json!(19.0)));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(eval("id / 0"), Err(EvaluationError::DivisionByZero));
    assert_eq!(eval("score % 0"), Err(EvaluationError::DivisionByZero));
}

#[test]
fn test_integer_overflow_falls_back_to_float() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    let data = json!({ "a": i64::MIN });
    let number = |src: &str| {
        compiler
            .compile(src)
            .unwrap()
            .evaluate(&data)
            .unwrap_or_else(|e| panic!("'{}' should evaluate: {}", src, e))
            .as_f64()
            .unwrap_or_else(|| panic!("'{}' should be a number", src))
    };

    assert_eq!(number("a / -1"), 9.223372036854775808e18);
    assert_eq!(number("a % -1"), 0.0);
    assert_eq!(number("-a"), 9.223372036854775808e18);
    assert_eq!(number("a - 1"), -9.223372036854775809e18);
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'/people/' + id"), Ok(json!("/people/12")));
    assert_eq!(eval("name + ' (' + owner.login + ')'"), Ok(json!("Dhanji (dhanji)")));
}

#[test]
fn test_methods() {
    assert_eq!(eval("name.toUpperCase()"), Ok(json!("DHANJI")));
    assert_eq!(eval("name.length()"), Ok(json!(6)));
    assert_eq!(eval("tags.size()"), Ok(json!(2)));
    assert_eq!(eval("tags.contains('rust')"), Ok(json!(true)));
    assert_eq!(eval("owner.isEmpty()"), Ok(json!(false)));
    assert_eq!(eval("id.toString() + '!'"), Ok(json!("12!")));
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("score > id"), Ok(json!(false)));
    assert_eq!(eval("name < 'Z'"), Ok(json!(true)));
    assert_eq!(eval("admin != true"), Ok(json!(true)));
}

#[test]
fn test_comparison_type_mismatch() {
    assert_eq!(
        eval("name < 3"),
        Err(EvaluationError::TypeMismatch {
            expected: "two numbers or two strings",
            found: "number"
        })
    );
}

#[test]
fn test_logic_requires_booleans() {
    assert_eq!(
        eval("name && true"),
        Err(EvaluationError::TypeMismatch {
            expected: "boolean",
            found: "string"
        })
    );
}

#[test]
fn test_short_circuit_skips_failing_operand() {
    assert_eq!(eval("true || nickname.toUpperCase() == 'x'"), Ok(json!(true)));
    assert_eq!(eval("admin && id / 0 == 1"), Ok(json!(false)));
}

#[test]
fn test_missing_property_on_instance_is_evaluation_error() {
    // compiled against a richer shape, rendered against a sparser instance
    let compiler = ExpressionCompiler::new(Shape::infer(&person()));
    let compiled = compiler.compile("owner.login").unwrap();
    let sparse = json!({ "name": "x" });
    assert_eq!(
        compiled.evaluate(&sparse),
        Err(EvaluationError::PropertyNotFound {
            path: "owner.login".to_string()
        })
    );
}

#[test]
fn test_null_in_path_is_evaluation_error() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    let compiled = compiler.compile("owner.login").unwrap();
    assert!(matches!(
        compiled.evaluate(&json!({ "owner": null })),
        Err(EvaluationError::PropertyNotFound { .. })
    ));
}

#[test]
fn test_evaluate_text_formats_values() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    let data = json!({ "n": null, "i": 12, "f": 2.5, "whole": 3.0, "b": true, "l": [1, 2] });
    let text = |src: &str| compiler.compile(src).unwrap().evaluate_text(&data).unwrap();
    assert_eq!(text("n"), "");
    assert_eq!(text("i"), "12");
    assert_eq!(text("f"), "2.5");
    assert_eq!(text("whole"), "3");
    assert_eq!(text("b"), "true");
    assert_eq!(text("l"), "[1,2]");
}

#[test]
fn test_evaluate_bool_rejects_non_boolean() {
    let compiler = ExpressionCompiler::new(Shape::Any);
    let compiled = compiler.compile("'yes'").unwrap();
    assert!(compiled.evaluate_bool(&Value::Null).is_err());
}

#[test]
fn test_unsupported_method_at_runtime() {
    // shape is Any, so the receiver kind is only known at render time
    let compiler = ExpressionCompiler::new(Shape::Any);
    let compiled = compiler.compile("x.toUpperCase()").unwrap();
    assert_eq!(
        compiled.evaluate(&json!({ "x": 5 })),
        Err(EvaluationError::UnsupportedMethod {
            method: "toUpperCase".to_string(),
            receiver: "number"
        })
    );
}
