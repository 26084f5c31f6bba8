//! Integration tests for Value types
//!
//! Tests truthiness, cross-type comparison, display and page text.

use quire_foundation::{Item, Type, Value};

fn list(items: &[i64]) -> Value {
    Value::List(items.iter().copied().map(Value::from).collect())
}

// =============================================================================
// Truthiness
// =============================================================================

#[test]
fn nil_and_false_are_falsy() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Bool(true).is_truthy());
}

#[test]
fn zero_and_empty_are_falsy() {
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!list(&[]).is_truthy());
}

#[test]
fn non_empty_values_are_truthy() {
    assert!(Value::Int(-1).is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(list(&[0]).is_truthy());
    assert!(Value::from(Item::new("Rope")).is_truthy());
}

// =============================================================================
// Types and Accessors
// =============================================================================

#[test]
fn value_types() {
    assert_eq!(Value::Nil.value_type(), Type::Nil);
    assert_eq!(Value::Int(1).value_type(), Type::Int);
    assert_eq!(Value::Float(1.5).value_type(), Type::Float);
    assert_eq!(Value::from("a").value_type(), Type::String);
    assert_eq!(list(&[1]).value_type(), Type::List);
    assert_eq!(Value::from(Item::new("Key")).value_type(), Type::Item);
}

#[test]
fn numbers_widen_to_f64() {
    assert_eq!(Value::Int(3).as_number(), Some(3.0));
    assert_eq!(Value::Float(2.5).as_number(), Some(2.5));
    assert_eq!(Value::from("3").as_number(), None);
}

#[test]
fn expect_reports_type_mismatch() {
    let err = Value::from("x").expect_int().unwrap_err();
    assert!(err.to_string().contains("type mismatch"));
    assert_eq!(Value::from("x").expect_str().unwrap(), "x");
}

// =============================================================================
// Comparison
// =============================================================================

#[test]
fn ints_and_floats_compare_numerically() {
    assert!(Value::Int(2) < Value::Float(2.5));
    assert!(Value::Float(3.0) > Value::Int(2));
}

#[test]
fn equality_is_type_strict() {
    assert_ne!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Float(1.0), Value::Float(1.0));
}

#[test]
fn mixed_types_are_unordered() {
    assert_eq!(Value::Int(1).partial_cmp(&Value::from("1")), None);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn lists_display_comma_separated() {
    assert_eq!(list(&[1, 2, 3]).to_string(), "1, 2, 3");
}

#[test]
fn items_display_their_name() {
    assert_eq!(Value::from(Item::new("Lamp")).to_string(), "Lamp");
}

#[test]
fn nil_contributes_no_text() {
    assert_eq!(Value::Nil.to_text(), None);
    assert_eq!(Value::Int(7).to_text().as_deref(), Some("7"));
    assert_eq!(Value::Bool(true).to_text().as_deref(), Some("true"));
}
