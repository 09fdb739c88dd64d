//! Tests for request-shape validation of the `lineItems` field.

use pitchdesk::web::utils::parse_line_items;
use rust_decimal::Decimal;

#[test]
fn rejects_non_array_line_items() {
    let err = parse_line_items(&serde_json::json!("not-an-array")).unwrap_err();
    assert_eq!(err, "lineItems must be an array");

    let err = parse_line_items(&serde_json::json!({"quantity": 1})).unwrap_err();
    assert_eq!(err, "lineItems must be an array");

    assert!(parse_line_items(&serde_json::Value::Null).is_err());
}

#[test]
fn accepts_empty_array() {
    let items = parse_line_items(&serde_json::json!([])).expect("empty array");
    assert!(items.is_empty());
}

#[test]
fn decodes_numeric_and_string_amounts() {
    let items = parse_line_items(&serde_json::json!([
        {"description": "design", "quantity": 2, "rate": 100},
        {"description": "review", "quantity": "1.5", "rate": "40.50"},
    ]))
    .expect("valid items");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].quantity, Decimal::from(2));
    assert_eq!(items[1].rate, "40.50".parse::<Decimal>().unwrap());
}

#[test]
fn rejects_entries_missing_fields() {
    let result = parse_line_items(&serde_json::json!([{"description": "no amounts"}]));
    assert!(result.is_err());
}

#[test]
fn rejects_negative_amounts() {
    let err = parse_line_items(&serde_json::json!([
        {"description": "bad", "quantity": -1, "rate": 10},
    ]))
    .unwrap_err();
    assert_eq!(err, "quantity and rate must be non-negative");

    let result = parse_line_items(&serde_json::json!([
        {"description": "bad", "quantity": 1, "rate": -0.01},
    ]));
    assert!(result.is_err());
}
