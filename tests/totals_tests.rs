//! Tests for the line-item total computation.

use pitchdesk::storage::LineItemInput;
use pitchdesk::totals::total_amount;
use rust_decimal::Decimal;

fn item(quantity: &str, rate: &str) -> LineItemInput {
    LineItemInput {
        description: "work".to_string(),
        quantity: quantity.parse().expect("quantity"),
        rate: rate.parse().expect("rate"),
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal")
}

#[test]
fn empty_set_totals_zero() {
    assert_eq!(total_amount(&[]), Decimal::ZERO);
}

#[test]
fn sums_quantity_times_rate() {
    let items = vec![item("2", "100"), item("1", "50")];
    assert_eq!(total_amount(&items), dec("250"));
}

#[test]
fn order_does_not_matter() {
    let forward = vec![item("3", "19.99"), item("1", "0.01"), item("7", "2.5")];
    let mut reversed = forward.clone();
    reversed.reverse();
    assert_eq!(total_amount(&forward), total_amount(&reversed));
}

#[test]
fn fractional_amounts_are_exact() {
    // 0.1 + 0.2 + 0.3 would drift under binary floats; decimals stay exact.
    let items = vec![item("1", "0.1"), item("1", "0.2"), item("1", "0.3")];
    assert_eq!(total_amount(&items), dec("0.6"));

    let items = vec![item("1.5", "10.10")];
    assert_eq!(total_amount(&items), dec("15.15"));
}

#[test]
fn zero_quantity_contributes_nothing() {
    let items = vec![item("0", "9999"), item("2", "5")];
    assert_eq!(total_amount(&items), dec("10"));
}
