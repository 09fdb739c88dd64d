//! Proposal total computation.
//!
//! Totals are derived values: whenever a proposal's line items are written,
//! the stored total is recomputed from the full item set in the same
//! transaction. All arithmetic uses [`Decimal`] so repeated aggregation
//! never accumulates binary floating-point drift.

use rust_decimal::Decimal;

use crate::storage::LineItemInput;

/// Sum of `quantity * rate` over all line items.
///
/// Returns [`Decimal::ZERO`] for an empty set. Item order does not affect
/// the result. Inputs are validated (non-negative, well-formed) by the
/// request layer before this is called.
pub fn total_amount(items: &[LineItemInput]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |total, item| total + item.quantity * item.rate)
}
