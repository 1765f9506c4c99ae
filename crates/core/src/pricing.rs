//! Quotation and invoice amount computation.
//!
//! Every function here is total over its input: absent or out-of-range
//! values fall back to neutral defaults instead of failing, so a line
//! with missing product data simply contributes zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::invoice::InvoiceLine;
use crate::domain::quotation::QuotationLine;

/// Quantity defaults to 1 when absent or below 1.
pub fn effective_quantity(line: &QuotationLine) -> u32 {
    match line.quantity {
        Some(quantity) if quantity >= 1 => quantity,
        _ => 1,
    }
}

/// A line without nested product data prices at zero.
pub fn effective_unit_price(line: &QuotationLine) -> Decimal {
    line.product.as_ref().map(|product| product.price).unwrap_or(Decimal::ZERO)
}

/// Discount defaults to 0 when absent or outside [0, 100].
pub fn effective_discount_percent(line: &QuotationLine) -> Decimal {
    match line.discount_percent {
        Some(discount) if discount >= Decimal::ZERO && discount <= Decimal::ONE_HUNDRED => {
            discount
        }
        _ => Decimal::ZERO,
    }
}

/// `quantity * unit_price * (1 - discount / 100)`
pub fn line_subtotal(line: &QuotationLine) -> Decimal {
    let quantity = Decimal::from(effective_quantity(line));
    let unit_price = effective_unit_price(line);
    let discount_factor = Decimal::ONE - effective_discount_percent(line) / Decimal::ONE_HUNDRED;
    quantity * unit_price * discount_factor
}

/// Sum of line subtotals, recomputed eagerly on every item mutation.
/// Item counts are small so there is no caching or incremental update.
pub fn quotation_total(lines: &[QuotationLine]) -> Decimal {
    lines.iter().map(line_subtotal).sum()
}

pub fn line_item_amount(quantity: u32, rate: Decimal) -> Decimal {
    Decimal::from(quantity) * rate
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Invoice rollup: subtotal over item amounts, a flat invoice-level
/// discount, then tax on the discounted base.
pub fn invoice_totals(items: &[InvoiceLine], discount: Decimal, tax_rate: Decimal) -> InvoiceTotals {
    let subtotal: Decimal = items.iter().map(|item| item.amount.unwrap_or(Decimal::ZERO)).sum();
    let taxable = subtotal - discount;
    let tax_amount = taxable * (tax_rate / Decimal::ONE_HUNDRED);
    let total = taxable + tax_amount;

    InvoiceTotals { subtotal, tax_amount, total }
}
