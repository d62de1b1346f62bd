//! Decimal handling for `price` and `total_amount`.
//!
//! Amounts arrive as JSON numbers (or numeric strings) and are kept as
//! `Decimal` so that `quantity * price` never goes through binary floating point.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::OrderError;
use crate::types::order::Qty;

/// Parse a JSON amount. Numbers are read from their shortest decimal text,
/// so `12.99` becomes exactly `12.99`. The caller's scale is kept (`"19.90"`
/// stays `19.90`).
pub fn parse_amount(field: &str, value: &serde_json::Value) -> Result<Decimal, OrderError> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        other => {
            return Err(OrderError::InvalidField {
                field: field.to_string(),
                reason: format!("expected a number, got {other}"),
            });
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| OrderError::InvalidField {
            field: field.to_string(),
            reason: format!("'{text}' is not a decimal amount: {e}"),
        })
}

/// `quantity * price`, failing instead of wrapping on overflow. The result
/// carries the combined scale of both operands, so `2 * 10.0` is `20.0`.
pub fn total(quantity: &Qty, price: Decimal) -> Result<Decimal, OrderError> {
    let quantity = parse_amount("quantity", &serde_json::Value::Number(quantity.clone()))?;
    quantity
        .checked_mul(price)
        .ok_or_else(|| OrderError::Arithmetic(format!("{quantity} * {price} overflows")))
}
