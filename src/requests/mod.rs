//! Boundary Requests
//!
//! Wire shapes exchanged with policy forms and the storefront client. Amounts arrive as plain
//! numbers in major units of the store currency, and are converted (and validated) on the way in.

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};

use crate::{
    policies::{ValidationError, ValidationErrors},
    pricing::{to_major, to_minor},
};

pub mod basket;
pub mod conditions;
pub mod discounts;
pub mod purchase;

pub use basket::{BasketLineRequest, BasketSnapshot, DiscountAmountResponse, PurchaseCheckResponse};
pub use conditions::DiscountConditionRequest;
pub use discounts::AddDiscountRequest;
pub use purchase::AddPurchaseRuleRequest;

/// Convert a wire number into a decimal.
fn decimal(field: &'static str, value: f64) -> Result<Decimal, ValidationError> {
    Decimal::from_f64(value).ok_or_else(|| ValidationError::InvalidRange {
        field,
        expected: "a finite number",
        found: value.to_string(),
    })
}

/// Convert a wire number in major units into money.
fn money<'a>(
    field: &'static str,
    value: Decimal,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, ValidationError> {
    to_minor(value, currency)
        .map(|minor| Money::from_minor(minor, currency))
        .ok_or_else(|| ValidationError::InvalidRange {
            field,
            expected: "representable in minor units",
            found: value.normalize().to_string(),
        })
}

/// Convert a wire number into a whole count.
fn count(field: &'static str, value: Decimal) -> Result<u32, ValidationError> {
    value
        .fract()
        .is_zero()
        .then(|| value.to_u32())
        .flatten()
        .ok_or_else(|| ValidationError::InvalidRange {
            field,
            expected: "a whole number >= 1",
            found: value.normalize().to_string(),
        })
}

/// Render money as a wire number in major units.
fn major(amount: &Money<'_, Currency>) -> f64 {
    to_major(amount).to_f64().unwrap_or_default()
}

/// Keep the value of `result`, moving any errors into `errors`.
fn collect<T, E: Into<ValidationErrors>>(
    result: Result<T, E>,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.extend(error.into());
            None
        }
    }
}
