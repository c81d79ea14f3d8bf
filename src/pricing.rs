//! Prices

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::basket::BasketLine;

/// Errors that can occur while calculating line or basket totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No lines were provided, so currency could not be determined.
    #[error("no lines provided; cannot determine currency")]
    NoLines,

    /// A unit price multiplied by its quantity left the `i64` range.
    #[error("total overflowed the minor unit range")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `unit_price * quantity` for a single basket line.
///
/// # Errors
///
/// - [`TotalPriceError::Overflow`]: the product does not fit in minor units.
pub fn line_total<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Calculates the pre-discount total of a list of basket lines.
///
/// # Errors
///
/// - [`TotalPriceError::NoLines`]: no lines were provided, so currency could not be determined.
/// - [`TotalPriceError::Overflow`]: a line total overflowed.
/// - [`TotalPriceError::Money`]: lines carry different currencies.
pub fn total_price<'a>(lines: &[BasketLine<'a>]) -> Result<Money<'a, Currency>, TotalPriceError> {
    let first = lines.first().ok_or(TotalPriceError::NoLines)?;

    lines.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, line| {
            let total = line_total(line.unit_price(), line.quantity())?;

            Ok(acc.add(total)?)
        },
    )
}

/// Converts an amount of money to a decimal in major units (e.g. `1050` pence to `10.50`).
pub fn to_major(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Converts a major unit amount into minor units for `currency`, rounding half away from zero.
///
/// Returns `None` when the result does not fit in an `i64`.
pub fn to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = Decimal::from(10_u64.checked_pow(currency.exponent)?);

    amount
        .checked_mul(scale)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Renders money as `<amount><symbol>`, e.g. `5.00$`.
pub fn format_money(money: &Money<'_, Currency>) -> String {
    format!("{}{}", to_major(money), money.currency().symbol)
}
