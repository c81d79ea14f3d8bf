//! Discounts

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A fixed amount is in a different currency to the basket it is applied to.
    #[error("discount is in {found}, but basket is in {expected}")]
    CurrencyMismatch {
        /// Basket currency code
        expected: &'static str,

        /// Discount currency code
        found: &'static str,
    },
}

/// The flat part of a discount: how much comes off the eligible total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimpleDiscount<'a> {
    /// Take a percentage off, on the 0-100 scale (`12.5` is twelve and a half percent).
    PercentageOff(Decimal),

    /// Take a fixed amount off.
    AmountOff(Money<'a, Currency>),
}

impl<'a> SimpleDiscount<'a> {
    /// Calculates the amount this discount takes off `eligible`, clamped to `[0, eligible]`.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::PercentConversion`]: the percentage could not be applied in minor units.
    /// - [`DiscountError::CurrencyMismatch`]: a fixed amount is in another currency.
    pub fn amount_on(
        &self,
        eligible: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let eligible_minor = eligible.to_minor_units().max(0);

        let minor = match self {
            SimpleDiscount::PercentageOff(percent) => percent_of_minor(*percent, eligible_minor)?,
            SimpleDiscount::AmountOff(amount) => {
                if amount.currency() != eligible.currency() {
                    return Err(DiscountError::CurrencyMismatch {
                        expected: eligible.currency().iso_alpha_code,
                        found: amount.currency().iso_alpha_code,
                    });
                }

                amount.to_minor_units()
            }
        };

        Ok(Money::from_minor(
            minor.clamp(0, eligible_minor),
            eligible.currency(),
        ))
    }
}

/// Calculate the discount amount in minor units based on a 0-100 percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the result cannot be represented in minor units.
pub fn percent_of_minor(percent: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let Some(minor) = Decimal::from_i64(minor) else {
        return Err(DiscountError::PercentConversion);
    };

    let Some(applied) = percent
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| fraction.checked_mul(minor))
    else {
        return Err(DiscountError::PercentConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(DiscountError::PercentConversion)
}
