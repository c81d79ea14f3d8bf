//! Discount Evaluation

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    basket::Basket,
    discounts::DiscountError,
    policies::{
        describe::Describe,
        node::{Combination, DiscountNode},
        validation::validate,
    },
};

/// The discount one top-level policy contributed to a quote.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount<'a> {
    /// Canonical description of the policy
    pub description: String,

    /// Amount the policy took off, before the basket-level clamp
    pub amount: Money<'a, Currency>,
}

/// The price of a store's basket once its discount policies are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote<'a> {
    /// Undiscounted basket total
    pub subtotal: Money<'a, Currency>,

    /// Total discount, never more than `subtotal`
    pub discount: Money<'a, Currency>,

    /// `subtotal - discount`
    pub total: Money<'a, Currency>,

    /// Per-policy breakdown, in policy order
    pub applied: SmallVec<[AppliedDiscount<'a>; 4]>,
}

/// Calculates the discount `node` yields for `basket`.
///
/// Composite children are each measured against the same, undiscounted basket. The node is
/// expected to have passed validation.
///
/// # Errors
///
/// - [`DiscountError::PercentConversion`]: a percentage could not be applied in minor units.
/// - [`DiscountError::CurrencyMismatch`]: a fixed amount is in a currency other than the basket's.
pub fn compute_discount<'a>(
    node: &DiscountNode<'a>,
    basket: &Basket<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    debug_assert!(
        validate(node).is_ok(),
        "discount nodes must be validated before evaluation"
    );

    let minor = discount_minor(node, basket)?;

    Ok(Money::from_minor(minor, basket.currency()))
}

fn discount_minor(node: &DiscountNode<'_>, basket: &Basket<'_>) -> Result<i64, DiscountError> {
    match node {
        DiscountNode::Basic { discount, scope } => {
            let eligible = basket.eligible_total(scope);

            Ok(discount.amount_on(&eligible)?.to_minor_units())
        }
        DiscountNode::Conditional { base, condition } => {
            if condition.evaluate(basket) {
                discount_minor(base, basket)
            } else {
                Ok(0)
            }
        }
        DiscountNode::Composite { children, combine } => {
            let amounts = children
                .iter()
                .map(|child| discount_minor(child, basket))
                .collect::<Result<SmallVec<[i64; 4]>, _>>()?;

            Ok(match combine {
                Combination::Sum => amounts
                    .iter()
                    .fold(0_i64, |acc, amount| acc.saturating_add(*amount)),
                Combination::Maximum => {
                    // Strictly greater, so ties keep the first declared child.
                    let (index, amount) = amounts.iter().copied().enumerate().fold(
                        (0, 0_i64),
                        |best, candidate| if candidate.1 > best.1 { candidate } else { best },
                    );

                    trace!(index, amount, "selected maximum child discount");

                    amount
                }
            })
        }
    }
}

/// Prices `basket` against a store's top-level discount policies.
///
/// Each policy's discount is summed, and the sum is clamped so the basket never goes below zero.
///
/// # Errors
///
/// Returns a `DiscountError` if any policy fails to evaluate.
pub fn quote<'a>(
    discounts: &[DiscountNode<'a>],
    basket: &Basket<'a>,
) -> Result<Quote<'a>, DiscountError> {
    let subtotal = basket.subtotal();
    let subtotal_minor = subtotal.to_minor_units();

    let applied = discounts
        .iter()
        .map(|node| {
            Ok(AppliedDiscount {
                description: node.describe(),
                amount: compute_discount(node, basket)?,
            })
        })
        .collect::<Result<SmallVec<[AppliedDiscount<'a>; 4]>, DiscountError>>()?;

    let total_discount = applied
        .iter()
        .fold(0_i64, |acc, applied| {
            acc.saturating_add(applied.amount.to_minor_units())
        })
        .clamp(0, subtotal_minor.max(0));

    Ok(Quote {
        subtotal,
        discount: Money::from_minor(total_discount, basket.currency()),
        total: Money::from_minor(subtotal_minor - total_discount, basket.currency()),
        applied,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        basket::BasketLine,
        policies::{conditions::Condition, scope::Scope},
        products::{ProductId, StoreId},
    };

    use super::*;

    fn line<'a>(product: &str, category: &str, quantity: u32, minor: i64) -> BasketLine<'a> {
        BasketLine::new(
            ProductId::from(product),
            category,
            StoreId::from("S1"),
            quantity,
            Money::from_minor(minor, USD),
        )
    }

    fn basket<'a>() -> TestResult<Basket<'a>> {
        Ok(Basket::with_lines(
            [line("P1", "books", 2, 2000), line("P2", "toys", 1, 1000)],
            USD,
        )?)
    }

    fn fixed(minor: i64) -> TestResult<DiscountNode<'static>> {
        Ok(DiscountNode::fixed(Money::from_minor(minor, USD), Scope::Store)?)
    }

    #[test]
    fn basic_percentage_uses_scope_total() -> TestResult {
        let basket = basket()?;

        let node = DiscountNode::percentage(
            Decimal::from(50),
            Scope::Category("BOOKS".to_string()),
        )?;

        assert_eq!(compute_discount(&node, &basket)?, Money::from_minor(2000, USD));

        Ok(())
    }

    #[test]
    fn basic_with_nothing_in_scope_is_zero() -> TestResult {
        let basket = basket()?;

        let node = DiscountNode::fixed(
            Money::from_minor(500, USD),
            Scope::Product(ProductId::from("P9")),
        )?;

        assert_eq!(compute_discount(&node, &basket)?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn conditional_gates_on_condition() -> TestResult {
        let basket = basket()?;

        let base = DiscountNode::percentage(Decimal::from(10), Scope::Store)?;

        let open = DiscountNode::conditional(
            base.clone(),
            Condition::product_quantity_at_least(ProductId::from("P1"), 2)?,
        )?;

        let closed = DiscountNode::conditional(
            base,
            Condition::product_quantity_at_least(ProductId::from("P1"), 3)?,
        )?;

        assert_eq!(compute_discount(&open, &basket)?, Money::from_minor(500, USD));
        assert_eq!(compute_discount(&closed, &basket)?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn maximum_keeps_first_of_equal_children() -> TestResult {
        let basket = basket()?;

        let on_books = DiscountNode::fixed(
            Money::from_minor(700, USD),
            Scope::Category("books".to_string()),
        )?;
        let on_p1 = DiscountNode::fixed(
            Money::from_minor(700, USD),
            Scope::Product(ProductId::from("P1")),
        )?;

        let node = DiscountNode::composite(
            vec![on_books, fixed(300)?, on_p1],
            Combination::Maximum,
        )?;

        assert_eq!(compute_discount(&node, &basket)?, Money::from_minor(700, USD));

        Ok(())
    }

    #[test]
    fn children_do_not_compound() -> TestResult {
        let basket = basket()?;

        // Each child sees the full 50.00, so 60% and 50% sum past the subtotal.
        let sixty = DiscountNode::percentage(Decimal::from(60), Scope::Store)?;
        let fifty = DiscountNode::percentage(Decimal::from(50), Scope::Store)?;
        let node = DiscountNode::composite(vec![sixty, fifty], Combination::Sum)?;

        assert_eq!(compute_discount(&node, &basket)?, Money::from_minor(5500, USD));

        Ok(())
    }

    #[test]
    fn fixed_in_other_currency_errors() -> TestResult {
        let basket = basket()?;

        let node = DiscountNode::fixed(Money::from_minor(100, GBP), Scope::Store)?;

        assert_eq!(
            compute_discount(&node, &basket),
            Err(DiscountError::CurrencyMismatch {
                expected: "USD",
                found: "GBP",
            })
        );

        Ok(())
    }

    #[test]
    fn quote_clamps_total_discount_to_subtotal() -> TestResult {
        let basket = basket()?;

        let discounts = [fixed(4000)?, fixed(3000)?];

        let quote = quote(&discounts, &basket)?;

        assert_eq!(quote.subtotal, Money::from_minor(5000, USD));
        assert_eq!(quote.discount, Money::from_minor(5000, USD));
        assert_eq!(quote.total, Money::from_minor(0, USD));
        assert_eq!(quote.applied.len(), 2);
        assert_eq!(
            quote.applied.get(1).map(|applied| applied.amount),
            Some(Money::from_minor(3000, USD))
        );

        Ok(())
    }

    #[test]
    fn quote_without_policies_charges_subtotal() -> TestResult {
        let basket = basket()?;

        let quote = quote(&[], &basket)?;

        assert_eq!(quote.discount, Money::from_minor(0, USD));
        assert_eq!(quote.total, basket.subtotal());
        assert!(quote.applied.is_empty());

        Ok(())
    }
}
