//! Condition Predicates

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    basket::Basket,
    policies::validation::{ValidationErrors, validate_condition},
    products::ProductId,
};

/// How a condition group combines its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOp {
    /// Every member holds
    All,

    /// At least one member holds
    Any,

    /// Exactly one member holds
    ExactlyOne,
}

/// A testable fact about a basket.
///
/// Conditions always look at the undiscounted basket, and never modify it.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<'a> {
    /// The basket subtotal is at least this amount.
    BasketTotalAtLeast(Money<'a, Currency>),

    /// The basket holds at least `min_quantity` units of `product`.
    ProductQuantityAtLeast {
        /// Product to count
        product: ProductId,

        /// Minimum number of units
        min_quantity: u32,
    },

    /// The basket holds at least `min_quantity` units from `category`.
    CategoryQuantityAtLeast {
        /// Category to count, matched case-insensitively
        category: String,

        /// Minimum number of units
        min_quantity: u32,
    },

    /// A logical combination of other conditions.
    Group {
        /// Combining operator
        op: ConditionOp,

        /// Members, in declaration order
        conditions: Vec<Condition<'a>>,
    },
}

impl<'a> Condition<'a> {
    /// The basket subtotal must reach `min_total`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `min_total` is not positive.
    pub fn basket_total_at_least(min_total: Money<'a, Currency>) -> Result<Self, ValidationErrors> {
        Self::validated(Condition::BasketTotalAtLeast(min_total))
    }

    /// The basket must hold at least `min_quantity` units of `product`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `min_quantity` is zero or the product id is blank.
    pub fn product_quantity_at_least(
        product: ProductId,
        min_quantity: u32,
    ) -> Result<Self, ValidationErrors> {
        Self::validated(Condition::ProductQuantityAtLeast {
            product,
            min_quantity,
        })
    }

    /// The basket must hold at least `min_quantity` units from `category`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `min_quantity` is zero or the category is blank.
    pub fn category_quantity_at_least(
        category: impl Into<String>,
        min_quantity: u32,
    ) -> Result<Self, ValidationErrors> {
        Self::validated(Condition::CategoryQuantityAtLeast {
            category: category.into(),
            min_quantity,
        })
    }

    /// Combine conditions with a logical operator.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `conditions` is empty or any member is invalid.
    pub fn group(op: ConditionOp, conditions: Vec<Condition<'a>>) -> Result<Self, ValidationErrors> {
        Self::validated(Condition::Group { op, conditions })
    }

    fn validated(condition: Self) -> Result<Self, ValidationErrors> {
        validate_condition(&condition)?;

        Ok(condition)
    }

    /// Whether the condition holds for `basket`.
    ///
    /// A money threshold in a currency other than the basket's never holds.
    pub fn evaluate(&self, basket: &Basket<'_>) -> bool {
        match self {
            Condition::BasketTotalAtLeast(min_total) => {
                min_total.currency() == basket.currency()
                    && basket.subtotal().to_minor_units() >= min_total.to_minor_units()
            }
            Condition::ProductQuantityAtLeast {
                product,
                min_quantity,
            } => basket.product_quantity(product) >= u64::from(*min_quantity),
            Condition::CategoryQuantityAtLeast {
                category,
                min_quantity,
            } => basket.category_quantity(category) >= u64::from(*min_quantity),
            Condition::Group { op, conditions } => {
                let mut results = conditions.iter().map(|condition| condition.evaluate(basket));

                match op {
                    ConditionOp::All => results.all(|held| held),
                    ConditionOp::Any => results.any(|held| held),
                    ConditionOp::ExactlyOne => results.filter(|held| *held).count() == 1,
                }
            }
        }
    }
}
