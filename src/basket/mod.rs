//! Basket

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    policies::Scope,
    pricing::{TotalPriceError, line_total, total_price},
    products::{ProductId, StoreId},
};

/// Errors related to basket construction or totals.
#[derive(Debug, Error, PartialEq)]
pub enum BasketError {
    /// A line's currency differs from the basket currency (index, line currency, basket currency).
    #[error("Line {0} has currency {1}, but basket has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line was added with a quantity of zero.
    #[error("Line {0} has a quantity of zero")]
    ZeroQuantity(usize),

    /// A line was added with a negative unit price.
    #[error("Line {0} has a negative unit price")]
    NegativePrice(usize),

    /// The same product appears on more than one line.
    #[error("Product {0} appears on more than one line")]
    DuplicateProduct(ProductId),

    /// Errors bubbled up from total price calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// A single basket line: a quantity of one product at a unit price.
#[derive(Clone, Debug, PartialEq)]
pub struct BasketLine<'a> {
    product: ProductId,
    category: String,
    store: StoreId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
}

impl<'a> BasketLine<'a> {
    /// Creates a new basket line.
    pub fn new(
        product: ProductId,
        category: impl Into<String>,
        store: StoreId,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            product,
            category: category.into(),
            store,
            quantity,
            unit_price,
        }
    }

    /// Returns the product on this line
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// Returns the product category
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the store selling the product
    pub fn store(&self) -> &StoreId {
        &self.store
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Calculate `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if the line total overflows.
    pub fn total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        line_total(&self.unit_price, self.quantity)
    }

    /// Line total in minor units; only called on lines whose basket subtotal has been computed.
    fn total_minor(&self) -> i64 {
        self.unit_price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity))
    }
}

/// Case-insensitive exact comparison of two category names.
pub fn category_matches(left: &str, right: &str) -> bool {
    left.chars()
        .flat_map(char::to_lowercase)
        .eq(right.chars().flat_map(char::to_lowercase))
}

/// Basket
///
/// An ordered, product-unique set of lines in a single currency. The pre-discount subtotal
/// is computed once on construction, so every later query is infallible.
#[derive(Clone, Debug, PartialEq)]
pub struct Basket<'a> {
    lines: Vec<BasketLine<'a>>,
    currency: &'a Currency,
    subtotal: Money<'a, Currency>,
}

impl<'a> Basket<'a> {
    /// Create a new, empty basket.
    #[must_use]
    pub fn new(currency: &'a Currency) -> Self {
        Basket {
            lines: Vec::new(),
            currency,
            subtotal: Money::from_minor(0, currency),
        }
    }

    /// Create a new basket with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `BasketError` if a line has a different currency, a zero quantity, a negative
    /// price, repeats a product, or if the subtotal cannot be represented.
    pub fn with_lines(
        lines: impl Into<Vec<BasketLine<'a>>>,
        currency: &'a Currency,
    ) -> Result<Self, BasketError> {
        let lines = lines.into();
        let mut seen = FxHashSet::default();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency != currency {
                return Err(BasketError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if line.quantity() == 0 {
                return Err(BasketError::ZeroQuantity(i));
            }

            if line.unit_price().to_minor_units() < 0 {
                return Err(BasketError::NegativePrice(i));
            }

            if !seen.insert(line.product()) {
                return Err(BasketError::DuplicateProduct(line.product().clone()));
            }

            Ok(())
        })?;

        let subtotal = if lines.is_empty() {
            Money::from_minor(0, currency)
        } else {
            total_price(&lines)?
        };

        Ok(Basket {
            lines,
            currency,
            subtotal,
        })
    }

    /// The pre-discount total of every line.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// The pre-discount total of the lines accepted by `select`.
    pub fn total_where(&self, select: impl Fn(&BasketLine<'a>) -> bool) -> Money<'a, Currency> {
        let minor = self
            .lines
            .iter()
            .filter(|line| select(line))
            .fold(0_i64, |acc, line| acc.saturating_add(line.total_minor()));

        Money::from_minor(minor, self.currency)
    }

    /// The pre-discount total of the lines a discount scope selects.
    pub fn eligible_total(&self, scope: &Scope) -> Money<'a, Currency> {
        self.total_where(|line| scope.selects(line))
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Units of `product` in the basket; zero when absent.
    pub fn product_quantity(&self, product: &ProductId) -> u64 {
        self.lines
            .iter()
            .filter(|line| line.product() == product)
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Units of products in `category`, compared case-insensitively.
    pub fn category_quantity(&self, category: &str) -> u64 {
        self.lines
            .iter()
            .filter(|line| category_matches(line.category(), category))
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// The lines sold by `store`, as a basket of their own.
    #[must_use]
    pub fn for_store(&self, store: &StoreId) -> Basket<'a> {
        let lines: Vec<BasketLine<'a>> = self
            .lines
            .iter()
            .filter(|line| line.store() == store)
            .cloned()
            .collect();

        let minor = lines
            .iter()
            .fold(0_i64, |acc, line| acc.saturating_add(line.total_minor()));

        Basket {
            lines,
            currency: self.currency,
            subtotal: Money::from_minor(minor, self.currency),
        }
    }

    /// Find the line for a product.
    pub fn line(&self, product: &ProductId) -> Option<&BasketLine<'a>> {
        self.lines.iter().find(|line| line.product() == product)
    }

    /// Iterate over the lines in the basket.
    pub fn iter(&self) -> impl Iterator<Item = &BasketLine<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the basket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the basket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the basket.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}
