//! Fixtures
//!
//! Store fixtures describe a store, its policies and a sample basket in YAML:
//!
//! ```yaml
//! store: corner-shop
//! currency: USD
//! discounts:
//!   - type: PERCENTAGE
//!     scope: CATEGORY
//!     scopeId: books
//!     value: 10
//! purchase_rules:
//!   - type: MINITEMS
//!     value: 2
//! basket:
//!   - product: P1
//!     category: books
//!     quantity: 2
//!     price: 20.00 USD
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError, BasketLine},
    external::ExternalError,
    policies::ValidationErrors,
    pricing::{to_major, to_minor},
    products::{ProductCatalog, ProductId, ProductInfo, StoreId},
    requests::{AddDiscountRequest, AddPurchaseRuleRequest, BasketLineRequest, BasketSnapshot},
    store::{PolicyError, StorePolicies},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A basket price is not in the store currency
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// A policy in the fixture is malformed
    #[error("Invalid policy: {0}")]
    Invalid(#[from] ValidationErrors),

    /// A policy was rejected by the store
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Basket creation error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),
}

#[derive(Debug, Deserialize)]
struct StoreFixture {
    store: StoreId,
    currency: String,
    #[serde(default)]
    discounts: Vec<AddDiscountRequest>,
    #[serde(default)]
    purchase_rules: Vec<AddPurchaseRuleRequest>,
    #[serde(default)]
    basket: Vec<LineFixture>,
}

#[derive(Debug, Deserialize)]
struct LineFixture {
    product: ProductId,
    category: String,
    quantity: u32,
    price: String,
}

/// A parsed store fixture.
#[derive(Debug)]
pub struct Fixture {
    store: StoreId,
    currency: &'static Currency,
    discounts: Vec<AddDiscountRequest>,
    purchase_rules: Vec<AddPurchaseRuleRequest>,
    lines: Vec<LineFixture>,
}

impl Fixture {
    /// Load `fixtures/stores/{name}.yml` relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(name: &str) -> Result<Self, FixtureError> {
        Self::from_file(
            PathBuf::from("./fixtures")
                .join("stores")
                .join(format!("{name}.yml")),
        )
    }

    /// Load a fixture from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or names an unknown currency.
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        let fixture: StoreFixture = serde_norway::from_str(contents)?;

        Ok(Self {
            store: fixture.store,
            currency: parse_currency(&fixture.currency)?,
            discounts: fixture.discounts,
            purchase_rules: fixture.purchase_rules,
            lines: fixture.basket,
        })
    }

    /// The fixture's store
    pub fn store(&self) -> &StoreId {
        &self.store
    }

    /// The store currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Build the store's policies, adding each discount and purchase rule in fixture order.
    ///
    /// # Errors
    ///
    /// Returns an error if any policy is malformed or rejected by the store.
    pub fn policies(&self) -> Result<StorePolicies<'static>, FixtureError> {
        let mut policies = StorePolicies::new(self.store.clone(), self.currency);

        for discount in &self.discounts {
            policies.add_discount(discount.into_node(self.currency)?)?;
        }

        for rule in &self.purchase_rules {
            policies.add_purchase_rule(rule.into_rule(self.currency)?)?;
        }

        Ok(policies)
    }

    /// Build the fixture basket. Every line is sold by the fixture's store.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed, priced in another currency, or the lines do
    /// not form a valid basket.
    pub fn basket(&self) -> Result<Basket<'static>, FixtureError> {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                Ok(BasketLine::new(
                    line.product.clone(),
                    line.category.clone(),
                    self.store.clone(),
                    line.quantity,
                    self.unit_price(line)?,
                ))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Basket::with_lines(lines, self.currency)?)
    }

    /// The fixture basket as a storefront client would send it.
    ///
    /// # Errors
    ///
    /// Returns an error if a price is malformed or priced in another currency.
    pub fn snapshot(&self) -> Result<BasketSnapshot, FixtureError> {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                let unit_price = self.unit_price(line)?;

                Ok(BasketLineRequest {
                    product_id: line.product.clone(),
                    category: None,
                    quantity: line.quantity,
                    unit_price: to_major(&unit_price).to_f64().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(BasketSnapshot { lines })
    }

    /// A catalog of the fixture's products, all sold by the fixture's store.
    pub fn catalog(&self) -> FixtureCatalog {
        let products = self
            .lines
            .iter()
            .map(|line| {
                let info = ProductInfo {
                    category: line.category.clone(),
                    store: self.store.clone(),
                };

                (line.product.clone(), info)
            })
            .collect();

        FixtureCatalog { products }
    }

    fn unit_price(&self, line: &LineFixture) -> Result<Money<'static, Currency>, FixtureError> {
        let (minor_units, currency) = parse_price(&line.price)?;

        if currency != self.currency {
            return Err(FixtureError::CurrencyMismatch(
                self.currency.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }

        Ok(Money::from_minor(minor_units, currency))
    }
}

/// Product catalog backed by a fixture's basket lines.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    products: FxHashMap<ProductId, ProductInfo>,
}

#[async_trait]
impl ProductCatalog for FixtureCatalog {
    async fn resolve(&self, product: &ProductId) -> Result<ProductInfo, ExternalError> {
        self.products
            .get(product)
            .cloned()
            .ok_or_else(|| ExternalError::UnknownProduct(product.clone()))
    }
}

/// Parse a currency code (e.g. "GBP").
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes other than GBP, USD and EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the price is not `AMOUNT CURRENCY` or the amount is not a number.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(code)?;

    let minor_units =
        to_minor(amount, currency).ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::policies::{Describe, PurchaseRule};

    use super::*;

    const SHOP: &str = r"
store: S1
currency: GBP
discounts:
  - type: PERCENTAGE
    scope: CATEGORY
    scopeId: books
    value: 10
  - type: FIXED
    value: 5
purchase_rules:
  - type: MINITEMS
    value: 2
basket:
  - product: P1
    category: books
    quantity: 2
    price: 20.00 GBP
  - product: P2
    category: toys
    quantity: 1
    price: 10.00 GBP
";

    #[test]
    fn parse_price_accepts_amount_and_code() -> TestResult {
        let (minor, currency) = parse_price("2.99 GBP")?;

        assert_eq!(minor, 299);
        assert_eq!(currency, GBP);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn fixture_builds_policies_in_order() -> TestResult {
        let fixture = Fixture::from_yaml(SHOP)?;
        let policies = fixture.policies()?;

        let descriptions: Vec<String> = policies.discounts().iter().map(Describe::describe).collect();

        assert_eq!(descriptions, ["10% off category books", "5.00£ off store-wide"]);
        assert_eq!(
            policies.purchase_rules(),
            [PurchaseRule::Default, PurchaseRule::MinItems(2)]
        );

        Ok(())
    }

    #[test]
    fn fixture_builds_basket() -> TestResult {
        let basket = Fixture::from_yaml(SHOP)?.basket()?;

        assert_eq!(basket.len(), 2);
        assert_eq!(basket.subtotal(), Money::from_minor(5000, GBP));

        Ok(())
    }

    #[test]
    fn foreign_basket_prices_are_rejected() -> TestResult {
        let fixture = Fixture::from_yaml(&SHOP.replace("10.00 GBP", "10.00 USD"))?;

        assert!(matches!(
            fixture.basket(),
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "GBP" && found == "USD"
        ));

        Ok(())
    }

    #[tokio::test]
    async fn catalog_resolves_fixture_products() -> TestResult {
        let catalog = Fixture::from_yaml(SHOP)?.catalog();

        let info = catalog.resolve(&ProductId::from("P2")).await?;

        assert_eq!(info.category, "toys");
        assert_eq!(info.store, StoreId::from("S1"));
        assert_eq!(
            catalog.resolve(&ProductId::from("P9")).await,
            Err(ExternalError::UnknownProduct(ProductId::from("P9")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn snapshot_resolves_to_the_fixture_basket() -> TestResult {
        let fixture = Fixture::from_yaml(SHOP)?;

        let resolved = fixture
            .snapshot()?
            .resolve(&fixture.catalog(), fixture.store(), fixture.currency())
            .await?;

        assert_eq!(resolved, fixture.basket()?);

        Ok(())
    }

    #[test]
    fn malformed_policies_are_reported() -> TestResult {
        let fixture = Fixture::from_yaml(&SHOP.replace("value: 10", "value: 150"))?;

        assert!(matches!(fixture.policies(), Err(FixtureError::Invalid(_))));

        Ok(())
    }
}
