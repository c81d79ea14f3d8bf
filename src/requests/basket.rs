//! Basket snapshots and evaluator responses.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    basket::{Basket, BasketLine},
    policies::{PurchaseCheck, ValidationErrors},
    products::{ProductCatalog, ProductId, StoreId},
    requests::{decimal, major, money},
    store::PolicyError,
};

/// A basket line as sent by the storefront client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLineRequest {
    /// Product on the line
    pub product_id: ProductId,

    /// Category; looked up in the catalog when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Units of the product
    pub quantity: u32,

    /// Price of one unit, in major units
    pub unit_price: f64,
}

/// A basket as sent by the storefront client, possibly spanning several stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasketSnapshot {
    /// Lines, in basket order
    pub lines: Vec<BasketLineRequest>,
}

impl BasketSnapshot {
    /// Resolve every line through `catalog` and keep the lines sold by `store`.
    ///
    /// Lines sold by other stores are dropped before their prices and quantities are checked.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::External`]: the catalog failed or does not know a product.
    /// - [`PolicyError::Invalid`]: a unit price is not a representable amount.
    /// - [`PolicyError::Basket`]: the lines do not form a valid basket.
    pub async fn resolve<C: ProductCatalog + ?Sized>(
        &self,
        catalog: &C,
        store: &StoreId,
        currency: &'static Currency,
    ) -> Result<Basket<'static>, PolicyError> {
        let mut lines = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            let info = catalog.resolve(&line.product_id).await?;

            if info.store != *store {
                continue;
            }

            let unit_price = decimal("unitPrice", line.unit_price)
                .and_then(|value| money("unitPrice", value, currency))
                .map_err(ValidationErrors::from)?;

            lines.push(BasketLine::new(
                line.product_id.clone(),
                line.category.clone().unwrap_or(info.category),
                info.store,
                line.quantity,
                unit_price,
            ));
        }

        let basket = Basket::with_lines(lines, currency)?;

        debug!(store = %store, lines = basket.len(), "resolved basket");

        Ok(basket)
    }
}

/// Discount a store's policies take off a basket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountAmountResponse {
    /// Amount in major units
    pub discount_amount: f64,
}

/// Outcome of checking a basket against a store's purchase rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCheckResponse {
    /// Whether every rule passed
    pub ok: bool,

    /// Descriptions of the rules that failed
    pub violations: Vec<String>,
}

impl DiscountAmountResponse {
    /// Render a discount amount.
    pub fn new(amount: &Money<'_, Currency>) -> Self {
        Self {
            discount_amount: major(amount),
        }
    }
}

impl From<&PurchaseCheck<'_>> for PurchaseCheckResponse {
    fn from(check: &PurchaseCheck<'_>) -> Self {
        Self {
            ok: check.is_ok(),
            violations: check.violations().iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        external::ExternalError,
        products::{MockProductCatalog, ProductInfo},
    };

    use super::*;

    fn snapshot() -> Result<BasketSnapshot, serde_json::Error> {
        serde_json::from_value(json!({
            "lines": [
                { "productId": "P1", "quantity": 2, "unitPrice": 20.0 },
                { "productId": "P2", "category": "Gifts", "quantity": 1, "unitPrice": 10.0 },
                { "productId": "X1", "quantity": 5, "unitPrice": 1.0 }
            ]
        }))
    }

    fn catalog() -> MockProductCatalog {
        let mut catalog = MockProductCatalog::new();

        catalog.expect_resolve().returning(|product| {
            let store = if product.as_str().starts_with('X') { "S2" } else { "S1" };

            Ok(ProductInfo {
                category: "books".to_string(),
                store: StoreId::from(store),
            })
        });

        catalog
    }

    #[tokio::test]
    async fn resolve_keeps_only_the_stores_lines() -> TestResult {
        let basket = snapshot()?
            .resolve(&catalog(), &StoreId::from("S1"), GBP)
            .await?;

        assert_eq!(basket.len(), 2);
        assert_eq!(basket.subtotal(), Money::from_minor(5000, GBP));
        assert_eq!(basket.category_quantity("gifts"), 1);
        assert_eq!(basket.category_quantity("books"), 2);

        Ok(())
    }

    #[tokio::test]
    async fn malformed_lines_from_other_stores_are_ignored() -> TestResult {
        let snapshot: BasketSnapshot = serde_json::from_value(json!({
            "lines": [
                { "productId": "P1", "quantity": 2, "unitPrice": 20.0 },
                { "productId": "X1", "quantity": 0, "unitPrice": -1.0 },
                { "productId": "X2", "quantity": 1, "unitPrice": 1.0e300 }
            ]
        }))?;

        let basket = snapshot
            .resolve(&catalog(), &StoreId::from("S1"), GBP)
            .await?;

        assert_eq!(basket.len(), 1);
        assert_eq!(basket.subtotal(), Money::from_minor(4000, GBP));

        let other = snapshot
            .resolve(&catalog(), &StoreId::from("S2"), GBP)
            .await;

        assert!(other.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn resolve_propagates_catalog_errors() -> TestResult {
        let mut catalog = MockProductCatalog::new();

        catalog
            .expect_resolve()
            .returning(|product| Err(ExternalError::UnknownProduct(product.clone())));

        let result = snapshot()?
            .resolve(&catalog, &StoreId::from("S1"), GBP)
            .await;

        assert_eq!(
            result.err(),
            Some(PolicyError::External(ExternalError::UnknownProduct(
                ProductId::from("P1")
            )))
        );

        Ok(())
    }

    #[test]
    fn responses_use_camel_case() -> TestResult {
        let response = DiscountAmountResponse::new(&Money::from_minor(1000, GBP));

        assert_eq!(
            serde_json::to_value(response)?,
            json!({ "discountAmount": 10.0 })
        );

        Ok(())
    }
}
