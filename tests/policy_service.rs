//! Policy service behaviour over the in-memory repository and mocked collaborators.

use rusty_money::iso::USD;
use serde_json::json;
use testresult::TestResult;

use storefront_policy::{
    external::ExternalError,
    prelude::*,
    products::MockProductCatalog,
    store::MockPolicyRepository,
};

fn catalog() -> MockProductCatalog {
    let mut catalog = MockProductCatalog::new();

    catalog.expect_resolve().returning(|product| {
        let id = product.as_str();

        let category = if id.starts_with('B') { "books" } else { "toys" };
        let store = if id.starts_with('X') { "S2" } else { "S1" };

        Ok(ProductInfo {
            category: category.to_string(),
            store: StoreId::from(store),
        })
    });

    catalog
}

async fn service() -> PolicyService<InMemoryPolicyRepository, MockProductCatalog> {
    let repository = InMemoryPolicyRepository::new();

    repository.register_store(StoreId::from("S1"), USD).await;

    PolicyService::new(repository, catalog())
}

fn discount(value: serde_json::Value) -> Result<AddDiscountRequest, serde_json::Error> {
    serde_json::from_value(value)
}

fn snapshot() -> Result<BasketSnapshot, serde_json::Error> {
    serde_json::from_value(json!({
        "lines": [
            { "productId": "B1", "quantity": 2, "unitPrice": 20.0 },
            { "productId": "T1", "quantity": 1, "unitPrice": 10.0 },
            { "productId": "X1", "quantity": 5, "unitPrice": 1.0 }
        ]
    }))
}

#[tokio::test]
async fn discounts_are_added_listed_and_removed() -> TestResult {
    let service = service().await;
    let store = StoreId::from("S1");

    let books = discount(json!({
        "type": "PERCENTAGE",
        "scope": "CATEGORY",
        "scopeId": "books",
        "value": 10
    }))?;

    let description = service.add_discount(&store, &books).await?;

    assert_eq!(description, "10% off category books");
    assert_eq!(service.list_discounts(&store).await?, vec![books.clone()]);

    assert_eq!(
        service.add_discount(&store, &books).await,
        Err(PolicyError::DuplicatePolicy { description: description.clone() })
    );

    service.remove_discount(&store, &description).await?;

    assert!(service.list_discounts(&store).await?.is_empty());
    assert_eq!(
        service.remove_discount(&store, &description).await,
        Err(PolicyError::NotFound { description })
    );

    Ok(())
}

#[tokio::test]
async fn malformed_requests_are_rejected() -> TestResult {
    let service = service().await;

    let result = service
        .add_discount(
            &StoreId::from("S1"),
            &discount(json!({ "type": "PERCENTAGE", "scope": "PRODUCT", "value": 120 }))?,
        )
        .await;

    let Err(PolicyError::Invalid(errors)) = result else {
        panic!("expected a validation failure, got {result:?}");
    };

    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&ValidationError::MissingScopeTarget { scope: ScopeKind::Product }));

    Ok(())
}

#[tokio::test]
async fn discount_amount_only_counts_the_stores_lines() -> TestResult {
    let service = service().await;
    let store = StoreId::from("S1");

    service
        .add_discount(
            &store,
            &discount(json!({ "type": "PERCENTAGE", "scope": "CATEGORY", "scopeId": "books", "value": 10 }))?,
        )
        .await?;

    let basket = service.resolve_basket(&store, &snapshot()?).await?;

    assert_eq!(basket.len(), 2);

    let response = service.discount_amount(&store, &snapshot()?).await?;

    assert_eq!(serde_json::to_value(response)?, json!({ "discountAmount": 4.0 }));

    Ok(())
}

#[tokio::test]
async fn purchase_rules_gate_checkout() -> TestResult {
    let service = service().await;
    let store = StoreId::from("S1");

    let rule: AddPurchaseRuleRequest =
        serde_json::from_value(json!({ "type": "MINPRICE", "value": 100 }))?;

    assert_eq!(
        service.add_purchase_rule(&store, &rule).await?,
        "basket total at least 100.00$"
    );
    assert_eq!(service.list_purchase_rules(&store).await?.len(), 2);

    let check = service.check_purchase(&store, &snapshot()?).await?;

    assert!(!check.ok);
    assert_eq!(check.violations, ["basket total at least 100.00$"]);

    assert_eq!(
        service.checkout(&store, &snapshot()?).await,
        Err(PolicyError::Rejected {
            violations: vec!["basket total at least 100.00$".to_string()],
        })
    );

    service
        .remove_purchase_rule(&store, "basket total at least 100.00$")
        .await?;

    let quote = service.checkout(&store, &snapshot()?).await?;

    assert_eq!(quote.total.to_minor_units(), 5000);

    Ok(())
}

#[tokio::test]
async fn default_purchase_rule_cannot_be_removed() {
    let service = service().await;

    assert_eq!(
        service
            .remove_purchase_rule(&StoreId::from("S1"), "no restriction")
            .await,
        Err(PolicyError::DefaultNotRemovable)
    );
}

#[tokio::test]
async fn repository_failures_are_propagated() -> TestResult {
    let mut repository = MockPolicyRepository::new();

    repository
        .expect_policies()
        .returning(|_| Err(PolicyError::External(ExternalError::Unauthorized)));
    repository.expect_add_discount().never();

    let service = PolicyService::new(repository, MockProductCatalog::new());

    let result = service
        .add_discount(
            &StoreId::from("S1"),
            &discount(json!({ "type": "FIXED", "value": 5 }))?,
        )
        .await;

    assert_eq!(result, Err(PolicyError::External(ExternalError::Unauthorized)));

    Ok(())
}

#[tokio::test]
async fn catalog_failures_are_propagated() -> TestResult {
    let mut catalog = MockProductCatalog::new();

    catalog
        .expect_resolve()
        .returning(|_| Err(ExternalError::Network("catalog unavailable".to_string())));

    let repository = InMemoryPolicyRepository::new();
    repository.register_store(StoreId::from("S1"), USD).await;

    let service = PolicyService::new(repository, catalog);

    assert_eq!(
        service
            .check_purchase(&StoreId::from("S1"), &snapshot()?)
            .await,
        Err(PolicyError::External(ExternalError::Network(
            "catalog unavailable".to_string()
        )))
    );

    Ok(())
}

#[tokio::test]
async fn unknown_stores_are_reported() -> TestResult {
    let service = service().await;

    assert_eq!(
        service.list_discounts(&StoreId::from("S9")).await,
        Err(PolicyError::External(ExternalError::UnknownStore(StoreId::from("S9"))))
    );

    Ok(())
}
