//! Store policy service.

use tracing::{Span, info};

use crate::{
    basket::Basket,
    policies::{Describe, Quote},
    products::{ProductCatalog, StoreId},
    requests::{
        AddDiscountRequest, AddPurchaseRuleRequest, BasketSnapshot, DiscountAmountResponse,
        PurchaseCheckResponse,
    },
    store::{errors::PolicyError, policies::StorePolicies, repository::PolicyRepository},
};

/// Policy management and checkout pricing over a remote repository and catalog.
#[derive(Debug, Clone)]
pub struct PolicyService<R, C> {
    repository: R,
    catalog: C,
}

impl<R: PolicyRepository, C: ProductCatalog> PolicyService<R, C> {
    /// Create a service over `repository` and `catalog`.
    pub fn new(repository: R, catalog: C) -> Self {
        Self {
            repository,
            catalog,
        }
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validate and append a discount policy, returning its canonical description.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the request is malformed, duplicates an existing policy, or
    /// the repository fails.
    #[tracing::instrument(
        name = "policies.service.add_discount",
        skip(self, request),
        fields(store = %store, policy = tracing::field::Empty),
        err
    )]
    pub async fn add_discount(
        &self,
        store: &StoreId,
        request: &AddDiscountRequest,
    ) -> Result<String, PolicyError> {
        let currency = self.repository.policies(store).await?.currency();
        let node = request.into_node(currency)?;
        let description = node.describe();

        Span::current().record("policy", tracing::field::display(&description));

        self.repository.add_discount(store, node).await?;

        info!(policy = %description, "added discount policy");

        Ok(description)
    }

    /// Remove the discount policy with this canonical description.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if no policy matches or the repository fails.
    #[tracing::instrument(
        name = "policies.service.remove_discount",
        skip(self),
        fields(store = %store),
        err
    )]
    pub async fn remove_discount(&self, store: &StoreId, description: &str) -> Result<(), PolicyError> {
        self.repository.remove_discount(store, description).await?;

        info!(policy = %description, "removed discount policy");

        Ok(())
    }

    /// Validate and append a purchase rule, returning its canonical description.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the request is malformed, duplicates an existing rule, or the
    /// repository fails.
    #[tracing::instrument(
        name = "policies.service.add_purchase_rule",
        skip(self, request),
        fields(store = %store, rule_type = %request.rule_type),
        err
    )]
    pub async fn add_purchase_rule(
        &self,
        store: &StoreId,
        request: &AddPurchaseRuleRequest,
    ) -> Result<String, PolicyError> {
        let currency = self.repository.policies(store).await?.currency();
        let rule = request.into_rule(currency)?;
        let description = rule.describe();

        self.repository.add_purchase_rule(store, rule).await?;

        info!(rule = %description, "added purchase rule");

        Ok(description)
    }

    /// Remove the purchase rule with this canonical description.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if no rule matches, the rule is the default, or the repository
    /// fails.
    #[tracing::instrument(
        name = "policies.service.remove_purchase_rule",
        skip(self),
        fields(store = %store),
        err
    )]
    pub async fn remove_purchase_rule(
        &self,
        store: &StoreId,
        description: &str,
    ) -> Result<(), PolicyError> {
        self.repository
            .remove_purchase_rule(store, description)
            .await?;

        info!(rule = %description, "removed purchase rule");

        Ok(())
    }

    /// A store's discount policies, as requests.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the repository fails.
    pub async fn list_discounts(&self, store: &StoreId) -> Result<Vec<AddDiscountRequest>, PolicyError> {
        let discounts = self.repository.list_discounts(store).await?;

        Ok(discounts.iter().map(AddDiscountRequest::from).collect())
    }

    /// A store's purchase rules, as requests.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the repository fails.
    pub async fn list_purchase_rules(
        &self,
        store: &StoreId,
    ) -> Result<Vec<AddPurchaseRuleRequest>, PolicyError> {
        let rules = self.repository.list_purchase_rules(store).await?;

        Ok(rules.iter().map(AddPurchaseRuleRequest::from).collect())
    }

    /// Check a basket against a store's purchase rules.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the basket cannot be resolved or the repository fails.
    #[tracing::instrument(
        name = "policies.service.check_purchase",
        skip(self, snapshot),
        fields(store = %store, lines = snapshot.lines.len(), ok = tracing::field::Empty),
        err
    )]
    pub async fn check_purchase(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<PurchaseCheckResponse, PolicyError> {
        let (policies, basket) = self.load(store, snapshot).await?;

        let response = PurchaseCheckResponse::from(&policies.check(&basket)?);

        Span::current().record("ok", response.ok);

        Ok(response)
    }

    /// The discount a store's policies take off a basket.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the basket cannot be resolved, a discount fails to evaluate,
    /// or the repository fails.
    #[tracing::instrument(
        name = "policies.service.discount_amount",
        skip(self, snapshot),
        fields(store = %store, lines = snapshot.lines.len()),
        err
    )]
    pub async fn discount_amount(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<DiscountAmountResponse, PolicyError> {
        let quote = self.quote(store, snapshot).await?;

        Ok(DiscountAmountResponse::new(&quote.discount))
    }

    /// Gate a basket with a store's purchase rules, then price it.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Rejected`] listing every failed rule, or any error from resolving
    /// and pricing the basket.
    #[tracing::instrument(
        name = "policies.service.checkout",
        skip(self, snapshot),
        fields(store = %store, lines = snapshot.lines.len(), total = tracing::field::Empty),
        err
    )]
    pub async fn checkout(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<Quote<'static>, PolicyError> {
        let (policies, basket) = self.load(store, snapshot).await?;

        let quote = policies.checkout(&basket)?;

        Span::current().record("total", quote.total.to_minor_units());

        Ok(quote)
    }

    /// Resolve a client basket into the lines `store` sells, priced in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a `PolicyError` if the store is unknown, the catalog fails, or the lines do not
    /// form a valid basket.
    pub async fn resolve_basket(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<Basket<'static>, PolicyError> {
        let (_policies, basket) = self.load(store, snapshot).await?;

        Ok(basket)
    }

    async fn quote(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<Quote<'static>, PolicyError> {
        let (policies, basket) = self.load(store, snapshot).await?;

        policies.quote(&basket)
    }

    async fn load(
        &self,
        store: &StoreId,
        snapshot: &BasketSnapshot,
    ) -> Result<(StorePolicies<'static>, Basket<'static>), PolicyError> {
        let policies = self.repository.policies(store).await?;
        let basket = snapshot
            .resolve(&self.catalog, store, policies.currency())
            .await?;

        Ok((policies, basket))
    }
}
