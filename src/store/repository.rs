//! Store policy persistence.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use tokio::sync::RwLock;

use crate::{
    external::ExternalError,
    policies::{DiscountNode, PurchaseRule},
    products::StoreId,
    store::{errors::PolicyError, policies::StorePolicies},
};

/// Remote home of every store's policy collection.
///
/// Implementations serialise mutations per store, so the validate, duplicate check and append
/// of an insert happen as one step.
#[automock]
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Snapshot of a store's whole policy collection.
    async fn policies(&self, store: &StoreId) -> Result<StorePolicies<'static>, PolicyError>;

    /// A store's discount policies, in insertion order.
    async fn list_discounts(
        &self,
        store: &StoreId,
    ) -> Result<Vec<DiscountNode<'static>>, PolicyError>;

    /// A store's purchase rules, in insertion order.
    async fn list_purchase_rules(
        &self,
        store: &StoreId,
    ) -> Result<Vec<PurchaseRule<'static>>, PolicyError>;

    /// Append a discount policy.
    async fn add_discount(
        &self,
        store: &StoreId,
        node: DiscountNode<'static>,
    ) -> Result<(), PolicyError>;

    /// Append a purchase rule.
    async fn add_purchase_rule(
        &self,
        store: &StoreId,
        rule: PurchaseRule<'static>,
    ) -> Result<(), PolicyError>;

    /// Remove the discount policy with this canonical description.
    async fn remove_discount(
        &self,
        store: &StoreId,
        description: &str,
    ) -> Result<DiscountNode<'static>, PolicyError>;

    /// Remove the purchase rule with this canonical description.
    async fn remove_purchase_rule(
        &self,
        store: &StoreId,
        description: &str,
    ) -> Result<PurchaseRule<'static>, PolicyError>;
}

/// Process-local policy repository.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    stores: RwLock<FxHashMap<StoreId, StorePolicies<'static>>>,
}

impl InMemoryPolicyRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store with an empty policy collection, keeping any existing one.
    pub async fn register_store(&self, store: StoreId, currency: &'static Currency) {
        let mut stores = self.stores.write().await;

        stores
            .entry(store.clone())
            .or_insert_with(|| StorePolicies::new(store, currency));
    }

    /// Seed a store with an existing collection, replacing any current one.
    pub async fn insert(&self, policies: StorePolicies<'static>) {
        let mut stores = self.stores.write().await;

        stores.insert(policies.store().clone(), policies);
    }
}

fn unknown(store: &StoreId) -> PolicyError {
    PolicyError::External(ExternalError::UnknownStore(store.clone()))
}

#[async_trait]
impl PolicyRepository for InMemoryPolicyRepository {
    async fn policies(&self, store: &StoreId) -> Result<StorePolicies<'static>, PolicyError> {
        let stores = self.stores.read().await;

        stores.get(store).cloned().ok_or_else(|| unknown(store))
    }

    async fn list_discounts(
        &self,
        store: &StoreId,
    ) -> Result<Vec<DiscountNode<'static>>, PolicyError> {
        let stores = self.stores.read().await;

        stores
            .get(store)
            .map(|policies| policies.discounts().to_vec())
            .ok_or_else(|| unknown(store))
    }

    async fn list_purchase_rules(
        &self,
        store: &StoreId,
    ) -> Result<Vec<PurchaseRule<'static>>, PolicyError> {
        let stores = self.stores.read().await;

        stores
            .get(store)
            .map(|policies| policies.purchase_rules().to_vec())
            .ok_or_else(|| unknown(store))
    }

    async fn add_discount(
        &self,
        store: &StoreId,
        node: DiscountNode<'static>,
    ) -> Result<(), PolicyError> {
        let mut stores = self.stores.write().await;

        stores
            .get_mut(store)
            .ok_or_else(|| unknown(store))?
            .add_discount(node)
    }

    async fn add_purchase_rule(
        &self,
        store: &StoreId,
        rule: PurchaseRule<'static>,
    ) -> Result<(), PolicyError> {
        let mut stores = self.stores.write().await;

        stores
            .get_mut(store)
            .ok_or_else(|| unknown(store))?
            .add_purchase_rule(rule)
    }

    async fn remove_discount(
        &self,
        store: &StoreId,
        description: &str,
    ) -> Result<DiscountNode<'static>, PolicyError> {
        let mut stores = self.stores.write().await;

        stores
            .get_mut(store)
            .ok_or_else(|| unknown(store))?
            .remove_discount(description)
    }

    async fn remove_purchase_rule(
        &self,
        store: &StoreId,
        description: &str,
    ) -> Result<PurchaseRule<'static>, PolicyError> {
        let mut stores = self.stores.write().await;

        stores
            .get_mut(store)
            .ok_or_else(|| unknown(store))?
            .remove_purchase_rule(description)
    }
}
