//! Store policy collection.

use rusty_money::iso::Currency;
use tracing::debug;

use crate::{
    basket::Basket,
    policies::{
        Describe, DiscountNode, PurchaseCheck, PurchaseRule, Quote, check, quote, validate,
        validate_for_currency,
        validation::{validate_rule, validate_rule_for_currency},
    },
    products::StoreId,
    store::errors::PolicyError,
};

/// The ordered discount policies and purchase rules one store owns.
///
/// Every mutation is validate, then currency check, then duplicate check, then append; a
/// rejected policy leaves the collection untouched. Duplicates are detected by canonical
/// description, so two composites with the same children in a different order are distinct.
#[derive(Debug, Clone)]
pub struct StorePolicies<'a> {
    store: StoreId,
    currency: &'a Currency,
    discounts: Vec<DiscountNode<'a>>,
    purchase_rules: Vec<PurchaseRule<'a>>,
}

impl<'a> StorePolicies<'a> {
    /// Create a collection holding only the default purchase rule.
    pub fn new(store: StoreId, currency: &'a Currency) -> Self {
        Self {
            store,
            currency,
            discounts: Vec::new(),
            purchase_rules: vec![PurchaseRule::Default],
        }
    }

    /// The store that owns these policies
    pub fn store(&self) -> &StoreId {
        &self.store
    }

    /// The currency every amount must be priced in
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Discount policies, in insertion order
    pub fn discounts(&self) -> &[DiscountNode<'a>] {
        &self.discounts
    }

    /// Purchase rules, in insertion order
    pub fn purchase_rules(&self) -> &[PurchaseRule<'a>] {
        &self.purchase_rules
    }

    /// Append a discount policy.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Invalid`]: the node is malformed or priced in another currency.
    /// - [`PolicyError::DuplicatePolicy`]: an identical policy already exists.
    pub fn add_discount(&mut self, node: DiscountNode<'a>) -> Result<(), PolicyError> {
        validate(&node)?;
        validate_for_currency(&node, self.currency)?;

        let description = node.describe();

        if self
            .discounts
            .iter()
            .any(|existing| existing.describe() == description)
        {
            return Err(PolicyError::DuplicatePolicy { description });
        }

        debug!(store = %self.store, policy = %description, "added discount policy");

        self.discounts.push(node);

        Ok(())
    }

    /// Append a purchase rule.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Invalid`]: the rule is out of range or priced in another currency.
    /// - [`PolicyError::DuplicatePolicy`]: an identical rule already exists.
    pub fn add_purchase_rule(&mut self, rule: PurchaseRule<'a>) -> Result<(), PolicyError> {
        validate_rule(&rule)?;
        validate_rule_for_currency(&rule, self.currency)?;

        let description = rule.describe();

        if self
            .purchase_rules
            .iter()
            .any(|existing| existing.describe() == description)
        {
            return Err(PolicyError::DuplicatePolicy { description });
        }

        debug!(store = %self.store, rule = %description, "added purchase rule");

        self.purchase_rules.push(rule);

        Ok(())
    }

    /// Remove the discount policy whose description is `description`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::NotFound`] when no policy matches.
    pub fn remove_discount(&mut self, description: &str) -> Result<DiscountNode<'a>, PolicyError> {
        let index = self
            .discounts
            .iter()
            .position(|node| node.describe() == description)
            .ok_or_else(|| PolicyError::NotFound {
                description: description.to_string(),
            })?;

        debug!(store = %self.store, policy = %description, "removed discount policy");

        Ok(self.discounts.remove(index))
    }

    /// Remove the purchase rule whose description is `description`.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::DefaultNotRemovable`]: the match is the default rule.
    /// - [`PolicyError::NotFound`]: no rule matches.
    pub fn remove_purchase_rule(
        &mut self,
        description: &str,
    ) -> Result<PurchaseRule<'a>, PolicyError> {
        let index = self
            .purchase_rules
            .iter()
            .position(|rule| rule.describe() == description)
            .ok_or_else(|| PolicyError::NotFound {
                description: description.to_string(),
            })?;

        if matches!(self.purchase_rules.get(index), Some(PurchaseRule::Default)) {
            return Err(PolicyError::DefaultNotRemovable);
        }

        debug!(store = %self.store, rule = %description, "removed purchase rule");

        Ok(self.purchase_rules.remove(index))
    }

    /// Check `basket` against every purchase rule.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::CurrencyMismatch`] if the basket is in another currency.
    pub fn check(&self, basket: &Basket<'_>) -> Result<PurchaseCheck<'a>, PolicyError> {
        self.ensure_currency(basket)?;

        Ok(check(&self.purchase_rules, basket))
    }

    /// Price `basket` against every discount policy.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::CurrencyMismatch`]: the basket is in another currency.
    /// - [`PolicyError::Discount`]: discount arithmetic failed.
    pub fn quote(&self, basket: &Basket<'a>) -> Result<Quote<'a>, PolicyError> {
        self.ensure_currency(basket)?;

        Ok(quote(&self.discounts, basket)?)
    }

    /// Gate `basket` with the purchase rules, then price it.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Rejected`]: one or more purchase rules failed; every failure is listed.
    /// - Any error from [`StorePolicies::quote`].
    pub fn checkout(&self, basket: &Basket<'a>) -> Result<Quote<'a>, PolicyError> {
        let outcome = self.check(basket)?;

        if !outcome.is_ok() {
            return Err(PolicyError::Rejected {
                violations: outcome
                    .violations()
                    .iter()
                    .map(Describe::describe)
                    .collect(),
            });
        }

        self.quote(basket)
    }

    fn ensure_currency(&self, basket: &Basket<'_>) -> Result<(), PolicyError> {
        if basket.currency() == self.currency {
            Ok(())
        } else {
            Err(PolicyError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                found: basket.currency().iso_alpha_code,
            })
        }
    }
}
