//! Purchase Rules

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    basket::Basket,
    policies::validation::{ValidationError, ValidationErrors, validate_rule},
};

/// The type of a purchase rule, without its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseRuleKind {
    /// Minimum number of units in the basket
    #[serde(rename = "MINITEMS")]
    MinItems,

    /// Maximum number of units in the basket
    #[serde(rename = "MAXITEMS")]
    MaxItems,

    /// Minimum undiscounted basket total
    #[serde(rename = "MINPRICE")]
    MinPrice,

    /// No restriction
    #[serde(rename = "DEFAULT")]
    Default,
}

impl PurchaseRuleKind {
    /// Wire name of the rule type.
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseRuleKind::MinItems => "MINITEMS",
            PurchaseRuleKind::MaxItems => "MAXITEMS",
            PurchaseRuleKind::MinPrice => "MINPRICE",
            PurchaseRuleKind::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for PurchaseRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseRuleKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalized.as_str() {
            "MINITEMS" => Ok(PurchaseRuleKind::MinItems),
            "MAXITEMS" => Ok(PurchaseRuleKind::MaxItems),
            "MINPRICE" => Ok(PurchaseRuleKind::MinPrice),
            "DEFAULT" => Ok(PurchaseRuleKind::Default),
            _ => Err(ValidationError::UnknownPolicyType {
                kind: "purchase rule",
                name: s.to_string(),
            }),
        }
    }
}

/// A precondition a basket must meet before it can be bought.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PurchaseRule<'a> {
    /// At least this many units
    MinItems(u32),

    /// At most this many units
    MaxItems(u32),

    /// Undiscounted total of at least this amount
    MinPrice(Money<'a, Currency>),

    /// Always passes; every store has one and it cannot be removed
    Default,
}

impl<'a> PurchaseRule<'a> {
    /// Require at least `n` units.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `n` is zero.
    pub fn min_items(n: u32) -> Result<Self, ValidationErrors> {
        Self::validated(PurchaseRule::MinItems(n))
    }

    /// Allow at most `n` units.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `n` is zero.
    pub fn max_items(n: u32) -> Result<Self, ValidationErrors> {
        Self::validated(PurchaseRule::MaxItems(n))
    }

    /// Require an undiscounted total of at least `amount`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `amount` is not positive.
    pub fn min_price(amount: Money<'a, Currency>) -> Result<Self, ValidationErrors> {
        Self::validated(PurchaseRule::MinPrice(amount))
    }

    fn validated(rule: Self) -> Result<Self, ValidationErrors> {
        validate_rule(&rule)?;

        Ok(rule)
    }

    /// The rule's type.
    pub fn kind(&self) -> PurchaseRuleKind {
        match self {
            PurchaseRule::MinItems(_) => PurchaseRuleKind::MinItems,
            PurchaseRule::MaxItems(_) => PurchaseRuleKind::MaxItems,
            PurchaseRule::MinPrice(_) => PurchaseRuleKind::MinPrice,
            PurchaseRule::Default => PurchaseRuleKind::Default,
        }
    }

    /// Whether `basket` satisfies this rule.
    ///
    /// A minimum price in a currency other than the basket's is never satisfied.
    pub fn is_satisfied_by(&self, basket: &Basket<'_>) -> bool {
        match self {
            PurchaseRule::MinItems(n) => basket.item_count() >= u64::from(*n),
            PurchaseRule::MaxItems(n) => basket.item_count() <= u64::from(*n),
            PurchaseRule::MinPrice(amount) => {
                amount.currency() == basket.currency()
                    && basket.subtotal().to_minor_units() >= amount.to_minor_units()
            }
            PurchaseRule::Default => true,
        }
    }
}

/// Outcome of checking a basket against a store's purchase rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseCheck<'a> {
    violations: SmallVec<[PurchaseRule<'a>; 2]>,
}

impl<'a> PurchaseCheck<'a> {
    /// Whether every rule passed.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// The rules that failed, in the order they were configured.
    pub fn violations(&self) -> &[PurchaseRule<'a>] {
        &self.violations
    }
}

/// Check `basket` against every rule, collecting all that fail.
pub fn check<'a>(rules: &[PurchaseRule<'a>], basket: &Basket<'_>) -> PurchaseCheck<'a> {
    PurchaseCheck {
        violations: rules
            .iter()
            .filter(|rule| !rule.is_satisfied_by(basket))
            .copied()
            .collect(),
    }
}
