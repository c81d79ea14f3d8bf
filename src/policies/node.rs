//! Discount Nodes

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    discounts::SimpleDiscount,
    policies::{
        conditions::Condition,
        scope::{Scope, ScopeKind},
        validation::{ValidationError, ValidationErrors, validate},
    },
    pricing::to_minor,
};

/// Whether a basic discount takes a percentage or a fixed amount off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    /// Percentage off the eligible total
    Percentage,

    /// Fixed amount off the eligible total
    Fixed,
}

impl DiscountKind {
    /// Wire name of the discount kind.
    pub fn as_str(self) -> &'static str {
        match self {
            DiscountKind::Percentage => "PERCENTAGE",
            DiscountKind::Fixed => "FIXED",
        }
    }
}

/// How a composite discount merges its children's amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Combination {
    /// Add every child's discount together
    #[default]
    Sum,

    /// Take only the largest child discount
    Maximum,
}

impl Combination {
    /// Wire name of the combination.
    pub fn as_str(self) -> &'static str {
        match self {
            Combination::Sum => "SUM",
            Combination::Maximum => "MAXIMUM",
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Combination {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" => Ok(Combination::Sum),
            "MAX" | "MAXIMUM" => Ok(Combination::Maximum),
            _ => Err(ValidationError::UnknownPolicyType {
                kind: "combination",
                name: s.to_string(),
            }),
        }
    }
}

/// A discount definition: a flat rule, a gated rule, or a combination of rules.
///
/// Trees own their children outright, so cloning a node deep-copies it and no two policies
/// ever share a sub-tree. Nodes are not edited after construction; replace them instead.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountNode<'a> {
    /// A flat discount over the lines its scope selects.
    Basic {
        /// Amount taken off
        discount: SimpleDiscount<'a>,

        /// Lines the discount applies to
        scope: Scope,
    },

    /// A discount that only applies while a condition holds.
    Conditional {
        /// Discount applied when the condition holds; never composite
        base: Box<DiscountNode<'a>>,

        /// Gate
        condition: Condition<'a>,
    },

    /// Two or more non-composite discounts merged into one amount.
    Composite {
        /// Children, in declaration order
        children: Vec<DiscountNode<'a>>,

        /// How the children's amounts are merged
        combine: Combination,
    },
}

impl<'a> DiscountNode<'a> {
    /// Build a basic discount.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if the amount is out of range or the scope has a blank target.
    pub fn basic(discount: SimpleDiscount<'a>, scope: Scope) -> Result<Self, ValidationErrors> {
        Self::validated(DiscountNode::Basic { discount, scope })
    }

    /// Build a percentage discount; `percent` is on the 0-100 scale.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `percent` is outside `(0, 100]`.
    pub fn percentage(percent: Decimal, scope: Scope) -> Result<Self, ValidationErrors> {
        Self::basic(SimpleDiscount::PercentageOff(percent), scope)
    }

    /// Build a fixed amount discount.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationErrors` if `amount` is not positive.
    pub fn fixed(amount: Money<'a, Currency>, scope: Scope) -> Result<Self, ValidationErrors> {
        Self::basic(SimpleDiscount::AmountOff(amount), scope)
    }

    /// Build a basic discount from loose parts, as they arrive from a policy form.
    ///
    /// Fixed values are major units of `currency`. Every problem is reported, so a missing scope
    /// target and an out-of-range value surface together.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRange`] and/or [`ValidationError::MissingScopeTarget`].
    pub fn from_parts(
        kind: DiscountKind,
        scope: ScopeKind,
        scope_id: Option<&str>,
        value: Decimal,
        currency: &'a Currency,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let scope = match Scope::from_parts(scope, scope_id) {
            Ok(scope) => Some(scope),
            Err(error) => {
                errors.push(error);
                None
            }
        };

        let discount = match kind {
            DiscountKind::Percentage => SimpleDiscount::PercentageOff(value),
            DiscountKind::Fixed => {
                let Some(minor) = to_minor(value, currency) else {
                    errors.push(ValidationError::InvalidRange {
                        field: "value",
                        expected: "representable in minor units",
                        found: value.normalize().to_string(),
                    });

                    return Err(errors);
                };

                SimpleDiscount::AmountOff(Money::from_minor(minor, currency))
            }
        };

        let Some(scope) = scope else {
            // Still report range problems alongside the missing target.
            let unscoped = DiscountNode::Basic {
                discount,
                scope: Scope::Store,
            };

            if let Err(more) = validate(&unscoped) {
                errors.extend(more);
            }

            return Err(errors);
        };

        Self::basic(discount, scope)
    }

    /// Gate `base` behind `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBase`] if `base` is composite, plus any problems with
    /// `base` or `condition` themselves.
    pub fn conditional(
        base: DiscountNode<'a>,
        condition: Condition<'a>,
    ) -> Result<Self, ValidationErrors> {
        Self::validated(DiscountNode::Conditional {
            base: Box::new(base),
            condition,
        })
    }

    /// Merge two or more non-composite discounts.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InsufficientChildren`], [`ValidationError::NestedComposite`],
    /// [`ValidationError::DuplicateChild`] and any child's own problems, all in one report.
    pub fn composite(
        children: Vec<DiscountNode<'a>>,
        combine: Combination,
    ) -> Result<Self, ValidationErrors> {
        Self::validated(DiscountNode::Composite { children, combine })
    }

    fn validated(node: Self) -> Result<Self, ValidationErrors> {
        validate(&node)?;

        Ok(node)
    }

    /// Whether this node is a composite.
    pub fn is_composite(&self) -> bool {
        matches!(self, DiscountNode::Composite { .. })
    }

    /// Wire name of the node's type.
    pub fn type_as_str(&self) -> &'static str {
        match self {
            DiscountNode::Basic {
                discount: SimpleDiscount::PercentageOff(_),
                ..
            } => DiscountKind::Percentage.as_str(),
            DiscountNode::Basic {
                discount: SimpleDiscount::AmountOff(_),
                ..
            } => DiscountKind::Fixed.as_str(),
            DiscountNode::Conditional { .. } => "CONDITIONAL",
            DiscountNode::Composite { .. } => "COMPOSITE",
        }
    }
}
