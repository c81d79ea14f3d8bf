//! Policy Validation
//!
//! Structural and range checks for discount trees, conditions and purchase rules. Every check
//! collects all problems it finds instead of stopping at the first, so a policy author sees the
//! whole list in one go. The validating constructors on [`DiscountNode`], [`Condition`] and
//! [`PurchaseRule`] are built on these functions, so anything they produce passes [`validate`].

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    discounts::SimpleDiscount,
    policies::{
        conditions::Condition, node::DiscountNode, purchase::PurchaseRule, scope::Scope,
        scope::ScopeKind,
    },
    pricing::format_money,
};

/// A single reason a policy was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A numeric value is outside the accepted range.
    #[error("{field} must be {expected}, got {found}")]
    InvalidRange {
        /// Name of the offending field
        field: &'static str,

        /// Accepted range
        expected: &'static str,

        /// Rejected value
        found: String,
    },

    /// A product or category scope has no target identifier.
    #[error("{scope} scope requires a target id")]
    MissingScopeTarget {
        /// Scope that is missing its target
        scope: ScopeKind,
    },

    /// A composite discount was used as the base of a conditional discount.
    #[error("a conditional discount cannot wrap a composite discount")]
    InvalidBase,

    /// A composite discount has fewer than two children.
    #[error("a composite discount needs at least 2 children, got {found}")]
    InsufficientChildren {
        /// Number of children supplied
        found: usize,
    },

    /// A composite discount contains another composite.
    #[error("child {index} of a composite discount is itself composite")]
    NestedComposite {
        /// Position of the nested composite among its siblings
        index: usize,
    },

    /// A composite discount repeats one of its earlier children.
    #[error("child {index} of a composite discount duplicates an earlier child")]
    DuplicateChild {
        /// Position of the repeated child among its siblings
        index: usize,
    },

    /// A condition group has no conditions.
    #[error("a condition group needs at least one condition")]
    EmptyConditionGroup,

    /// A condition type name is not recognised.
    #[error("unknown condition type {0}")]
    UnknownConditionType(String),

    /// A discount, scope, combination or purchase rule type name is not recognised.
    #[error("unknown {kind} type {name}")]
    UnknownPolicyType {
        /// What was being named
        kind: &'static str,

        /// Unrecognised name
        name: String,
    },

    /// A required request field was absent.
    #[error("missing field {0}")]
    MissingField(&'static str),

    /// An amount is in a different currency to the store.
    #[error("amount is in {found}, but store prices in {expected}")]
    CurrencyMismatch {
        /// Store currency code
        expected: &'static str,

        /// Amount currency code
        found: &'static str,
    },
}

/// Every reason a policy was rejected, in discovery order.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq)]
#[error("{}", join_errors(.0))]
pub struct ValidationErrors(SmallVec<[ValidationError; 2]>);

fn join_errors(errors: &SmallVec<[ValidationError; 2]>) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Create an empty error list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record every error from another list.
    pub fn extend(&mut self, errors: ValidationErrors) {
        self.0.extend(errors.0);
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of errors recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the recorded errors.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether an error equal to `error` was recorded.
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push(error);
        errors
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = smallvec::IntoIter<[ValidationError; 2]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Re-check every structural and range invariant of a discount tree.
///
/// # Errors
///
/// Returns every violation found anywhere in the tree.
pub fn validate(node: &DiscountNode<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_node(node, &mut errors);

    errors.into_result()
}

/// Check every invariant of a condition, including nested groups.
///
/// # Errors
///
/// Returns every violation found in the condition.
pub fn validate_condition(condition: &Condition<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_condition(condition, &mut errors);

    errors.into_result()
}

/// Check the range invariant of a purchase rule.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidRange`] for a zero item count or non-positive price.
pub fn validate_rule(rule: &PurchaseRule<'_>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match rule {
        PurchaseRule::MinItems(n) | PurchaseRule::MaxItems(n) if *n == 0 => {
            errors.push(ValidationError::InvalidRange {
                field: "items",
                expected: ">= 1",
                found: n.to_string(),
            });
        }
        PurchaseRule::MinPrice(amount) => check_positive_money("minPrice", amount, &mut errors),
        PurchaseRule::MinItems(_) | PurchaseRule::MaxItems(_) | PurchaseRule::Default => {}
    }

    errors.into_result()
}

/// Check that every amount in a discount tree is priced in `currency`.
///
/// # Errors
///
/// Returns a [`ValidationError::CurrencyMismatch`] for each foreign amount.
pub fn validate_for_currency(
    node: &DiscountNode<'_>,
    currency: &Currency,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    node_currencies(node, currency, &mut errors);

    errors.into_result()
}

/// Check that a purchase rule's amount, if any, is priced in `currency`.
///
/// # Errors
///
/// Returns [`ValidationError::CurrencyMismatch`] for a foreign minimum price.
pub fn validate_rule_for_currency(
    rule: &PurchaseRule<'_>,
    currency: &Currency,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let PurchaseRule::MinPrice(amount) = rule {
        check_currency(amount, currency, &mut errors);
    }

    errors.into_result()
}

fn check_node(node: &DiscountNode<'_>, errors: &mut ValidationErrors) {
    match node {
        DiscountNode::Basic { discount, scope } => {
            check_discount(discount, errors);
            check_scope(scope, errors);
        }
        DiscountNode::Conditional { base, condition } => {
            if base.is_composite() {
                errors.push(ValidationError::InvalidBase);
            } else {
                check_node(base, errors);
            }

            check_condition(condition, errors);
        }
        DiscountNode::Composite { children, .. } => {
            if children.len() < 2 {
                errors.push(ValidationError::InsufficientChildren {
                    found: children.len(),
                });
            }

            let mut seen = FxHashSet::default();

            for (index, child) in children.iter().enumerate() {
                if child.is_composite() {
                    errors.push(ValidationError::NestedComposite { index });
                    continue;
                }

                check_node(child, errors);

                if !seen.insert(child.to_string()) {
                    errors.push(ValidationError::DuplicateChild { index });
                }
            }
        }
    }
}

fn check_discount(discount: &SimpleDiscount<'_>, errors: &mut ValidationErrors) {
    match discount {
        SimpleDiscount::PercentageOff(percent) => {
            if *percent <= Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                errors.push(ValidationError::InvalidRange {
                    field: "value",
                    expected: "in (0, 100]",
                    found: percent.normalize().to_string(),
                });
            }
        }
        SimpleDiscount::AmountOff(amount) => check_positive_money("value", amount, errors),
    }
}

fn check_scope(scope: &Scope, errors: &mut ValidationErrors) {
    let blank = scope.target().is_some_and(|target| target.trim().is_empty());

    if blank {
        errors.push(ValidationError::MissingScopeTarget {
            scope: scope.kind(),
        });
    }
}

fn check_condition(condition: &Condition<'_>, errors: &mut ValidationErrors) {
    match condition {
        Condition::BasketTotalAtLeast(min_total) => {
            check_positive_money("minTotal", min_total, errors);
        }
        Condition::ProductQuantityAtLeast {
            product,
            min_quantity,
        } => {
            if product.as_str().trim().is_empty() {
                errors.push(ValidationError::MissingField("productId"));
            }

            check_min_quantity(*min_quantity, errors);
        }
        Condition::CategoryQuantityAtLeast {
            category,
            min_quantity,
        } => {
            if category.trim().is_empty() {
                errors.push(ValidationError::MissingField("category"));
            }

            check_min_quantity(*min_quantity, errors);
        }
        Condition::Group { conditions, .. } => {
            if conditions.is_empty() {
                errors.push(ValidationError::EmptyConditionGroup);
            }

            for condition in conditions {
                check_condition(condition, errors);
            }
        }
    }
}

fn check_min_quantity(min_quantity: u32, errors: &mut ValidationErrors) {
    if min_quantity == 0 {
        errors.push(ValidationError::InvalidRange {
            field: "minQuantity",
            expected: ">= 1",
            found: min_quantity.to_string(),
        });
    }
}

fn check_positive_money(
    field: &'static str,
    amount: &Money<'_, Currency>,
    errors: &mut ValidationErrors,
) {
    if amount.to_minor_units() <= 0 {
        errors.push(ValidationError::InvalidRange {
            field,
            expected: "> 0",
            found: format_money(amount),
        });
    }
}

fn node_currencies(node: &DiscountNode<'_>, currency: &Currency, errors: &mut ValidationErrors) {
    match node {
        DiscountNode::Basic {
            discount: SimpleDiscount::AmountOff(amount),
            ..
        } => check_currency(amount, currency, errors),
        DiscountNode::Basic { .. } => {}
        DiscountNode::Conditional { base, condition } => {
            node_currencies(base, currency, errors);
            condition_currencies(condition, currency, errors);
        }
        DiscountNode::Composite { children, .. } => {
            for child in children {
                node_currencies(child, currency, errors);
            }
        }
    }
}

fn condition_currencies(
    condition: &Condition<'_>,
    currency: &Currency,
    errors: &mut ValidationErrors,
) {
    match condition {
        Condition::BasketTotalAtLeast(min_total) => check_currency(min_total, currency, errors),
        Condition::Group { conditions, .. } => {
            for condition in conditions {
                condition_currencies(condition, currency, errors);
            }
        }
        Condition::ProductQuantityAtLeast { .. } | Condition::CategoryQuantityAtLeast { .. } => {}
    }
}

fn check_currency(amount: &Money<'_, Currency>, currency: &Currency, errors: &mut ValidationErrors) {
    if amount.currency() != currency {
        errors.push(ValidationError::CurrencyMismatch {
            expected: currency.iso_alpha_code,
            found: amount.currency().iso_alpha_code,
        });
    }
}
