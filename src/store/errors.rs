//! Store policy errors.

use thiserror::Error;

use crate::{
    basket::BasketError, discounts::DiscountError, external::ExternalError,
    policies::ValidationErrors,
};

/// Store policy error variants.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    /// The policy is malformed.
    #[error("invalid policy: {0}")]
    Invalid(#[from] ValidationErrors),

    /// An identical policy already exists.
    #[error("policy already exists: {description}")]
    DuplicatePolicy {
        /// Canonical description of the rejected policy
        description: String,
    },

    /// No policy with this description exists.
    #[error("policy not found: {description}")]
    NotFound {
        /// Description that was searched for
        description: String,
    },

    /// The default purchase rule cannot be removed.
    #[error("the default purchase rule cannot be removed")]
    DefaultNotRemovable,

    /// The basket is priced in a different currency to the store.
    #[error("basket is in {found}, but store prices in {expected}")]
    CurrencyMismatch {
        /// Store currency code
        expected: &'static str,

        /// Basket currency code
        found: &'static str,
    },

    /// The basket failed one or more purchase rules.
    #[error("purchase rejected: {}", violations.join("; "))]
    Rejected {
        /// Descriptions of every failed rule
        violations: Vec<String>,
    },

    /// Discount arithmetic failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The basket could not be built.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// A remote collaborator failed.
    #[error(transparent)]
    External(#[from] ExternalError),
}
