//! External Collaborator Errors

use thiserror::Error;

use crate::products::{ProductId, StoreId};

/// Failures reported by remote collaborators (catalog lookup, policy persistence).
///
/// These are never produced by policy evaluation itself; they are propagated unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExternalError {
    /// The bearer credential was missing, expired, or lacks permission for the store.
    #[error("not authorized")]
    Unauthorized,

    /// The remote call failed in transit.
    #[error("network error: {0}")]
    Network(String),

    /// The catalog does not know the product.
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    /// No policy collection exists for the store.
    #[error("unknown store {0}")]
    UnknownStore(StoreId),
}
