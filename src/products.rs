//! Products

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::external::ExternalError;

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a key from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the key as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_key! {
    /// Product Key
    ProductId
}

string_key! {
    /// Store Key
    StoreId
}

/// Catalog attributes of a product relevant to pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// Product category
    pub category: String,

    /// Store selling the product
    pub store: StoreId,
}

/// Resolves product identifiers to their catalog attributes.
#[automock]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a single product.
    async fn resolve(&self, product: &ProductId) -> Result<ProductInfo, ExternalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_display_their_inner_value() {
        assert_eq!(ProductId::from("P1").to_string(), "P1");
        assert_eq!(StoreId::new(String::from("S1")).as_str(), "S1");
    }

    #[test]
    fn keys_serialize_transparently() -> Result<(), serde_json::Error> {
        let json = serde_json::to_string(&ProductId::from("P1"))?;

        assert_eq!(json, "\"P1\"");
        assert_eq!(serde_json::from_str::<StoreId>("\"S9\"")?, StoreId::from("S9"));

        Ok(())
    }
}
