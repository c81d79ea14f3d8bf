//! Discount Scopes

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    basket::{BasketLine, category_matches},
    policies::validation::ValidationError,
    products::ProductId,
};

/// The kind of target a discount applies to, without the target itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScopeKind {
    /// Every line in the basket
    Store,

    /// Lines for a single product
    Product,

    /// Lines in a single category
    Category,
}

impl ScopeKind {
    /// Wire name of the scope kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeKind::Store => "STORE",
            ScopeKind::Product => "PRODUCT",
            ScopeKind::Category => "CATEGORY",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STORE" => Ok(ScopeKind::Store),
            "PRODUCT" => Ok(ScopeKind::Product),
            "CATEGORY" => Ok(ScopeKind::Category),
            _ => Err(ValidationError::UnknownPolicyType {
                kind: "scope",
                name: s.to_string(),
            }),
        }
    }
}

/// Which basket lines a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Store-wide
    Store,

    /// A single product
    Product(ProductId),

    /// A single category, matched case-insensitively
    Category(String),
}

impl Scope {
    /// Build a scope from its kind and an optional target identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingScopeTarget`] when a product or category scope has no
    /// target, or the target is blank.
    pub fn from_parts(kind: ScopeKind, target: Option<&str>) -> Result<Self, ValidationError> {
        let target = target.map(str::trim).filter(|target| !target.is_empty());

        match (kind, target) {
            (ScopeKind::Store, _) => Ok(Scope::Store),
            (ScopeKind::Product, Some(id)) => Ok(Scope::Product(ProductId::from(id))),
            (ScopeKind::Category, Some(name)) => Ok(Scope::Category(name.to_string())),
            (ScopeKind::Product | ScopeKind::Category, None) => {
                Err(ValidationError::MissingScopeTarget { scope: kind })
            }
        }
    }

    /// The kind of this scope.
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::Store => ScopeKind::Store,
            Scope::Product(_) => ScopeKind::Product,
            Scope::Category(_) => ScopeKind::Category,
        }
    }

    /// The product id or category name, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Scope::Store => None,
            Scope::Product(id) => Some(id.as_str()),
            Scope::Category(name) => Some(name),
        }
    }

    /// Whether `line` falls inside this scope.
    pub fn selects(&self, line: &BasketLine<'_>) -> bool {
        match self {
            Scope::Store => true,
            Scope::Product(id) => line.product() == id,
            Scope::Category(name) => category_matches(line.category(), name),
        }
    }
}
