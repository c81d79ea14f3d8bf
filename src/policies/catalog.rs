//! Policy Type Catalogs
//!
//! Static lists of the policy building blocks a store owner can pick from.

use serde::Serialize;

/// A selectable policy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyTypeInfo {
    /// Wire name
    pub value: &'static str,

    /// Short display name
    pub label: &'static str,

    /// One-line explanation
    pub description: &'static str,
}

const fn info(
    value: &'static str,
    label: &'static str,
    description: &'static str,
) -> PolicyTypeInfo {
    PolicyTypeInfo {
        value,
        label,
        description,
    }
}

const DISCOUNT_TYPES: &[PolicyTypeInfo] = &[
    info("PERCENTAGE", "Percentage Discount", "Discount by percentage"),
    info("FIXED", "Fixed Amount", "Fixed amount off"),
    info("CONDITIONAL", "Conditional Discount", "Discount with conditions"),
    info("COMPOSITE", "Combined Discount", "Combine two or more discounts"),
];

const TARGET_TYPES: &[PolicyTypeInfo] = &[
    info("STORE", "Store-wide", "Apply to entire store"),
    info("PRODUCT", "Specific Product", "Apply to specific product"),
    info("CATEGORY", "Product Category", "Apply to product category"),
];

const COMBINATION_TYPES: &[PolicyTypeInfo] = &[
    info("SUM", "Sum All Discounts", "Add all discounts together"),
    info("MAXIMUM", "Maximum Discount", "Apply the largest discount only"),
];

const CONDITION_TYPES: &[PolicyTypeInfo] = &[
    info(
        "BASKET_TOTAL_AT_LEAST",
        "Minimum Basket Total",
        "Basket total must be at least X",
    ),
    info(
        "PRODUCT_QUANTITY_AT_LEAST",
        "Minimum Product Quantity",
        "Must have at least X of specific product",
    ),
    info(
        "CATEGORY_QUANTITY_AT_LEAST",
        "Category Contains Items",
        "Must have at least X items from specific category",
    ),
    info(
        "COMPOSITE",
        "Combined Condition",
        "Combine conditions with AND, OR or XOR",
    ),
];

const PURCHASE_RULE_TYPES: &[PolicyTypeInfo] = &[
    info("MINITEMS", "Minimum Items", "Basket must hold at least N items"),
    info("MAXITEMS", "Maximum Items", "Basket may hold at most N items"),
    info("MINPRICE", "Minimum Price", "Basket total must be at least X"),
    info("DEFAULT", "No Restriction", "Every basket may be purchased"),
];

/// Discount types a policy can be built from.
pub fn discount_types() -> &'static [PolicyTypeInfo] {
    DISCOUNT_TYPES
}

/// Scopes a basic discount can target.
pub fn target_types() -> &'static [PolicyTypeInfo] {
    TARGET_TYPES
}

/// Ways a composite discount can merge its children.
pub fn combination_types() -> &'static [PolicyTypeInfo] {
    COMBINATION_TYPES
}

/// Conditions a conditional discount can be gated on.
pub fn condition_types() -> &'static [PolicyTypeInfo] {
    CONDITION_TYPES
}

/// Purchase rule types.
pub fn purchase_rule_types() -> &'static [PolicyTypeInfo] {
    PURCHASE_RULE_TYPES
}
