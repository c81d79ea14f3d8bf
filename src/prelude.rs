//! Storefront Policy prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Basket, BasketError, BasketLine},
    discounts::{DiscountError, SimpleDiscount},
    external::ExternalError,
    fixtures::{Fixture, FixtureError},
    policies::{
        AppliedDiscount, Combination, Condition, ConditionOp, Describe, DiscountKind,
        DiscountNode, PurchaseCheck, PurchaseRule, PurchaseRuleKind, Quote, Scope, ScopeKind,
        ValidationError, ValidationErrors, check, compute_discount, quote, validate,
        validate_for_currency,
    },
    pricing::{TotalPriceError, format_money},
    products::{ProductCatalog, ProductId, ProductInfo, StoreId},
    requests::{
        AddDiscountRequest, AddPurchaseRuleRequest, BasketLineRequest, BasketSnapshot,
        DiscountAmountResponse, DiscountConditionRequest, PurchaseCheckResponse,
    },
    store::{InMemoryPolicyRepository, PolicyError, PolicyRepository, PolicyService, StorePolicies},
};
