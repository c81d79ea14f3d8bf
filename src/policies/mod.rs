//! Store Policies
//!
//! The policy model a store attaches to its catalog: discount trees that reduce the price of a
//! basket, and purchase rules that decide whether the basket may be bought at all.

pub mod catalog;
pub mod conditions;
pub mod describe;
pub mod evaluation;
pub mod node;
pub mod purchase;
pub mod scope;
pub mod validation;

pub use conditions::{Condition, ConditionOp};
pub use describe::Describe;
pub use evaluation::{AppliedDiscount, Quote, compute_discount, quote};
pub use node::{Combination, DiscountKind, DiscountNode};
pub use purchase::{PurchaseCheck, PurchaseRule, PurchaseRuleKind, check};
pub use scope::{Scope, ScopeKind};
pub use validation::{ValidationError, ValidationErrors, validate, validate_for_currency};
