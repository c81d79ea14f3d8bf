//! Storefront Policy
//!
//! Discount and purchase policies for marketplace stores: how a store owner composes discounts
//! from simple building blocks, gates them on basket conditions, restricts what a basket may
//! contain, and how all of it prices a shopper's basket at checkout.

pub mod basket;
pub mod discounts;
pub mod external;
pub mod fixtures;
pub mod policies;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod requests;
pub mod store;
