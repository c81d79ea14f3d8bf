//! Stores
//!
//! Per-store policy collections, their persistence boundary, and the service tying them to the
//! product catalog.

pub mod errors;
pub mod policies;
pub mod repository;
pub mod service;

pub use errors::PolicyError;
pub use policies::StorePolicies;
pub use repository::{InMemoryPolicyRepository, MockPolicyRepository, PolicyRepository};
pub use service::PolicyService;
