//! AuthorHub Authz: access decisions and audit views over group grants.
//!
//! The [`PermissionEvaluator`] answers a single yes/no question; the
//! [`PermissionAggregator`] lists every grant reaching a user together
//! with the group it came from. Both are generic over
//! [`AccessRepository`](authorhub_core::repository::AccessRepository)
//! so this crate has no dependency on the database crate.

pub mod aggregator;
pub mod evaluator;

pub use aggregator::PermissionAggregator;
pub use evaluator::PermissionEvaluator;
