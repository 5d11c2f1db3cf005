//! Domain models for AuthorHub.
//!
//! These are the core types shared across all crates.

pub mod access;
pub mod group;
pub mod membership;
pub mod permission;
pub mod resource;
pub mod user;
