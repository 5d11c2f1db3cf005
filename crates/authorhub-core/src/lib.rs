//! AuthorHub Core: domain models, the error taxonomy and the
//! repository traits shared by every other crate.

pub mod error;
pub mod models;
pub mod repository;
