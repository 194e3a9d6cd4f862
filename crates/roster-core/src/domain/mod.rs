//! Domain layer
//!
//! - `member`: members, teams and their repositories
//! - `search`: dynamic member search and pagination
//! - `specification`: in-memory predicate objects

pub mod member;
pub mod search;
pub mod specification;

pub use specification::Specification;
