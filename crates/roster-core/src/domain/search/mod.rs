//! Search domain module
//!
//! Dynamic member search with optional filters and offset/limit pagination.
//!
//! # Architecture
//!
//! - **Entities**: `MemberSearchCondition`, `MemberTeamDto`, `SortOrder`
//! - **Specification**: `compose` folds a condition into a `Predicate`
//! - **Row source**: `MemberRowSource` trait, `SqliteMemberRowSource` for SQLite
//! - **Pagination**: `PageRequest`, `Page`, `CountPolicy`, `fetch_page`
//! - **Service**: `MemberSearchService` for callers
//!
//! # Example
//!
//! ```ignore
//! use roster_core::domain::search::{MemberSearchCondition, MemberSearchService, PageRequest};
//!
//! let service = MemberSearchService::new(pool.clone());
//!
//! let condition = MemberSearchCondition::new()
//!     .with_team_name("teamB")
//!     .with_age_between(35, 40);
//! let rows = service.search(&condition).await?;
//!
//! let page = service
//!     .search_page(&MemberSearchCondition::new(), &PageRequest::new(0, 20)?)
//!     .await?;
//! ```

pub mod entity;
pub mod pagination;
pub mod repository;
pub mod repository_trait;
pub mod service;
pub mod specification;

// Re-export main types
pub use entity::{MemberSearchCondition, MemberTeamDto, SortDirection, SortKey, SortOrder};
pub use pagination::{CountPolicy, Page, PageRequest, fetch_page, inferred_total};
pub use repository::SqliteMemberRowSource;
pub use repository_trait::{MemberRowSource, Window};
pub use service::MemberSearchService;
pub use specification::{Clause, Predicate, compose};
