//! Roster Core Library
//!
//! This crate provides the core functionality for Roster, including:
//! - Storage (SQLite pool and versioned migrations)
//! - Members and teams with their repositories
//! - Dynamic member search with optional filters
//! - Offset/limit pagination with count short-circuiting
//! - File-backed configuration

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::member::{Member, MemberRepository, NewMember, Team, TeamRepository};
    pub use crate::domain::search::{
        CountPolicy, MemberSearchCondition, MemberSearchService, MemberTeamDto, Page,
        PageRequest, SortDirection, SortKey, SortOrder,
    };
    pub use crate::error::{Error, Result};
    pub use crate::storage::Database;
}
