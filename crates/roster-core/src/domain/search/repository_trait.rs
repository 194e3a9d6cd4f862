//! Row source trait for member search
//!
//! This module defines the trait the search and pagination code runs
//! against. The trait abstracts over different storage backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::Result;

use super::entity::{MemberTeamDto, SortOrder};
use super::specification::Predicate;

/// A bounded slice of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// Executes composed predicates over the member/team left join
///
/// Implementations are read-only. Failures from the underlying store are
/// returned as they are.
#[async_trait]
pub trait MemberRowSource: Send + Sync {
    /// Fetch the projected rows matching `predicate`
    ///
    /// Without `sort` the order is unspecified. Without `window` every
    /// matching row is returned.
    async fn fetch(
        &self,
        predicate: &Predicate,
        sort: Option<&SortOrder>,
        window: Option<Window>,
    ) -> Result<Vec<MemberTeamDto>>;

    /// Count all rows matching `predicate`, ignoring any window
    async fn count(&self, predicate: &Predicate) -> Result<u64>;
}
