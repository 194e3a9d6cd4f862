//! Member search service
//!
//! Entry point for callers: composes the condition into a predicate and runs
//! it through the row source, either whole or one page at a time.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;

use super::entity::{MemberSearchCondition, MemberTeamDto, SortOrder};
use super::pagination::{CountPolicy, Page, PageRequest, fetch_page};
use super::repository::SqliteMemberRowSource;
use super::repository_trait::MemberRowSource;
use super::specification::{Predicate, compose};

/// Service for dynamic member searches
///
/// Holds no mutable state; clones share the underlying row source.
#[derive(Debug, Clone)]
pub struct MemberSearchService<S = SqliteMemberRowSource> {
    source: S,
}

impl MemberSearchService<SqliteMemberRowSource> {
    /// Create a search service over an SQLite pool
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_source(SqliteMemberRowSource::new(pool))
    }
}

impl<S: MemberRowSource> MemberSearchService<S> {
    /// Create a search service over any row source
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Get a reference to the row source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every row matching the condition, in no particular order
    pub async fn search(&self, condition: &MemberSearchCondition) -> Result<Vec<MemberTeamDto>> {
        let predicate = self.predicate_for(condition);
        self.source.fetch(&predicate, None, None).await
    }

    /// Every row matching the condition, in the requested order
    pub async fn search_sorted(
        &self,
        condition: &MemberSearchCondition,
        sort: SortOrder,
    ) -> Result<Vec<MemberTeamDto>> {
        let predicate = self.predicate_for(condition);
        self.source.fetch(&predicate, Some(&sort), None).await
    }

    /// One page of matching rows
    ///
    /// The count query is skipped when a first page comes back short.
    pub async fn search_page(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> Result<Page<MemberTeamDto>> {
        self.search_page_with(condition, request, CountPolicy::InferWhenPossible)
            .await
    }

    /// One page of matching rows, always backed by a count query
    pub async fn search_page_with_forced_count(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
    ) -> Result<Page<MemberTeamDto>> {
        self.search_page_with(condition, request, CountPolicy::Always)
            .await
    }

    /// One page of matching rows using the given count policy
    pub async fn search_page_with(
        &self,
        condition: &MemberSearchCondition,
        request: &PageRequest,
        policy: CountPolicy,
    ) -> Result<Page<MemberTeamDto>> {
        let predicate = self.predicate_for(condition);
        fetch_page(&self.source, &predicate, request, policy).await
    }

    fn predicate_for(&self, condition: &MemberSearchCondition) -> Predicate {
        let predicate = compose(condition);
        debug!(clauses = predicate.len(), "Member search predicate composed");
        predicate
    }
}
