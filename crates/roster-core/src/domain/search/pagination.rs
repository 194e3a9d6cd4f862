//! Offset/limit pagination over a member row source
//!
//! Every page runs the slice query. Whether a separate count query also runs
//! is decided by [`CountPolicy`]: a first page that comes back short already
//! holds every matching row, so its length is the total.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::entity::{MemberTeamDto, SortOrder};
use super::repository_trait::{MemberRowSource, Window};
use super::specification::Predicate;

/// A validated offset/limit request with an optional explicit sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    offset: u64,
    limit: u64,
    sort: Option<SortOrder>,
}

impl PageRequest {
    /// Validate and build a request
    ///
    /// Fails with [`Error::InvalidArgument`] for a negative offset or a
    /// limit below 1. Values are never clamped.
    pub fn new(offset: i64, limit: i64) -> Result<Self> {
        if offset < 0 {
            return Err(Error::InvalidArgument(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        if limit <= 0 {
            return Err(Error::InvalidArgument(format!(
                "limit must be positive, got {limit}"
            )));
        }

        Ok(Self {
            offset: offset as u64,
            limit: limit as u64,
            sort: None,
        })
    }

    /// Request the zero-based page `page` of `size` rows
    pub fn of_page(page: i64, size: i64) -> Result<Self> {
        if page < 0 {
            return Err(Error::InvalidArgument(format!(
                "page must not be negative, got {page}"
            )));
        }
        let offset = page.checked_mul(size.max(0)).ok_or_else(|| {
            Error::InvalidArgument(format!("page {page} of size {size} is out of range"))
        })?;
        Self::new(offset, size)
    }

    /// Attach an explicit ordering
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn sort(&self) -> Option<&SortOrder> {
        self.sort.as_ref()
    }

    pub fn window(&self) -> Window {
        Window {
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// One slice of a result set plus the total across all slices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the predicate across every slice
    pub total: u64,
    /// Offset the page was requested with
    pub offset: u64,
    /// Limit the page was requested with
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total,
            offset: request.offset(),
            limit: request.limit(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Zero-based page number when offsets are multiples of the limit
    pub fn page_number(&self) -> u64 {
        self.offset / self.limit.max(1)
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.limit.max(1))
    }

    /// Whether rows exist past this slice
    pub fn has_next(&self) -> bool {
        self.offset + (self.items.len() as u64) < self.total
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

/// How the total of a page is obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountPolicy {
    /// Skip the count query when a first page comes back short
    #[default]
    #[serde(rename = "infer")]
    InferWhenPossible,
    /// Always run the count query
    #[serde(rename = "always")]
    Always,
}

impl CountPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InferWhenPossible => "infer",
            Self::Always => "always",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "infer" => Some(Self::InferWhenPossible),
            "always" => Some(Self::Always),
            _ => None,
        }
    }
}

/// The total implied by a slice alone, if the slice proves it
///
/// Only a first page with fewer rows than requested qualifies.
pub fn inferred_total(request: &PageRequest, fetched: usize) -> Option<u64> {
    let fetched = fetched as u64;
    (request.offset() == 0 && fetched < request.limit()).then_some(fetched)
}

/// Fetch one page of projected rows
///
/// Pages without an explicit sort are ordered by member id.
pub async fn fetch_page<S>(
    source: &S,
    predicate: &Predicate,
    request: &PageRequest,
    policy: CountPolicy,
) -> Result<Page<MemberTeamDto>>
where
    S: MemberRowSource + ?Sized,
{
    let sort = request.sort().copied().unwrap_or_else(SortOrder::by_member_id);
    let window = request.window();

    let (items, total, counted) = match policy {
        CountPolicy::Always => {
            let (items, total) = tokio::try_join!(
                source.fetch(predicate, Some(&sort), Some(window)),
                source.count(predicate),
            )?;
            (items, total, true)
        }
        CountPolicy::InferWhenPossible => {
            let items = source.fetch(predicate, Some(&sort), Some(window)).await?;
            match inferred_total(request, items.len()) {
                Some(total) => (items, total, false),
                None => {
                    let total = source.count(predicate).await?;
                    (items, total, true)
                }
            }
        }
    };

    debug!(
        offset = request.offset(),
        limit = request.limit(),
        rows = items.len(),
        total = total,
        count_query = counted,
        "Member search page assembled"
    );

    Ok(Page::new(items, total, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::entity::MemberSearchCondition;
    use crate::domain::search::specification::compose;
    use crate::domain::specification::Specification;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that records how many queries of each kind ran
    struct RecordingSource {
        rows: Vec<MemberTeamDto>,
        fetches: AtomicUsize,
        counts: AtomicUsize,
    }

    impl RecordingSource {
        fn with_members(n: i64) -> Self {
            let rows = (1..=n)
                .map(|i| MemberTeamDto {
                    member_id: i,
                    username: format!("member{i}"),
                    age: (i * 10) as i32,
                    team_id: None,
                    team_name: None,
                })
                .collect();
            Self {
                rows,
                fetches: AtomicUsize::new(0),
                counts: AtomicUsize::new(0),
            }
        }

        fn counts(&self) -> usize {
            self.counts.load(Ordering::SeqCst)
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MemberRowSource for RecordingSource {
        async fn fetch(
            &self,
            predicate: &Predicate,
            _sort: Option<&SortOrder>,
            window: Option<Window>,
        ) -> Result<Vec<MemberTeamDto>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let matched = predicate.select(self.rows.iter()).into_iter().cloned();
            Ok(match window {
                Some(w) => matched.skip(w.offset as usize).take(w.limit as usize).collect(),
                None => matched.collect(),
            })
        }

        async fn count(&self, predicate: &Predicate) -> Result<u64> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            Ok(predicate.select(self.rows.iter()).len() as u64)
        }
    }

    #[test]
    fn test_page_request_validation() {
        assert!(PageRequest::new(0, 1).is_ok());
        assert!(matches!(
            PageRequest::new(-1, 10),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(0, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            PageRequest::new(0, -3),
            Err(Error::InvalidArgument(_))
        ));

        let request = PageRequest::of_page(2, 10).unwrap();
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
        assert!(PageRequest::of_page(-1, 10).is_err());
        assert!(PageRequest::of_page(1, 0).is_err());
    }

    #[test]
    fn test_inferred_total() {
        let first = PageRequest::new(0, 5).unwrap();
        assert_eq!(inferred_total(&first, 3), Some(3));
        assert_eq!(inferred_total(&first, 0), Some(0));
        assert_eq!(inferred_total(&first, 5), None);

        let later = PageRequest::new(5, 5).unwrap();
        assert_eq!(inferred_total(&later, 2), None);
    }

    #[test]
    fn test_page_accessors() {
        let request = PageRequest::new(3, 3).unwrap();
        let page = Page::new(vec![4, 5, 6], 7, &request);
        assert_eq!(page.page_number(), 1);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert_eq!(page.len(), 3);

        let doubled = page.map(|n| n * 2);
        assert_eq!(doubled.items, vec![8, 10, 12]);
        assert_eq!(doubled.total, 7);
        assert_eq!(doubled.offset, 3);
    }

    #[test]
    fn test_count_policy_parse() {
        assert_eq!(CountPolicy::parse("infer"), Some(CountPolicy::InferWhenPossible));
        assert_eq!(CountPolicy::parse("always"), Some(CountPolicy::Always));
        assert_eq!(CountPolicy::parse("never"), None);
        assert_eq!(CountPolicy::default().as_str(), "infer");
    }

    #[tokio::test]
    async fn test_short_first_page_skips_count() {
        let source = RecordingSource::with_members(4);
        let request = PageRequest::new(0, 10).unwrap();

        let page = fetch_page(
            &source,
            &Predicate::match_all(),
            &request,
            CountPolicy::InferWhenPossible,
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 4);
        assert_eq!(page.total, 4);
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.counts(), 0);
    }

    #[tokio::test]
    async fn test_full_first_page_counts() {
        let source = RecordingSource::with_members(4);
        let request = PageRequest::new(0, 3).unwrap();

        let page = fetch_page(
            &source,
            &Predicate::match_all(),
            &request,
            CountPolicy::InferWhenPossible,
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 3);
        assert_eq!(page.total, 4);
        assert_eq!(source.counts(), 1);
    }

    #[tokio::test]
    async fn test_exactly_full_first_page_counts() {
        let source = RecordingSource::with_members(3);
        let request = PageRequest::new(0, 3).unwrap();

        let page = fetch_page(
            &source,
            &Predicate::match_all(),
            &request,
            CountPolicy::InferWhenPossible,
        )
        .await
        .unwrap();

        assert_eq!(page.total, 3);
        assert!(!page.has_next());
        assert_eq!(source.counts(), 1);
    }

    #[tokio::test]
    async fn test_later_page_always_counts() {
        let source = RecordingSource::with_members(4);
        let request = PageRequest::new(3, 3).unwrap();

        let page = fetch_page(
            &source,
            &Predicate::match_all(),
            &request,
            CountPolicy::InferWhenPossible,
        )
        .await
        .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.total, 4);
        assert_eq!(source.counts(), 1);
    }

    #[tokio::test]
    async fn test_page_past_the_end_reports_real_total() {
        let source = RecordingSource::with_members(4);
        let request = PageRequest::new(10, 5).unwrap();

        let page = fetch_page(
            &source,
            &Predicate::match_all(),
            &request,
            CountPolicy::InferWhenPossible,
        )
        .await
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total, 4);
        assert_eq!(page.offset, 10);
        assert_eq!(page.limit, 5);
    }

    #[tokio::test]
    async fn test_forced_count_runs_even_for_short_first_page() {
        let source = RecordingSource::with_members(2);
        let request = PageRequest::new(0, 10).unwrap();

        let page = fetch_page(&source, &Predicate::match_all(), &request, CountPolicy::Always)
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.counts(), 1);
    }

    #[tokio::test]
    async fn test_no_matches_gives_zero_total() {
        let source = RecordingSource::with_members(4);
        let predicate = compose(&MemberSearchCondition::new().with_age_between(40, 10));
        let request = PageRequest::new(0, 10).unwrap();

        let page = fetch_page(&source, &predicate, &request, CountPolicy::InferWhenPossible)
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages(), 0);
        assert_eq!(source.counts(), 0);
    }
}
