//! Search entities
//!
//! The filter condition callers build, the flat row a search returns, and
//! the sort order a caller may request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional filters for a member search
///
/// Every field is independent. `None` means "do not filter on this
/// dimension"; string filters that are empty or whitespace-only are treated
/// the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSearchCondition {
    /// Exact, case-sensitive username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Exact, case-sensitive name of the member's team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Minimum age, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_goe: Option<i32>,
    /// Maximum age, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_loe: Option<i32>,
}

impl MemberSearchCondition {
    /// A condition with no filters; matches every member
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.team_name = Some(team_name.into());
        self
    }

    pub fn with_age_goe(mut self, age: i32) -> Self {
        self.age_goe = Some(age);
        self
    }

    pub fn with_age_loe(mut self, age: i32) -> Self {
        self.age_loe = Some(age);
        self
    }

    /// Restrict age to the inclusive range `min..=max`
    pub fn with_age_between(self, min: i32, max: i32) -> Self {
        self.with_age_goe(min).with_age_loe(max)
    }
}

/// Flat projection of a member joined with its optional team
///
/// Team fields are `None` for members without a team.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberTeamDto {
    pub member_id: i64,
    pub username: String,
    pub age: i32,
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
}

/// Column a search can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Username,
    Age,
    TeamName,
    MemberId,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Age => "age",
            Self::TeamName => "team_name",
            Self::MemberId => "member_id",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "username" => Some(Self::Username),
            "age" => Some(Self::Age),
            "team_name" | "team" => Some(Self::TeamName),
            "member_id" | "id" => Some(Self::MemberId),
            _ => None,
        }
    }

    /// Qualified column in the member/team join
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::Username => "m.username",
            Self::Age => "m.age",
            Self::TeamName => "t.name",
            Self::MemberId => "m.id",
        }
    }

    /// Whether the column can be NULL in the join (teamless members)
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::TeamName)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Explicit ordering requested by a caller
///
/// NULL keys sort last in either direction and ties are broken by member id
/// ascending, so repeated page fetches see the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Ordering used for pages when the caller does not ask for one
    pub fn by_member_id() -> Self {
        Self::asc(SortKey::MemberId)
    }

    /// Render the `ORDER BY` body for this sort
    pub(crate) fn order_by_sql(&self) -> String {
        let column = self.key.column();
        let direction = self.direction.keyword();

        if self.key == SortKey::MemberId {
            return format!("{column} {direction}");
        }

        if self.key.is_nullable() {
            format!("{column} IS NULL, {column} {direction}, m.id ASC")
        } else {
            format!("{column} {direction}, m.id ASC")
        }
    }
}
