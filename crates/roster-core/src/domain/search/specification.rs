//! Search predicate composition
//!
//! [`compose`] turns a [`MemberSearchCondition`] into a [`Predicate`]: the
//! conjunction of only those filters that are present. Absent filters are
//! left out of the composite entirely, so an empty condition renders no
//! `WHERE` clause at all and matches every row.

use sqlx::{QueryBuilder, Sqlite};

use crate::domain::specification::Specification;

use super::entity::{MemberSearchCondition, MemberTeamDto};

/// A single active filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `m.username = ?`
    UsernameEq(String),
    /// `t.name = ?` on the left-joined team
    TeamNameEq(String),
    /// `m.age >= ?`
    AgeGoe(i32),
    /// `m.age <= ?`
    AgeLoe(i32),
}

impl Clause {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Self::UsernameEq(username) => {
                builder.push("m.username = ");
                builder.push_bind(username.clone());
            }
            Self::TeamNameEq(team_name) => {
                builder.push("t.name = ");
                builder.push_bind(team_name.clone());
            }
            Self::AgeGoe(age) => {
                builder.push("m.age >= ");
                builder.push_bind(*age);
            }
            Self::AgeLoe(age) => {
                builder.push("m.age <= ");
                builder.push_bind(*age);
            }
        }
    }
}

impl Specification<MemberTeamDto> for Clause {
    fn is_satisfied_by(&self, row: &MemberTeamDto) -> bool {
        match self {
            Self::UsernameEq(username) => row.username == *username,
            // a teamless row has no name to compare, same as NULL = ? in SQL
            Self::TeamNameEq(team_name) => row.team_name.as_deref() == Some(team_name.as_str()),
            Self::AgeGoe(age) => row.age >= *age,
            Self::AgeLoe(age) => row.age <= *age,
        }
    }
}

/// Conjunction of the active clauses of a search condition
///
/// Clause order is always username, team name, minimum age, maximum age.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The predicate that matches every row
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True when no filter is active
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Append ` WHERE a AND b ...` to the query, or nothing when empty
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            clause.push_sql(builder);
        }
    }
}

impl Specification<MemberTeamDto> for Predicate {
    fn is_satisfied_by(&self, row: &MemberTeamDto) -> bool {
        self.clauses.iter().all(|clause| clause.is_satisfied_by(row))
    }
}

/// Build the composite predicate for a condition
pub fn compose(condition: &MemberSearchCondition) -> Predicate {
    let candidates = [
        username_eq(condition.username.as_deref()),
        team_name_eq(condition.team_name.as_deref()),
        age_goe(condition.age_goe),
        age_loe(condition.age_loe),
    ];

    Predicate {
        clauses: candidates.into_iter().flatten().collect(),
    }
}

/// The filter value, unless it is missing, empty or whitespace-only
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn username_eq(username: Option<&str>) -> Option<Clause> {
    non_blank(username).map(|v| Clause::UsernameEq(v.to_string()))
}

fn team_name_eq(team_name: Option<&str>) -> Option<Clause> {
    non_blank(team_name).map(|v| Clause::TeamNameEq(v.to_string()))
}

fn age_goe(age: Option<i32>) -> Option<Clause> {
    age.map(Clause::AgeGoe)
}

fn age_loe(age: Option<i32>) -> Option<Clause> {
    age.map(Clause::AgeLoe)
}
