//! Member and team entities
//!
//! A member points at zero or one team through `team_id`; that column is the
//! only stored side of the relationship. The team's member list is derived
//! from member rows whenever it is read (see [`TeamWithMembers`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team members can belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Surrogate identifier
    pub id: i64,
    /// Display name (not unique)
    pub name: String,
    /// When the team was created
    pub created_at: DateTime<Utc>,
}

/// A team together with the ids of the members currently pointing at it
///
/// Built from member rows on read, so it cannot disagree with
/// [`Member::team_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWithMembers {
    pub team: Team,
    pub member_ids: Vec<i64>,
}

impl TeamWithMembers {
    /// Whether the given member belongs to this team
    pub fn contains(&self, member_id: i64) -> bool {
        self.member_ids.contains(&member_id)
    }

    /// Number of members in the team
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    /// Whether the team has no members
    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }
}

/// A stored member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Surrogate identifier
    pub id: i64,
    /// Display name (not unique)
    pub username: String,
    pub age: i32,
    /// The team this member belongs to, if any
    pub team_id: Option<i64>,
    /// When the member was created
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Whether this member belongs to the given team
    pub fn belongs_to(&self, team_id: i64) -> bool {
        self.team_id == Some(team_id)
    }
}

/// A member that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMember {
    pub username: String,
    pub age: i32,
    pub team_id: Option<i64>,
}

impl NewMember {
    /// Create a teamless member with age 0
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            age: 0,
            team_id: None,
        }
    }

    /// Set the age
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = age;
        self
    }

    /// Place the member in a team
    pub fn in_team(mut self, team_id: i64) -> Self {
        self.team_id = Some(team_id);
        self
    }
}
