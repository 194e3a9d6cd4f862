//! Member and team repositories
//!
//! Handles all database interactions for the member and team tables.

use super::entity::{Member, NewMember, Team, TeamWithMembers};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Repository for team database operations
#[derive(Debug, Clone)]
pub struct TeamRepository {
    pool: SqlitePool,
}

impl TeamRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new team
    pub async fn save(&self, name: &str) -> Result<Team> {
        let created_at = Utc::now();

        let (id,): (i64,) =
            sqlx::query_as("INSERT INTO teams (name, created_at) VALUES (?, ?) RETURNING id")
                .bind(name)
                .bind(created_at)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        info!(team_id = id, team_name = %name, "Team saved");

        Ok(Team {
            id,
            name: name.to_string(),
            created_at,
        })
    }

    /// Find a team by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Team>> {
        let row: Option<TeamRow> =
            sqlx::query_as("SELECT id, name, created_at FROM teams WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(row.map(TeamRow::into_team))
    }

    /// Get a team by ID, failing when it does not exist
    pub async fn get(&self, id: i64) -> Result<Team> {
        self.find_by_id(id).await?.ok_or(Error::TeamNotFound(id))
    }

    /// Find all teams with the given name
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Team>> {
        let rows: Vec<TeamRow> =
            sqlx::query_as("SELECT id, name, created_at FROM teams WHERE name = ? ORDER BY id")
                .bind(name)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(TeamRow::into_team).collect())
    }

    /// List all teams
    pub async fn find_all(&self) -> Result<Vec<Team>> {
        let rows: Vec<TeamRow> = sqlx::query_as("SELECT id, name, created_at FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(TeamRow::into_team).collect())
    }

    /// Load a team together with its current members
    pub async fn find_with_members(&self, id: i64) -> Result<Option<TeamWithMembers>> {
        let Some(team) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let member_ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM members WHERE team_id = ? ORDER BY id")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::DatabaseError)?;

        Ok(Some(TeamWithMembers {
            team,
            member_ids: member_ids.into_iter().map(|(id,)| id).collect(),
        }))
    }

    /// Delete a team; its members stay and become teamless
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(team_id = id, "Team deleted");
        }
        Ok(deleted)
    }
}

/// Repository for member database operations
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new member
    ///
    /// Fails with [`Error::TeamNotFound`] when the member names a team that
    /// does not exist.
    pub async fn save(&self, member: &NewMember) -> Result<Member> {
        if let Some(team_id) = member.team_id {
            self.ensure_team_exists(team_id).await?;
        }

        let created_at = Utc::now();

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO members (username, age, team_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&member.username)
        .bind(member.age)
        .bind(member.team_id)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        info!(member_id = id, username = %member.username, team_id = ?member.team_id, "Member saved");

        Ok(Member {
            id,
            username: member.username.clone(),
            age: member.age,
            team_id: member.team_id,
            created_at,
        })
    }

    /// Find a member by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Member>> {
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT id, username, age, team_id, created_at FROM members WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(row.map(MemberRow::into_member))
    }

    /// Get a member by ID, failing when it does not exist
    pub async fn get(&self, id: i64) -> Result<Member> {
        self.find_by_id(id).await?.ok_or(Error::MemberNotFound(id))
    }

    /// List all members
    pub async fn find_all(&self) -> Result<Vec<Member>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT id, username, age, team_id, created_at FROM members ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }

    /// Find all members with exactly this username
    pub async fn find_by_username(&self, username: &str) -> Result<Vec<Member>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT id, username, age, team_id, created_at FROM members WHERE username = ? ORDER BY id",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::DatabaseError)?;

        Ok(rows.into_iter().map(MemberRow::into_member).collect())
    }

    /// Move a member to another team, or out of any team with `None`
    pub async fn change_team(&self, member_id: i64, team_id: Option<i64>) -> Result<Member> {
        if let Some(team_id) = team_id {
            self.ensure_team_exists(team_id).await?;
        }

        let result = sqlx::query("UPDATE members SET team_id = ? WHERE id = ?")
            .bind(team_id)
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(Error::MemberNotFound(member_id));
        }

        debug!(member_id = member_id, team_id = ?team_id, "Member team changed");
        self.get(member_id).await
    }

    /// Delete a member by ID
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(member_id = id, "Member deleted");
        }
        Ok(deleted)
    }

    /// Count all stored members
    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        Ok(count.max(0) as u64)
    }

    async fn ensure_team_exists(&self, team_id: i64) -> Result<()> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        match row {
            Some(_) => Ok(()),
            None => Err(Error::TeamNotFound(team_id)),
        }
    }
}

// ========== Database Row Types ==========

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl TeamRow {
    fn into_team(self) -> Team {
        Team {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    username: String,
    age: i32,
    team_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> Member {
        Member {
            id: self.id,
            username: self.username,
            age: self.age,
            team_id: self.team_id,
            created_at: self.created_at,
        }
    }
}
