//! SQLite row source for member search
//!
//! Runs composed predicates against `members LEFT JOIN teams` and projects
//! each row into a [`MemberTeamDto`].

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::entity::{MemberTeamDto, SortOrder};
use super::repository_trait::{MemberRowSource, Window};
use super::specification::Predicate;
use crate::error::{Error, Result};

/// Projection of the member/team left join
const SELECT_MEMBER_TEAM: &str = r#"
    SELECT m.id AS member_id, m.username, m.age, t.id AS team_id, t.name AS team_name
    FROM members m
    LEFT JOIN teams t ON m.team_id = t.id"#;

/// Count over the same join, so team-name filters resolve identically
const COUNT_MEMBER_TEAM: &str = r#"
    SELECT COUNT(m.id)
    FROM members m
    LEFT JOIN teams t ON m.team_id = t.id"#;

/// Row source backed by an SQLite connection pool
#[derive(Debug, Clone)]
pub struct SqliteMemberRowSource {
    pool: SqlitePool,
}

impl SqliteMemberRowSource {
    /// Create a new row source with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn select_query<'a>(
        predicate: &Predicate,
        sort: Option<&SortOrder>,
        window: Option<Window>,
    ) -> QueryBuilder<'a, Sqlite> {
        let mut builder = QueryBuilder::new(SELECT_MEMBER_TEAM);
        predicate.push_where(&mut builder);

        if let Some(sort) = sort {
            builder.push(" ORDER BY ");
            builder.push(sort.order_by_sql());
        }

        if let Some(window) = window {
            builder.push(" LIMIT ");
            builder.push_bind(to_sql_int(window.limit));
            builder.push(" OFFSET ");
            builder.push_bind(to_sql_int(window.offset));
        }

        builder
    }
}

#[async_trait]
impl MemberRowSource for SqliteMemberRowSource {
    async fn fetch(
        &self,
        predicate: &Predicate,
        sort: Option<&SortOrder>,
        window: Option<Window>,
    ) -> Result<Vec<MemberTeamDto>> {
        let mut builder = Self::select_query(predicate, sort, window);

        let rows: Vec<MemberTeamRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        debug!(
            clauses = predicate.len(),
            sorted = sort.is_some(),
            windowed = window.is_some(),
            rows = rows.len(),
            "Member search slice fetched"
        );

        Ok(rows.into_iter().map(MemberTeamRow::into_dto).collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new(COUNT_MEMBER_TEAM);
        predicate.push_where(&mut builder);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(Error::DatabaseError)?;

        debug!(clauses = predicate.len(), total = count, "Member search count query ran");

        Ok(count.max(0) as u64)
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ========== Database Row Types ==========

#[derive(sqlx::FromRow)]
struct MemberTeamRow {
    member_id: i64,
    username: String,
    age: i32,
    team_id: Option<i64>,
    team_name: Option<String>,
}

impl MemberTeamRow {
    fn into_dto(self) -> MemberTeamDto {
        MemberTeamDto {
            member_id: self.member_id,
            username: self.username,
            age: self.age,
            team_id: self.team_id,
            team_name: self.team_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::{MemberRepository, NewMember, TeamRepository};
    use crate::domain::search::entity::{MemberSearchCondition, SortKey};
    use crate::domain::search::specification::compose;
    use crate::storage::Database;

    async fn create_test_db() -> SqlitePool {
        let db = Database::in_memory()
            .await
            .expect("Failed to create test database");
        db.pool().clone()
    }

    /// member1/10/teamA, member2/20/teamA, member3/30/teamB, member4/40/teamB, loner/50/-
    async fn seed(pool: &SqlitePool) {
        let teams = TeamRepository::new(pool.clone());
        let members = MemberRepository::new(pool.clone());

        let team_a = teams.save("teamA").await.unwrap();
        let team_b = teams.save("teamB").await.unwrap();

        for (name, age, team) in [
            ("member1", 10, team_a.id),
            ("member2", 20, team_a.id),
            ("member3", 30, team_b.id),
            ("member4", 40, team_b.id),
        ] {
            members
                .save(&NewMember::new(name).with_age(age).in_team(team))
                .await
                .unwrap();
        }
        members
            .save(&NewMember::new("loner").with_age(50))
            .await
            .unwrap();
    }

    #[test]
    fn test_select_query_sql() {
        let predicate = compose(&MemberSearchCondition::new().with_age_goe(18));
        let sort = SortOrder::asc(SortKey::Username);
        let builder = SqliteMemberRowSource::select_query(
            &predicate,
            Some(&sort),
            Some(Window { offset: 2, limit: 5 }),
        );
        let sql = builder.sql();

        assert!(sql.contains("LEFT JOIN teams t ON m.team_id = t.id WHERE m.age >= ?"));
        assert!(sql.ends_with("ORDER BY m.username ASC, m.id ASC LIMIT ? OFFSET ?"));
    }

    #[tokio::test]
    async fn test_left_join_keeps_teamless_members() {
        let pool = create_test_db().await;
        seed(&pool).await;
        let source = SqliteMemberRowSource::new(pool);

        let rows = source.fetch(&Predicate::match_all(), None, None).await.unwrap();
        assert_eq!(rows.len(), 5);

        let loner = rows.iter().find(|r| r.username == "loner").unwrap();
        assert_eq!(loner.age, 50);
        assert!(loner.team_id.is_none());
        assert!(loner.team_name.is_none());

        let member1 = rows.iter().find(|r| r.username == "member1").unwrap();
        assert_eq!(member1.team_name.as_deref(), Some("teamA"));
        assert!(member1.team_id.is_some());
    }

    #[tokio::test]
    async fn test_team_name_filter_excludes_teamless() {
        let pool = create_test_db().await;
        seed(&pool).await;
        let source = SqliteMemberRowSource::new(pool);

        let predicate = compose(&MemberSearchCondition::new().with_team_name("teamA"));
        let rows = source.fetch(&predicate, None, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.team_name.as_deref() == Some("teamA")));
        assert_eq!(source.count(&predicate).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_nulls_sort_last_in_both_directions() {
        let pool = create_test_db().await;
        seed(&pool).await;
        let source = SqliteMemberRowSource::new(pool);

        for sort in [SortOrder::asc(SortKey::TeamName), SortOrder::desc(SortKey::TeamName)] {
            let rows = source
                .fetch(&Predicate::match_all(), Some(&sort), None)
                .await
                .unwrap();
            assert_eq!(rows.last().unwrap().username, "loner");
        }

        let rows = source
            .fetch(
                &Predicate::match_all(),
                Some(&SortOrder::desc(SortKey::TeamName)),
                None,
            )
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        // ties on team name fall back to member id ascending
        assert_eq!(names, vec!["member3", "member4", "member1", "member2", "loner"]);
    }

    #[tokio::test]
    async fn test_window_slices_sorted_rows() {
        let pool = create_test_db().await;
        seed(&pool).await;
        let source = SqliteMemberRowSource::new(pool);

        let rows = source
            .fetch(
                &Predicate::match_all(),
                Some(&SortOrder::desc(SortKey::Age)),
                Some(Window { offset: 1, limit: 2 }),
            )
            .await
            .unwrap();
        let ages: Vec<i32> = rows.iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![40, 30]);
        assert_eq!(source.count(&Predicate::match_all()).await.unwrap(), 5);
    }
}
