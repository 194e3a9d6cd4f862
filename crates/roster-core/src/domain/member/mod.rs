//! Member domain module
//!
//! Members, teams, and their repositories.
//!
//! # Architecture
//!
//! - **Entities**: `Member`, `NewMember`, `Team`, `TeamWithMembers`
//! - **Repositories**: `MemberRepository`, `TeamRepository` for database operations
//!
//! A member's `team_id` is the authoritative relationship; a team's member
//! list is always rebuilt from member rows.

pub mod entity;
pub mod repository;

pub use entity::{Member, NewMember, Team, TeamWithMembers};
pub use repository::{MemberRepository, TeamRepository};
