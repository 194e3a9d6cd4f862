//! Error types for Roster

use thiserror::Error;

/// Result type alias using Roster's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Roster error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Member {0} not found. Run `roster member list` to see all members.")]
    MemberNotFound(i64),

    #[error("Team {0} not found. Run `roster team list` to see all teams.")]
    TeamNotFound(i64),

    // Input errors (E100-E199)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MemberNotFound(_) => "E001",
            Self::TeamNotFound(_) => "E002",
            Self::InvalidArgument(_) => "E100",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MemberNotFound(_) => Some("roster member list".to_string()),
            Self::TeamNotFound(_) => Some("roster team list".to_string()),
            Self::InvalidArgument(_) => {
                Some("Use an offset of 0 or more and a limit of at least 1".to_string())
            }
            Self::ConfigError(_) => Some("roster config list".to_string()),
            _ => None,
        }
    }

    /// Whether this error means a single requested entity is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MemberNotFound(_) | Self::TeamNotFound(_))
    }
}
