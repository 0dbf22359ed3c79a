use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwardsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid action: {reason}")]
    InvalidAction { reason: String },

    #[error("No activity counters for user '{user_id}'")]
    ProfileNotFound { user_id: String },

    #[error("Bad badge catalog: {reason}")]
    Catalog { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AwardsResult<T> = Result<T, AwardsError>;
