use crate::assignment::AutoStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Cannot {action}: current status is {current}")]
    InvalidState {
        action: &'static str,
        current: AutoStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeskError {
    pub fn complaint_not_found(id: &str) -> Self {
        Self::NotFound { entity: "Complaint", id: id.to_string() }
    }

    pub fn assignment_not_found(id: &str) -> Self {
        Self::NotFound { entity: "Auto-assignment record", id: id.to_string() }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
