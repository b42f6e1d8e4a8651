use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    Unauthenticated,
    PostNotBound,
    SurrealDb { source: String },
    Timeout { operation: String },
    Cancelled,
}

/// Errors raised by the store and change feed collaborators.
/// The like controller itself never hands one of these to its caller.
pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::Unauthenticated => write!(f, "You must be signed in to like posts"),
            Self::PostNotBound => write!(f, "No post selected"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
            Self::Timeout { operation } => write!(f, "{operation} timed out"),
            Self::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        AppError::SurrealDb {
            source: value.to_string(),
        }
    }
}
