use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio_postgres::error::SqlState;

use crate::models::envelope::{self, Envelope};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unsupported method \"{0}\"")]
    UnsupportedMethod(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Domain failures travel inside the envelope; everything else is a
    /// server fault.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::NotFound(_) | ApiError::UnsupportedMethod(_)
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Validation(_) | ApiError::NotFound(_) | ApiError::UnsupportedMethod(_) => {
                return Envelope::failure(self.to_string()).into_response();
            }
            ApiError::Database(ref err) => {
                if err.contains("timeout") {
                    tracing::warn!("PostgreSQL operation timeout: {}", err);
                    "Database operation timed out, please try again"
                } else if err.contains("unavailable") || err.contains("connection") {
                    tracing::error!("PostgreSQL connection issue: {}", err);
                    "Database service is temporarily unavailable"
                } else {
                    tracing::error!("PostgreSQL database error: {}", err);
                    "A database error occurred"
                }
            }
            ApiError::Internal(ref err) => {
                tracing::error!("Internal server error: {:#}", err);
                "An internal server error occurred"
            }
        };

        envelope::raw_response(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
    }
}

// PostgreSQL error mapping
// Input is validated before any query runs, so every SQL failure is a store fault.
impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        from_sql_state(err.code(), &err)
    }
}

fn from_sql_state(code: Option<&SqlState>, err: &dyn std::fmt::Display) -> ApiError {
    match code {
        Some(&SqlState::CONNECTION_EXCEPTION)
        | Some(&SqlState::CONNECTION_DOES_NOT_EXIST)
        | Some(&SqlState::CONNECTION_FAILURE) => {
            tracing::error!("PostgreSQL connection error: {}", err);
            ApiError::Database("Database connection unavailable".to_string())
        }
        Some(&SqlState::UNDEFINED_TABLE) => {
            tracing::error!("PostgreSQL schema error: {}", err);
            ApiError::Database("Database schema is missing".to_string())
        }
        _ => {
            tracing::error!("Unhandled PostgreSQL error: {} (code: {:?})", err, code);
            ApiError::Database("Database operation failed".to_string())
        }
    }
}

// Connection pool error mapping
impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                tracing::warn!("Database connection pool timeout: {}", err);
                ApiError::Database("Database connection timeout".to_string())
            }
            deadpool_postgres::PoolError::Closed => {
                tracing::error!("Database connection pool is closed: {}", err);
                ApiError::Database("Database service unavailable".to_string())
            }
            deadpool_postgres::PoolError::NoRuntimeSpecified => {
                tracing::error!("Database pool runtime error: {}", err);
                ApiError::Internal(anyhow::anyhow!("Database configuration error"))
            }
            _ => {
                tracing::error!("Database connection pool error: {}", err);
                ApiError::Database("Database connection unavailable".to_string())
            }
        }
    }
}

// Result type alias for convenience
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_classification() {
        assert!(ApiError::validation("bad").is_domain());
        assert!(ApiError::not_found("missing").is_domain());
        assert!(ApiError::UnsupportedMethod("PATCH".to_string()).is_domain());
        assert!(!ApiError::Database("down".to_string()).is_domain());
        assert!(!ApiError::Internal(anyhow::anyhow!("boom")).is_domain());
    }

    #[test]
    fn test_domain_messages_are_raw() {
        assert_eq!(ApiError::validation("Contents are blank").to_string(), "Contents are blank");
        assert_eq!(
            ApiError::UnsupportedMethod("PATCH".to_string()).to_string(),
            "Unsupported method \"PATCH\""
        );
    }

    #[test]
    fn test_domain_error_maps_to_bad_request() {
        let response = ApiError::not_found("No messages found").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_constraint_violations_are_store_faults() {
        for code in [
            SqlState::FOREIGN_KEY_VIOLATION,
            SqlState::NOT_NULL_VIOLATION,
            SqlState::NUMERIC_VALUE_OUT_OF_RANGE,
        ] {
            let err = from_sql_state(Some(&code), &"constraint failed");
            assert!(matches!(err, ApiError::Database(_)));
            assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_connection_failures_are_unavailable() {
        let err = from_sql_state(Some(&SqlState::CONNECTION_FAILURE), &"reset");
        assert_eq!(err.to_string(), "Database error: Database connection unavailable");
    }

    #[test]
    fn test_database_error_maps_to_server_error() {
        let response = ApiError::Database("Database connection unavailable".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
