//! Error types for sailor
//!
//! This module provides error handling for the library, including:
//! - The orchestration taxonomy (metadata, range, candidate, persistence, backend)
//! - Provider errors raised by the metadata/search/backend adapters
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for sailor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sailor
///
/// Only [`Error::MetadataUnavailable`] and [`Error::InvalidRange`] ever reach the
/// caller of a range submission. The remaining orchestration variants are logged
/// by the driver and the campaign continues on the next completion signal.
#[derive(Debug, Error)]
pub enum Error {
    /// Series lookup failed, so no episode list could be generated
    #[error("metadata unavailable for '{title}': {reason}")]
    MetadataUnavailable {
        /// Title that was looked up
        title: String,
        /// Underlying failure
        reason: String,
    },

    /// Season bounds are empty after clamping to what the series offers
    #[error("minimum season ({min_season}) cannot be greater than maximum season ({max_season})")]
    InvalidRange {
        /// Clamped lower season bound
        min_season: u32,
        /// Clamped upper season bound
        max_season: u32,
    },

    /// Search returned nothing usable for one episode
    #[error("no candidates found for '{query}'")]
    NoCandidates {
        /// Query sent to the search provider
        query: String,
    },

    /// Durable write failed; the in-memory state is still authoritative
    #[error("failed to persist '{key}': {reason}")]
    PersistFailure {
        /// Store key that could not be written
        key: String,
        /// Underlying failure
        reason: String,
    },

    /// The download backend refused to start a transfer
    #[error("download backend rejected transfer: {0}")]
    BackendRejected(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "providers.omdb.api_key")
        key: Option<String>,
    },

    /// External provider (metadata, search, backend) failure
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Errors raised by the external capability adapters
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered but has no such title/season
    #[error("{0} not found")]
    NotFound(String),

    /// The request never produced a usable answer (connect, timeout, HTTP status)
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider answered with something we could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials were refused
    #[error("authentication failed: {0}")]
    Unauthorized(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_range",
///     "message": "minimum season (4) cannot be greater than maximum season (3)",
///     "details": {
///       "min_season": 4,
///       "max_season": 3
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,
            Error::NoCandidates { .. } => 404,
            Error::Provider(ProviderError::NotFound(_)) => 404,

            // 422 Unprocessable Entity - Semantic errors
            Error::InvalidRange { .. } => 422,

            // 500 Internal Server Error - Server-side issues
            Error::PersistFailure { .. } => 500,
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::MetadataUnavailable { .. } => 502,
            Error::BackendRejected(_) => 502,
            Error::Provider(_) => 502,
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::MetadataUnavailable { .. } => "metadata_unavailable",
            Error::InvalidRange { .. } => "invalid_range",
            Error::NoCandidates { .. } => "no_candidates",
            Error::PersistFailure { .. } => "persist_failure",
            Error::BackendRejected(_) => "backend_rejected",
            Error::Config { .. } => "config_error",
            Error::Provider(e) => match e {
                ProviderError::NotFound(_) => "provider_not_found",
                ProviderError::Transport(_) => "provider_transport_error",
                ProviderError::InvalidResponse(_) => "provider_invalid_response",
                ProviderError::Unauthorized(_) => "provider_unauthorized",
            },
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::NotFound(_) => "not_found",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::MetadataUnavailable { title, .. } => Some(serde_json::json!({
                "title": title,
            })),
            Error::InvalidRange {
                min_season,
                max_season,
            } => Some(serde_json::json!({
                "min_season": min_season,
                "max_season": max_season,
            })),
            Error::NoCandidates { query } => Some(serde_json::json!({
                "query": query,
            })),
            Error::PersistFailure { key, .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::MetadataUnavailable {
                    title: "Lost".into(),
                    reason: "timeout".into(),
                },
                502,
                "metadata_unavailable",
            ),
            (
                Error::InvalidRange {
                    min_season: 5,
                    max_season: 3,
                },
                422,
                "invalid_range",
            ),
            (
                Error::NoCandidates {
                    query: "Lost S01E01".into(),
                },
                404,
                "no_candidates",
            ),
            (
                Error::PersistFailure {
                    key: "download_queue".into(),
                    reason: "disk full".into(),
                },
                500,
                "persist_failure",
            ),
            (
                Error::BackendRejected("Fails.".into()),
                502,
                "backend_rejected",
            ),
            (
                Error::Config {
                    message: "missing".into(),
                    key: Some("providers.omdb.api_key".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Provider(ProviderError::NotFound("series 'x'".into())),
                404,
                "provider_not_found",
            ),
            (
                Error::Provider(ProviderError::Transport("reset".into())),
                502,
                "provider_transport_error",
            ),
            (
                Error::Provider(ProviderError::InvalidResponse("eof".into())),
                502,
                "provider_invalid_response",
            ),
            (
                Error::Provider(ProviderError::Unauthorized("bad login".into())),
                502,
                "provider_unauthorized",
            ),
            (
                Error::Database(DatabaseError::QueryFailed("locked".into())),
                500,
                "database_error",
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (Error::NotFound("mapping".into()), 404, "not_found"),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn test_status_and_error_codes_for_all_variants() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {:?}", error);
            assert_eq!(error.error_code(), code, "code for {:?}", error);
        }
    }

    #[test]
    fn test_invalid_range_message_names_both_bounds() {
        let error = Error::InvalidRange {
            min_season: 4,
            max_season: 3,
        };
        assert_eq!(
            error.to_string(),
            "minimum season (4) cannot be greater than maximum season (3)"
        );
    }

    #[test]
    fn test_api_error_carries_range_details() {
        let api_error: ApiError = Error::InvalidRange {
            min_season: 4,
            max_season: 3,
        }
        .into();

        assert_eq!(api_error.error.code, "invalid_range");
        let details = api_error.error.details.unwrap();
        assert_eq!(details["min_season"], 4);
        assert_eq!(details["max_season"], 3);
    }

    #[test]
    fn test_api_error_without_details_skips_field() {
        let api_error: ApiError = Error::Other("boom".into()).into();
        let json = serde_json::to_value(&api_error).unwrap();
        assert!(json["error"].get("details").is_none());
        assert_eq!(json["error"]["message"], "boom");
    }

    #[test]
    fn test_provider_error_converts_with_question_mark() {
        fn lookup() -> Result<()> {
            Err(ProviderError::NotFound("season 9".into()))?;
            Ok(())
        }

        match lookup() {
            Err(Error::Provider(ProviderError::NotFound(what))) => assert_eq!(what, "season 9"),
            other => panic!("expected provider NotFound, got {:?}", other),
        }
    }
}
