//! # Filter errors
//!
//! The engine itself never fails on unknown or malformed parameters: an
//! unmatched name is simply not applied. [`FilterError`] is what registered
//! handlers return when they reject a value they did match, and what
//! vocabulary parsing returns for bad configuration.
//!
//! Errors convert into sanitized HTTP responses so a controller can return
//! them directly:
//!
//! ```rust,ignore
//! async fn list_users(
//!     request: FilterRequest,
//!     State(db): State<DatabaseConnection>,
//! ) -> Result<Json<Vec<user::Model>>, FilterError> {
//!     let select = user_filter().apply_request(&request, user::Entity::find())?;
//!     Ok(Json(select.all(&db).await?))
//! }
//! ```
//!
//! Internal details (database errors, config problems) are logged through
//! `tracing` and never sent to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum FilterError {
    /// 400 Bad Request - a handler rejected a parameter value
    InvalidValue {
        /// Parameter (or range method) that carried the value
        parameter: String,
        /// User-facing message
        message: String,
    },

    /// 500 Internal Server Error - bad range vocabulary or filter setup
    Config {
        /// Details (logged, not sent to user)
        message: String,
    },

    /// 500 Internal Server Error - database error raised inside a handler
    Database {
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - anything else a handler reports
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl FilterError {
    /// Create a 400 error for a rejected parameter value
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(FilterError::invalid_value("status", "unknown status 'archived'"));
    /// ```
    pub fn invalid_value(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            Self::Config { .. } | Self::Database { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// User-facing message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidValue { parameter, message } => {
                format!("Invalid value for '{parameter}': {message}")
            }
            Self::Config { .. } => "Filter configuration error".to_string(),
            Self::Database { .. } => "A database error occurred".to_string(),
            Self::Internal { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Config { message } => {
                tracing::error!(details = %message, "Filter configuration error");
            }
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "Filter error"
                );
            }
        }
    }
}

/// Error body sent to users
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<String>,
}

impl IntoResponse for FilterError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let parameter = match &self {
            Self::InvalidValue { parameter, .. } => Some(parameter.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.user_message(),
            parameter,
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Display is used for logs and config parsing, so keep the detail.
            Self::Config { message } => write!(f, "filter configuration error: {message}"),
            _ => write!(f, "{}", self.user_message()),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal } => Some(internal),
            _ => None,
        }
    }
}

impl From<DbErr> for FilterError {
    fn from(err: DbErr) -> Self {
        Self::Database { internal: err }
    }
}
