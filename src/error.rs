use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::{StoreError, StoreResult};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The caller is known but may not act on the resource.
    #[error("{0}")]
    Unauthorized(String),
    /// The caller could not be identified.
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Conflict(String),
    #[error("failed to {context}: {source}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Storage { .. })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SeatTaken => AppError::Conflict("seat already booked".into()),
            StoreError::ShowingNotOffered => AppError::NotFound("showing"),
            StoreError::Duplicate(what) => AppError::Conflict(format!("{what} already exists")),
            other => AppError::Storage { context: "access storage", source: other },
        }
    }
}

/// Attaches the failed step to storage errors while letting domain outcomes
/// (taken seat, unknown showing, duplicates) through as their own kinds.
pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> AppResult<T>;
}

impl<T> StoreContext<T> for StoreResult<T> {
    fn context(self, context: &'static str) -> AppResult<T> {
        self.map_err(|err| match AppError::from(err) {
            AppError::Storage { source, .. } => AppError::Storage { context, source },
            mapped => mapped,
        })
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

fn describe(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match &*error.code {
        "length" => "has an invalid length".into(),
        "email" => "must be a valid email address".into(),
        "range" => "is out of range".into(),
        _ => "is invalid".into(),
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| errs.first().map(|e| format!("{field} {}", describe(e))))
            .collect();
        fields.sort();
        if fields.is_empty() {
            return AppError::invalid("invalid request");
        }
        AppError::InvalidInput(fields.join("; "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Storage { .. } | AppError::Internal(_) => tracing::error!("request failed: {}", self),
            _ => tracing::debug!("request rejected ({}): {}", status, self),
        }

        let message = match &self {
            AppError::Storage { .. } => "storage unavailable, please retry".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_store_errors_keep_their_kind() {
        let err: AppResult<()> = Err::<(), _>(StoreError::SeatTaken).context("reserve seat");
        assert!(matches!(err, Err(AppError::Conflict(ref m)) if m == "seat already booked"));

        let err: AppResult<()> = Err::<(), _>(StoreError::ShowingNotOffered).context("reserve seat");
        assert_eq!(err.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_failures_carry_the_step() {
        let err = Err::<(), _>(StoreError::Database(sqlx::Error::PoolTimedOut))
            .context("load booking")
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("failed to load booking"));
    }

    #[test]
    fn validation_errors_name_the_field() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("time", validator::ValidationError::new("length"));
        errors.add("email", validator::ValidationError::new("email"));

        let err = AppError::from(errors);
        assert!(
            matches!(err, AppError::InvalidInput(ref m) if m == "email must be a valid email address; time has an invalid length"),
            "got {err:?}"
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::invalid("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unauthorized("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthenticated("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
    }
}
