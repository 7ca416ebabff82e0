use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use brainview_bfl::batch::GenerateError;
use brainview_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`GenerateError`] for
/// batch-level generation failures. Implements [`IntoResponse`] to produce
/// consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `brainview_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The image batch could not start at all.
    #[error(transparent)]
    Generation(#[from] GenerateError),

    /// The request body was missing, not JSON, or did not match the
    /// expected shape.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Generation(err @ GenerateError::NotConfigured { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROVIDER_NOT_CONFIGURED",
                err.to_string(),
            ),

            AppError::InvalidBody(rejection) => {
                (rejection.status(), "INVALID_BODY", rejection.body_text())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_maps_to_500_with_credential_name() {
        let response = AppError::from(GenerateError::NotConfigured {
            credential: "BFL_API_KEY",
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::from(CoreError::NotFound {
            entity: "Case",
            id: "case_x".into(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn json_rejection_keeps_its_status() {
        let rejection = JsonRejection::from(
            axum::extract::rejection::MissingJsonContentType::default(),
        );
        let response = AppError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn validation_maps_to_400() {
        let response = AppError::from(CoreError::Validation("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
