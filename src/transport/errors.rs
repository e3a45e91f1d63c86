use {
    crate::domain::{
        error::{ErrorCategory, UnipayError},
        provider::UnknownProvider,
    },
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
};

/// HTTP face of the crate's errors.
#[derive(Debug)]
pub enum ApiError {
    Unipay(UnipayError),
    UnknownProvider(UnknownProvider),
}

impl From<UnipayError> for ApiError {
    fn from(err: UnipayError) -> Self {
        Self::Unipay(err)
    }
}

impl From<UnknownProvider> for ApiError {
    fn from(err: UnknownProvider) -> Self {
        Self::UnknownProvider(err)
    }
}

pub fn status_for(err: &UnipayError) -> StatusCode {
    match err {
        UnipayError::ProviderNotFound { .. }
        | UnipayError::WebhookProviderNotConfigured { .. }
        | UnipayError::PaymentNotFound { .. }
        | UnipayError::RefundNotFound { .. } => StatusCode::NOT_FOUND,
        UnipayError::WebhookSignatureInvalid { .. }
        | UnipayError::WebhookTimestampExpired { .. } => StatusCode::UNAUTHORIZED,
        UnipayError::WebhookParsing { .. } => StatusCode::BAD_REQUEST,
        UnipayError::PaymentCreationFailed { .. }
        | UnipayError::PaymentRetrievalFailed { .. }
        | UnipayError::RefundCreationFailed { .. }
        | UnipayError::RefundRetrievalFailed { .. } => StatusCode::BAD_GATEWAY,
        other => match other.category() {
            ErrorCategory::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Unipay(err) => {
                let status = status_for(err);
                let message = if status.is_server_error() {
                    tracing::error!(error_code = err.code(), "request failed: {err}");
                    match status {
                        StatusCode::BAD_GATEWAY => "payment gateway error".to_string(),
                        _ => "internal error".to_string(),
                    }
                } else {
                    err.to_string()
                };
                (
                    status,
                    serde_json::json!({
                        "error_code": err.code(),
                        "message": message,
                        "provider": err.provider(),
                    }),
                )
            }
            Self::UnknownProvider(err) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error_code": "PROVIDER_NOT_FOUND",
                    "message": err.to_string(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
