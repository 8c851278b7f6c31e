use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codecore::AppError;

/// Errors returned by the HTTP handlers
///
/// Rendered as `{"error": "<message>"}` with a matching status; the detailed
/// cause is only logged.
#[derive(Debug)]
pub enum ApiError {
    /// Webhook delivery without the expected secret header
    Forbidden,
    /// Bot API call failed
    Telegram(String),
    Core(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Core(err)
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Core(AppError::Validation(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Telegram(_) => StatusCode::BAD_GATEWAY,
            ApiError::Core(err) => match err {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::EmptyResponse | AppError::Upstream(_) | AppError::UnknownResponseShape(_) => {
                    StatusCode::BAD_GATEWAY
                }
                AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::Forbidden => "Forbidden",
            ApiError::Telegram(_) => "Failed to send to chat",
            ApiError::Core(err) => err.user_message(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Forbidden => log::warn!("Rejected webhook delivery with wrong secret"),
            ApiError::Telegram(detail) => log::error!("Telegram request failed: {}", detail),
            ApiError::Core(err) if status.is_server_error() => log::error!("Request failed: {}", err),
            ApiError::Core(err) => log::info!("Request rejected: {}", err),
        }

        let body = Json(serde_json::json!({
            "error": self.message()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::validation("bad"), StatusCode::BAD_REQUEST),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound(3).into(), StatusCode::NOT_FOUND),
            (AppError::EmptyResponse.into(), StatusCode::BAD_GATEWAY),
            (AppError::Upstream("x".into()).into(), StatusCode::BAD_GATEWAY),
            (AppError::UnknownResponseShape("x".into()).into(), StatusCode::BAD_GATEWAY),
            (AppError::Timeout(Duration::from_secs(1)).into(), StatusCode::GATEWAY_TIMEOUT),
            (AppError::StorageUnavailable("x".into()).into(), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Config("x".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err:?}");
        }
    }

    #[test]
    fn test_message_hides_details() {
        let err: ApiError = AppError::Upstream("401: key sk-live-123 revoked".into()).into();
        assert_eq!(err.message(), "Code generation service failed");
    }
}
