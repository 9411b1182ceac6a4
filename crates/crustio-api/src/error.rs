use axum::{
    Json,
    response::{IntoResponse, Response},
};
use crustio_common::error::CrustioError;
use http::StatusCode;

pub struct ApiError(pub CrustioError);

impl From<CrustioError> for ApiError {
    fn from(value: CrustioError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CrustioError::UserNotFound(_)
            | CrustioError::FranchiseNotFound(_)
            | CrustioError::StoreNotFound { .. }
            | CrustioError::MenuItemNotFound(_) => StatusCode::NOT_FOUND,
            CrustioError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            CrustioError::InvalidCredentials | CrustioError::AuthRequired(_) => {
                StatusCode::UNAUTHORIZED
            }
            CrustioError::AccessDenied(_) => StatusCode::FORBIDDEN,
            CrustioError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CrustioError::FulfillmentFailed(_)
            | CrustioError::InternalError(_)
            | CrustioError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(serde_json::json!({
                "code": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}
