use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use crustio_auth::parse_bearer_header;
use crustio_common::error::CrustioError;
use crustio_db::User;
use tracing::debug;

use crate::{error::ApiError, router::AppState};

/// Counts every inbound request by HTTP method before routing.
pub async fn track_requests(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    state.metrics.record_request(request.method());
    next.run(request).await
}

/// Authenticated caller, extracted from the bearer token. Requires a
/// valid signature, an unexpired token, and a live (not logged-out)
/// session.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or_else(|| {
                ApiError(CrustioError::AuthRequired(
                    "missing authorization header".to_string(),
                ))
            })?;

        let token = parse_bearer_header(header).map_err(|err| {
            debug!(error = %err, "rejected authorization header");
            ApiError(CrustioError::AuthRequired(
                "invalid authorization header".to_string(),
            ))
        })?;

        let claims = state.tokens.verify(token).map_err(|err| {
            debug!(error = %err, "rejected auth token");
            ApiError(CrustioError::AuthRequired("invalid token".to_string()))
        })?;

        if !state.sessions.is_active(token).map_err(ApiError::from)? {
            return Err(ApiError(CrustioError::AuthRequired(
                "session is no longer active".to_string(),
            )));
        }

        let user = state
            .db
            .get_user(&claims.sub)
            .map_err(ApiError::from)?
            .ok_or_else(|| {
                ApiError(CrustioError::AuthRequired("unknown user".to_string()))
            })?;

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}
