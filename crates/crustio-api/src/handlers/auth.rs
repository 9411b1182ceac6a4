use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use crustio_auth::{RoleClaim, hash_password, verify_password};
use crustio_common::error::CrustioError;
use crustio_db::{User, UserRole};

use crate::{
    error::ApiError,
    middleware::AuthUser,
    router::AppState,
    types::{
        AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UpdateUserRequest, UserInfo,
        role_name, to_user_info,
    },
};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.name.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError(CrustioError::InvalidArgument(
            "name, email, and password are required".to_string(),
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .db
        .create_user(
            &payload.name,
            &payload.email,
            &password_hash,
            vec![UserRole::diner()],
        )
        .await?;

    let token = open_session(&state, &user)?;
    state.metrics.record_auth_attempt(true);
    state.metrics.increment_active_users();

    Ok(Json(AuthResponse {
        user: to_user_info(&user),
        token,
    }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Some(user) = state.db.get_user_by_email(&payload.email)? else {
        state.metrics.record_auth_attempt(false);
        return Err(ApiError(CrustioError::InvalidCredentials));
    };

    if !verify_password(&payload.password, &user.password_hash) {
        state.metrics.record_auth_attempt(false);
        return Err(ApiError(CrustioError::InvalidCredentials));
    }

    let token = open_session(&state, &user)?;
    state.metrics.record_auth_attempt(true);
    state.metrics.increment_active_users();

    Ok(Json(AuthResponse {
        user: to_user_info(&user),
        token,
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.sessions.logout(&auth.token)? {
        state.metrics.decrement_active_users();
    }

    Ok(Json(MessageResponse {
        message: "logout successful".to_string(),
    }))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    auth: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserInfo>, ApiError> {
    if auth.user.id != user_id && !auth.user.is_admin() {
        return Err(ApiError(CrustioError::AccessDenied(
            "only the user or an admin may update an account".to_string(),
        )));
    }

    let password_hash = payload
        .password
        .as_deref()
        .map(hash_password)
        .transpose()?;
    let user = state
        .db
        .update_user(&user_id, payload.email, password_hash)
        .await?;

    Ok(Json(to_user_info(&user)))
}

fn open_session(state: &AppState, user: &User) -> Result<String, ApiError> {
    let roles = user
        .roles
        .iter()
        .map(|role| RoleClaim {
            role: role_name(role.role).to_string(),
            object_id: role.object_id.clone(),
        })
        .collect();

    let token = state
        .tokens
        .issue(&user.id, &user.name, &user.email, roles)
        .map_err(|err| {
            ApiError(CrustioError::InternalError(format!(
                "failed to issue token: {err}"
            )))
        })?;

    state.sessions.login(&token, &user.id)?;
    Ok(token)
}
