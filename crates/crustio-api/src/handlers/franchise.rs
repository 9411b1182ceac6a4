use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use crustio_common::error::CrustioError;
use crustio_db::Franchise;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    router::AppState,
    types::{
        CreateFranchiseRequest, CreateStoreRequest, FranchiseAdminInfo, FranchiseInfo,
        MessageResponse, StoreInfo, to_franchise_info, to_store_info,
    },
};

pub async fn list_franchises(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FranchiseInfo>>, ApiError> {
    let franchises = state.db.list_franchises()?;
    let infos = franchises
        .iter()
        .map(|franchise| resolve_franchise(&state, franchise))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(infos))
}

pub async fn user_franchises(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<Vec<FranchiseInfo>>, ApiError> {
    if auth.user.id != user_id && !auth.user.is_admin() {
        return Err(ApiError(CrustioError::AccessDenied(
            "only the user or an admin may list their franchises".to_string(),
        )));
    }

    let franchises = state.db.franchises_for_user(&user_id)?;
    let infos = franchises
        .iter()
        .map(|franchise| resolve_franchise(&state, franchise))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(infos))
}

pub async fn create_franchise(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<CreateFranchiseRequest>,
) -> Result<Json<FranchiseInfo>, ApiError> {
    if !auth.user.is_admin() {
        return Err(ApiError(CrustioError::AccessDenied(
            "only admins may create franchises".to_string(),
        )));
    }

    let mut admin_ids = Vec::with_capacity(payload.admins.len());
    for admin in &payload.admins {
        let user = state
            .db
            .get_user_by_email(&admin.email)?
            .ok_or_else(|| ApiError(CrustioError::UserNotFound(admin.email.clone())))?;
        admin_ids.push(user.id);
    }

    let franchise = state.db.create_franchise(&payload.name, admin_ids).await?;
    for admin_id in &franchise.admin_ids {
        state.db.grant_franchisee(admin_id, &franchise.id).await?;
    }

    Ok(Json(resolve_franchise(&state, &franchise)?))
}

pub async fn delete_franchise(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    if !auth.user.is_admin() {
        return Err(ApiError(CrustioError::AccessDenied(
            "only admins may delete franchises".to_string(),
        )));
    }

    state.db.delete_franchise(&franchise_id).await?;
    Ok(Json(MessageResponse {
        message: "franchise deleted".to_string(),
    }))
}

pub async fn create_store(
    State(state): State<Arc<AppState>>,
    Path(franchise_id): Path<String>,
    auth: AuthUser,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<Json<StoreInfo>, ApiError> {
    ensure_franchise_access(&auth, &franchise_id)?;

    let store = state.db.create_store(&franchise_id, &payload.name).await?;
    Ok(Json(to_store_info(&store)))
}

pub async fn delete_store(
    State(state): State<Arc<AppState>>,
    Path((franchise_id, store_id)): Path<(String, String)>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_franchise_access(&auth, &franchise_id)?;

    state.db.delete_store(&franchise_id, &store_id).await?;
    Ok(Json(MessageResponse {
        message: "store deleted".to_string(),
    }))
}

fn ensure_franchise_access(auth: &AuthUser, franchise_id: &str) -> Result<(), ApiError> {
    if auth.user.is_admin() || auth.user.is_franchise_admin(franchise_id) {
        return Ok(());
    }

    Err(ApiError(CrustioError::AccessDenied(
        "requires admin or franchise admin".to_string(),
    )))
}

fn resolve_franchise(state: &AppState, franchise: &Franchise) -> Result<FranchiseInfo, ApiError> {
    let mut admins = Vec::with_capacity(franchise.admin_ids.len());
    for admin_id in &franchise.admin_ids {
        if let Some(user) = state.db.get_user(admin_id)? {
            admins.push(FranchiseAdminInfo {
                id: user.id,
                name: user.name,
                email: user.email,
            });
        }
    }

    Ok(to_franchise_info(franchise, admins))
}
