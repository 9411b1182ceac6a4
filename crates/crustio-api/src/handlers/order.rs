use std::{sync::Arc, time::Instant};

use axum::{Json, extract::State};
use crustio_common::error::CrustioError;
use crustio_db::OrderItem;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    router::AppState,
    types::{
        AddMenuItemRequest, MenuItemInfo, OrderResponse, OrdersResponse, PlaceOrderRequest,
        to_menu_item_info, to_order_info,
    },
};

pub async fn get_menu(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MenuItemInfo>>, ApiError> {
    let menu = state.db.list_menu()?;
    Ok(Json(menu.iter().map(to_menu_item_info).collect()))
}

/// Adds an item and returns the updated menu, mirroring what the web
/// client expects.
pub async fn add_menu_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<AddMenuItemRequest>,
) -> Result<Json<Vec<MenuItemInfo>>, ApiError> {
    if !auth.user.is_admin() {
        return Err(ApiError(CrustioError::AccessDenied(
            "only admins may change the menu".to_string(),
        )));
    }

    state
        .db
        .add_menu_item(
            &payload.title,
            &payload.description,
            &payload.image,
            payload.price,
        )
        .await?;

    let menu = state.db.list_menu()?;
    Ok(Json(menu.iter().map(to_menu_item_info).collect()))
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<OrdersResponse>, ApiError> {
    let orders = state.db.orders_for_diner(&auth.user.id)?;
    Ok(Json(OrdersResponse {
        diner_id: auth.user.id,
        orders: orders.iter().map(to_order_info).collect(),
    }))
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError(CrustioError::InvalidArgument(
            "order must contain at least one item".to_string(),
        )));
    }

    for item in &payload.items {
        state
            .db
            .get_menu_item(&item.menu_id)?
            .ok_or_else(|| ApiError(CrustioError::MenuItemNotFound(item.menu_id.clone())))?;
    }

    let items = payload
        .items
        .iter()
        .map(|item| OrderItem {
            menu_id: item.menu_id.clone(),
            description: item.description.clone(),
            price: item.price,
        })
        .collect();

    let started_at = Instant::now();
    let order = match state
        .db
        .create_order(
            &auth.user.id,
            &payload.franchise_id,
            &payload.store_id,
            items,
        )
        .await
    {
        Ok(order) => order,
        Err(err) => {
            state.metrics.record_order(0, 0.0, 0.0, false);
            return Err(err.into());
        }
    };

    let jwt = match &state.factory {
        Some(factory) => match factory.fulfill(&auth.user, &order).await {
            Ok(jwt) => Some(jwt),
            Err(err) => {
                state.metrics.record_order(0, 0.0, 0.0, false);
                return Err(err.into());
            }
        },
        None => None,
    };

    state.metrics.record_order(
        order.items.len() as u64,
        order.total_price(),
        started_at.elapsed().as_secs_f64(),
        true,
    );

    Ok(Json(OrderResponse {
        order: to_order_info(&order),
        jwt,
    }))
}
