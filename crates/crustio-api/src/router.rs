use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use crustio_auth::{SessionRegistry, TokenCodec};
use crustio_db::DbSys;
use crustio_metrics::ServiceMetrics;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{factory::FactoryClient, handlers, middleware::track_requests};

pub struct AppState {
    pub db: DbSys,
    pub sessions: SessionRegistry,
    pub tokens: TokenCodec,
    pub metrics: Arc<ServiceMetrics>,
    pub factory: Option<FactoryClient>,
}

impl AppState {
    pub fn new(
        db: DbSys,
        tokens: TokenCodec,
        metrics: Arc<ServiceMetrics>,
        factory: Option<FactoryClient>,
    ) -> Self {
        Self {
            db,
            sessions: SessionRegistry::new(),
            tokens,
            metrics,
            factory,
        }
    }
}

pub fn pizza_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/auth",
            post(handlers::auth::register)
                .put(handlers::auth::login)
                .delete(handlers::auth::logout),
        )
        .route("/api/auth/{user_id}", put(handlers::auth::update_user))
        .route(
            "/api/franchise",
            get(handlers::franchise::list_franchises).post(handlers::franchise::create_franchise),
        )
        .route(
            "/api/franchise/{franchise_id}",
            get(handlers::franchise::user_franchises).delete(handlers::franchise::delete_franchise),
        )
        .route(
            "/api/franchise/{franchise_id}/store",
            post(handlers::franchise::create_store),
        )
        .route(
            "/api/franchise/{franchise_id}/store/{store_id}",
            delete(handlers::franchise::delete_store),
        )
        .route(
            "/api/order/menu",
            get(handlers::order::get_menu).put(handlers::order::add_menu_item),
        )
        .route(
            "/api/order",
            get(handlers::order::list_orders).post(handlers::order::create_order),
        )
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track_requests,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use crustio_auth::{TokenCodec, hash_password};
    use crustio_db::{DbSys, UserRole};
    use crustio_metrics::ServiceMetrics;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::{AppState, pizza_router};

    const ADMIN_EMAIL: &str = "admin@jwt.com";
    const ADMIN_PASSWORD: &str = "toomanysecrets";

    async fn test_state() -> (Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = DbSys::new(dir.path()).await.unwrap();

        let hash = hash_password(ADMIN_PASSWORD).unwrap();
        db.create_user("admin", ADMIN_EMAIL, &hash, vec![UserRole::admin()])
            .await
            .unwrap();

        let state = Arc::new(AppState::new(
            db,
            TokenCodec::new("test-secret", 3600),
            Arc::new(ServiceMetrics::new()),
            None,
        ));
        (state, dir)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login_admin(router: &Router) -> String {
        let (status, body) = send(
            router,
            "PUT",
            "/api/auth",
            None,
            Some(serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn register_diner(router: &Router, email: &str) -> String {
        let (status, body) = send(
            router,
            "POST",
            "/api/auth",
            None,
            Some(serde_json::json!({"name": "pizza diner", "email": email, "password": "a"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn register_logout_lifecycle_drives_the_active_user_gauge() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let token = register_diner(&router, "reg@test.com").await;
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(state.metrics.snapshot().active_users, 1);
        assert_eq!(state.metrics.snapshot().successful_auths, 1);

        let (status, _) = send(&router, "DELETE", "/api/auth", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.metrics.snapshot().active_users, 0);

        // A revoked token no longer authenticates.
        let (status, _) = send(&router, "DELETE", "/api/auth", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn failed_login_records_a_failed_auth_attempt() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let (status, _) = send(
            &router,
            "PUT",
            "/api/auth",
            None,
            Some(serde_json::json!({"email": ADMIN_EMAIL, "password": "wrong"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.failed_auths, 1);
        assert_eq!(snapshot.successful_auths, 0);
    }

    #[tokio::test]
    async fn franchise_management_requires_admin() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let admin_token = login_admin(&router).await;
        let diner_token = register_diner(&router, "diner@test.com").await;

        let franchise_body =
            serde_json::json!({"name": "pizza palace", "admins": [{"email": ADMIN_EMAIL}]});
        let (status, _) = send(
            &router,
            "POST",
            "/api/franchise",
            Some(&diner_token),
            Some(franchise_body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, franchise) = send(
            &router,
            "POST",
            "/api/franchise",
            Some(&admin_token),
            Some(franchise_body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(franchise["admins"][0]["email"], ADMIN_EMAIL);

        let franchise_id = franchise["id"].as_str().unwrap();
        let (status, store) = send(
            &router,
            "POST",
            &format!("/api/franchise/{franchise_id}/store"),
            Some(&admin_token),
            Some(serde_json::json!({"name": "downtown"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store["name"], "downtown");

        let (status, franchises) = send(&router, "GET", "/api/franchise", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(franchises.as_array().unwrap().len(), 1);
        assert_eq!(franchises[0]["stores"][0]["name"], "downtown");
    }

    #[tokio::test]
    async fn menu_updates_and_orders_feed_the_purchase_counters() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let admin_token = login_admin(&router).await;

        let (status, menu) = send(
            &router,
            "PUT",
            "/api/order/menu",
            Some(&admin_token),
            Some(serde_json::json!({
                "title": "Veggie",
                "description": "No topping, no sauce, just carbs",
                "image": "pizza9.png",
                "price": 0.0042,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu.as_array().unwrap().len(), 1);
        let menu_id = menu[0]["id"].as_str().unwrap().to_string();

        let (_, franchise) = send(
            &router,
            "POST",
            "/api/franchise",
            Some(&admin_token),
            Some(serde_json::json!({"name": "slice city", "admins": []})),
        )
        .await;
        let franchise_id = franchise["id"].as_str().unwrap().to_string();
        let (_, store) = send(
            &router,
            "POST",
            &format!("/api/franchise/{franchise_id}/store"),
            Some(&admin_token),
            Some(serde_json::json!({"name": "uptown"})),
        )
        .await;
        let store_id = store["id"].as_str().unwrap().to_string();

        let diner_token = register_diner(&router, "hungry@test.com").await;
        let (status, order) = send(
            &router,
            "POST",
            "/api/order",
            Some(&diner_token),
            Some(serde_json::json!({
                "franchiseId": franchise_id,
                "storeId": store_id,
                "items": [{"menuId": menu_id, "description": "Veggie", "price": 0.0042}],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["order"]["items"][0]["menuId"], menu_id);
        assert!(order["jwt"].is_null());

        let (status, orders) = send(&router, "GET", "/api/order", Some(&diner_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders["orders"].as_array().unwrap().len(), 1);

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.pizzas_sold, 1);
        assert!((snapshot.revenue - 0.0042).abs() < 1e-9);
        assert_eq!(snapshot.creation_failures, 0);
        assert!(snapshot.creation_latency_seconds > 0.0);
    }

    #[tokio::test]
    async fn order_against_unknown_store_records_a_creation_failure() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let admin_token = login_admin(&router).await;
        let (_, menu) = send(
            &router,
            "PUT",
            "/api/order/menu",
            Some(&admin_token),
            Some(serde_json::json!({
                "title": "Pepperoni",
                "description": "Spicy",
                "image": "pizza2.png",
                "price": 0.05,
            })),
        )
        .await;
        let menu_id = menu[0]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &router,
            "POST",
            "/api/order",
            Some(&admin_token),
            Some(serde_json::json!({
                "franchiseId": "missing",
                "storeId": "missing",
                "items": [{"menuId": menu_id, "description": "Pepperoni", "price": 0.05}],
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.creation_failures, 1);
        assert_eq!(snapshot.pizzas_sold, 0);
    }

    #[tokio::test]
    async fn every_request_passes_the_method_tracker() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        send(&router, "GET", "/api/order/menu", None, None).await;
        send(&router, "GET", "/api/franchise", None, None).await;
        send(
            &router,
            "PUT",
            "/api/auth",
            None,
            Some(serde_json::json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD})),
        )
        .await;

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.get_requests, 2);
        assert_eq!(snapshot.put_requests, 1);
        assert_eq!(snapshot.total_requests, 3);
    }

    #[tokio::test]
    async fn users_may_only_update_themselves_unless_admin() {
        let (state, _dir) = test_state().await;
        let router = pizza_router(Arc::clone(&state));

        let token_a = register_diner(&router, "a@test.com").await;
        let _token_b = register_diner(&router, "b@test.com").await;
        let user_b_id = state
            .db
            .get_user_by_email("b@test.com")
            .unwrap()
            .unwrap()
            .id;

        let (status, _) = send(
            &router,
            "PUT",
            &format!("/api/auth/{user_b_id}"),
            Some(&token_a),
            Some(serde_json::json!({"email": "hijack@test.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin_token = login_admin(&router).await;
        let (status, updated) = send(
            &router,
            "PUT",
            &format!("/api/auth/{user_b_id}"),
            Some(&admin_token),
            Some(serde_json::json!({"email": "new_email@jwt.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["email"], "new_email@jwt.com");
    }
}
