use crustio_common::error::{CrustioError, Result};
use crustio_db::{Order, User};
use serde::Deserialize;

/// Client for the external pizza factory that fulfills orders and hands
/// back a verifiable receipt JWT.
pub struct FactoryClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct FactoryReceipt {
    jwt: String,
}

impl FactoryClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Builds the client from `CRUSTIO_FACTORY_*` environment variables;
    /// absent URL means orders are fulfilled without a factory receipt.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("CRUSTIO_FACTORY_URL").ok()?;
        let api_key = std::env::var("CRUSTIO_FACTORY_API_KEY").unwrap_or_default();
        Some(Self::new(endpoint, api_key))
    }

    pub async fn fulfill(&self, diner: &User, order: &Order) -> Result<String> {
        let body = serde_json::json!({
            "diner": {
                "id": diner.id,
                "name": diner.name,
                "email": diner.email,
            },
            "order": {
                "id": order.id,
                "franchiseId": order.franchise_id,
                "storeId": order.store_id,
                "items": order.items.iter().map(|item| {
                    serde_json::json!({
                        "menuId": item.menu_id,
                        "description": item.description,
                        "price": item.price,
                    })
                }).collect::<Vec<_>>(),
            },
        });

        let response = self
            .client
            .post(format!("{}/api/order", self.endpoint))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                CrustioError::FulfillmentFailed(format!(
                    "factory {} unreachable: {err}",
                    self.endpoint
                ))
            })?;

        if !response.status().is_success() {
            return Err(CrustioError::FulfillmentFailed(format!(
                "factory {} returned status {}",
                self.endpoint,
                response.status()
            )));
        }

        let receipt: FactoryReceipt = response.json().await.map_err(|err| {
            CrustioError::FulfillmentFailed(format!("invalid factory receipt: {err}"))
        })?;
        Ok(receipt.jwt)
    }
}
