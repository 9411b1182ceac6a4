use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Diner,
    Franchisee,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub role: Role,
    /// Franchise id for franchisee roles; absent for diner and admin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

impl UserRole {
    pub fn diner() -> Self {
        Self {
            role: Role::Diner,
            object_id: None,
        }
    }

    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            object_id: None,
        }
    }

    pub fn franchisee(franchise_id: impl Into<String>) -> Self {
        Self {
            role: Role::Franchisee,
            object_id: Some(franchise_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.role == Role::Admin)
    }

    pub fn is_franchise_admin(&self, franchise_id: &str) -> bool {
        self.roles.iter().any(|r| {
            r.role == Role::Franchisee && r.object_id.as_deref() == Some(franchise_id)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Franchise {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub admin_ids: Vec<String>,
    #[serde(default)]
    pub stores: Vec<Store>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub menu_id: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub diner_id: String,
    pub franchise_id: String,
    pub store_id: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }
}
