use chrono::{DateTime, Utc};
use crustio_db::{Franchise, MenuItem, Order, Role, Store, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleInfo {
    pub role: String,
    #[serde(rename = "objectId", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roles: Vec<RoleInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FranchiseAdminRef {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFranchiseRequest {
    pub name: String,
    #[serde(default)]
    pub admins: Vec<FranchiseAdminRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FranchiseAdminInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FranchiseInfo {
    pub id: String,
    pub name: String,
    pub admins: Vec<FranchiseAdminInfo>,
    pub stores: Vec<StoreInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMenuItemRequest {
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInfo {
    #[serde(rename = "menuId")]
    pub menu_id: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(rename = "franchiseId")]
    pub franchise_id: String,
    #[serde(rename = "storeId")]
    pub store_id: String,
    pub items: Vec<OrderItemInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderInfo {
    pub id: String,
    #[serde(rename = "franchiseId")]
    pub franchise_id: String,
    #[serde(rename = "storeId")]
    pub store_id: String,
    pub items: Vec<OrderItemInfo>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrdersResponse {
    #[serde(rename = "dinerId")]
    pub diner_id: String,
    pub orders: Vec<OrderInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order: OrderInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
}

pub fn to_user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        roles: user
            .roles
            .iter()
            .map(|role| RoleInfo {
                role: role_name(role.role).to_string(),
                object_id: role.object_id.clone(),
            })
            .collect(),
    }
}

pub fn to_store_info(store: &Store) -> StoreInfo {
    StoreInfo {
        id: store.id.clone(),
        name: store.name.clone(),
    }
}

pub fn to_franchise_info(franchise: &Franchise, admins: Vec<FranchiseAdminInfo>) -> FranchiseInfo {
    FranchiseInfo {
        id: franchise.id.clone(),
        name: franchise.name.clone(),
        admins,
        stores: franchise.stores.iter().map(to_store_info).collect(),
    }
}

pub fn to_menu_item_info(item: &MenuItem) -> MenuItemInfo {
    MenuItemInfo {
        id: item.id.clone(),
        title: item.title.clone(),
        description: item.description.clone(),
        image: item.image.clone(),
        price: item.price,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItemInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub price: f64,
}

pub fn to_order_info(order: &Order) -> OrderInfo {
    OrderInfo {
        id: order.id.clone(),
        franchise_id: order.franchise_id.clone(),
        store_id: order.store_id.clone(),
        items: order
            .items
            .iter()
            .map(|item| OrderItemInfo {
                menu_id: item.menu_id.clone(),
                description: item.description.clone(),
                price: item.price,
            })
            .collect(),
        date: order.created_at,
    }
}

pub fn role_name(role: Role) -> &'static str {
    match role {
        Role::Diner => "diner",
        Role::Franchisee => "franchisee",
        Role::Admin => "admin",
    }
}
