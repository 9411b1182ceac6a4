use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

use crustio_common::error::{CrustioError, Result};
use crustio_common::time;
use uuid::Uuid;

use crate::{
    store::DbStore,
    types::{Franchise, MenuItem, Order, OrderItem, Store, User, UserRole},
};

/// In-memory view of the service data, backed by [`DbStore`] JSON files.
/// Every mutation writes through to disk before updating the caches.
#[derive(Debug, Clone)]
pub struct DbSys {
    store: DbStore,
    users: Arc<RwLock<HashMap<String, User>>>,
    franchises: Arc<RwLock<HashMap<String, Franchise>>>,
    menu: Arc<RwLock<HashMap<String, MenuItem>>>,
    orders: Arc<RwLock<HashMap<String, Order>>>,
}

impl DbSys {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let store = DbStore::new(data_dir).await?;

        let mut users = HashMap::new();
        for user in store.list_users().await? {
            users.insert(user.id.clone(), user);
        }

        let mut franchises = HashMap::new();
        for franchise in store.list_franchises().await? {
            franchises.insert(franchise.id.clone(), franchise);
        }

        let mut menu = HashMap::new();
        for item in store.list_menu().await? {
            menu.insert(item.id.clone(), item);
        }

        let mut orders = HashMap::new();
        for order in store.list_orders().await? {
            orders.insert(order.id.clone(), order);
        }

        Ok(Self {
            store,
            users: Arc::new(RwLock::new(users)),
            franchises: Arc::new(RwLock::new(franchises)),
            menu: Arc::new(RwLock::new(menu)),
            orders: Arc::new(RwLock::new(orders)),
        })
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        roles: Vec<UserRole>,
    ) -> Result<User> {
        if name.is_empty() || email.is_empty() {
            return Err(CrustioError::InvalidArgument(
                "name and email are required".to_string(),
            ));
        }

        {
            let users = self.users_read()?;
            if users.values().any(|user| user.email == email) {
                return Err(CrustioError::UserAlreadyExists(email.to_string()));
            }
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            roles,
            created_at: time::now(),
        };

        self.store.save_user(&user).await?;
        self.users_write()?.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users_read()?.get(id).cloned())
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users_read()?
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    pub async fn update_user(
        &self,
        id: &str,
        email: Option<String>,
        password_hash: Option<String>,
    ) -> Result<User> {
        let updated = {
            let mut users = self.users_write()?;

            if let Some(new_email) = email.as_deref()
                && users
                    .values()
                    .any(|user| user.email == new_email && user.id != id)
            {
                return Err(CrustioError::UserAlreadyExists(new_email.to_string()));
            }

            let user = users
                .get_mut(id)
                .ok_or_else(|| CrustioError::UserNotFound(id.to_string()))?;
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(password_hash) = password_hash {
                user.password_hash = password_hash;
            }
            user.clone()
        };

        self.store.save_user(&updated).await?;
        Ok(updated)
    }

    /// Adds the franchisee role for a franchise to a user, if absent.
    pub async fn grant_franchisee(&self, user_id: &str, franchise_id: &str) -> Result<()> {
        let updated = {
            let mut users = self.users_write()?;
            let user = users
                .get_mut(user_id)
                .ok_or_else(|| CrustioError::UserNotFound(user_id.to_string()))?;

            if user.is_franchise_admin(franchise_id) {
                None
            } else {
                user.roles.push(UserRole::franchisee(franchise_id));
                Some(user.clone())
            }
        };

        if let Some(user) = updated {
            self.store.save_user(&user).await?;
        }

        Ok(())
    }

    pub async fn create_franchise(&self, name: &str, admin_ids: Vec<String>) -> Result<Franchise> {
        if name.is_empty() {
            return Err(CrustioError::InvalidArgument(
                "franchise name is required".to_string(),
            ));
        }

        let franchise = Franchise {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            admin_ids,
            stores: Vec::new(),
            created_at: time::now(),
        };

        self.store.save_franchise(&franchise).await?;
        self.franchises_write()?
            .insert(franchise.id.clone(), franchise.clone());
        Ok(franchise)
    }

    pub async fn delete_franchise(&self, id: &str) -> Result<()> {
        {
            let franchises = self.franchises_read()?;
            if !franchises.contains_key(id) {
                return Err(CrustioError::FranchiseNotFound(id.to_string()));
            }
        }

        self.store.delete_franchise(id).await?;
        self.franchises_write()?.remove(id);

        // Revoke the matching franchisee role from every user.
        let mut updated_users = Vec::new();
        {
            let mut users = self.users_write()?;
            for user in users.values_mut() {
                let before = user.roles.len();
                user.roles.retain(|role| {
                    !(role.role == crate::types::Role::Franchisee
                        && role.object_id.as_deref() == Some(id))
                });
                if user.roles.len() != before {
                    updated_users.push(user.clone());
                }
            }
        }

        for user in &updated_users {
            self.store.save_user(user).await?;
        }

        Ok(())
    }

    pub fn list_franchises(&self) -> Result<Vec<Franchise>> {
        let mut franchises: Vec<Franchise> =
            self.franchises_read()?.values().cloned().collect();
        franchises.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(franchises)
    }

    pub fn get_franchise(&self, id: &str) -> Result<Option<Franchise>> {
        Ok(self.franchises_read()?.get(id).cloned())
    }

    pub fn franchises_for_user(&self, user_id: &str) -> Result<Vec<Franchise>> {
        let mut franchises: Vec<Franchise> = self
            .franchises_read()?
            .values()
            .filter(|franchise| franchise.admin_ids.iter().any(|id| id == user_id))
            .cloned()
            .collect();
        franchises.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(franchises)
    }

    pub async fn create_store(&self, franchise_id: &str, name: &str) -> Result<Store> {
        if name.is_empty() {
            return Err(CrustioError::InvalidArgument(
                "store name is required".to_string(),
            ));
        }

        let store = Store {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };

        let updated = {
            let mut franchises = self.franchises_write()?;
            let franchise = franchises
                .get_mut(franchise_id)
                .ok_or_else(|| CrustioError::FranchiseNotFound(franchise_id.to_string()))?;
            franchise.stores.push(store.clone());
            franchise.clone()
        };

        self.store.save_franchise(&updated).await?;
        Ok(store)
    }

    pub async fn delete_store(&self, franchise_id: &str, store_id: &str) -> Result<()> {
        let updated = {
            let mut franchises = self.franchises_write()?;
            let franchise = franchises
                .get_mut(franchise_id)
                .ok_or_else(|| CrustioError::FranchiseNotFound(franchise_id.to_string()))?;

            let before = franchise.stores.len();
            franchise.stores.retain(|store| store.id != store_id);
            if franchise.stores.len() == before {
                return Err(CrustioError::StoreNotFound {
                    franchise: franchise_id.to_string(),
                    store: store_id.to_string(),
                });
            }
            franchise.clone()
        };

        self.store.save_franchise(&updated).await?;
        Ok(())
    }

    pub async fn add_menu_item(
        &self,
        title: &str,
        description: &str,
        image: &str,
        price: f64,
    ) -> Result<MenuItem> {
        if title.is_empty() {
            return Err(CrustioError::InvalidArgument(
                "menu item title is required".to_string(),
            ));
        }
        if price < 0.0 {
            return Err(CrustioError::InvalidArgument(
                "menu item price must not be negative".to_string(),
            ));
        }

        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            image: image.to_string(),
            price,
        };

        self.store.save_menu_item(&item).await?;
        self.menu_write()?.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    pub fn list_menu(&self) -> Result<Vec<MenuItem>> {
        let mut items: Vec<MenuItem> = self.menu_read()?.values().cloned().collect();
        items.sort_by(|left, right| left.title.cmp(&right.title));
        Ok(items)
    }

    pub fn get_menu_item(&self, id: &str) -> Result<Option<MenuItem>> {
        Ok(self.menu_read()?.get(id).cloned())
    }

    pub async fn create_order(
        &self,
        diner_id: &str,
        franchise_id: &str,
        store_id: &str,
        items: Vec<OrderItem>,
    ) -> Result<Order> {
        if items.is_empty() {
            return Err(CrustioError::InvalidArgument(
                "order must contain at least one item".to_string(),
            ));
        }

        {
            let franchises = self.franchises_read()?;
            let franchise = franchises
                .get(franchise_id)
                .ok_or_else(|| CrustioError::FranchiseNotFound(franchise_id.to_string()))?;
            if !franchise.stores.iter().any(|store| store.id == store_id) {
                return Err(CrustioError::StoreNotFound {
                    franchise: franchise_id.to_string(),
                    store: store_id.to_string(),
                });
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            diner_id: diner_id.to_string(),
            franchise_id: franchise_id.to_string(),
            store_id: store_id.to_string(),
            items,
            created_at: time::now(),
        };

        self.store.save_order(&order).await?;
        self.orders_write()?.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    pub fn orders_for_diner(&self, diner_id: &str) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders_read()?
            .values()
            .filter(|order| order.diner_id == diner_id)
            .cloned()
            .collect();
        orders.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        Ok(orders)
    }

    fn users_read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, User>>> {
        self.users
            .read()
            .map_err(|_| CrustioError::InternalError("users lock poisoned".to_string()))
    }

    fn users_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, User>>> {
        self.users
            .write()
            .map_err(|_| CrustioError::InternalError("users lock poisoned".to_string()))
    }

    fn franchises_read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Franchise>>> {
        self.franchises
            .read()
            .map_err(|_| CrustioError::InternalError("franchises lock poisoned".to_string()))
    }

    fn franchises_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Franchise>>> {
        self.franchises
            .write()
            .map_err(|_| CrustioError::InternalError("franchises lock poisoned".to_string()))
    }

    fn menu_read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, MenuItem>>> {
        self.menu
            .read()
            .map_err(|_| CrustioError::InternalError("menu lock poisoned".to_string()))
    }

    fn menu_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, MenuItem>>> {
        self.menu
            .write()
            .map_err(|_| CrustioError::InternalError("menu lock poisoned".to_string()))
    }

    fn orders_read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Order>>> {
        self.orders
            .read()
            .map_err(|_| CrustioError::InternalError("orders lock poisoned".to_string()))
    }

    fn orders_write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Order>>> {
        self.orders
            .write()
            .map_err(|_| CrustioError::InternalError("orders lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{OrderItem, UserRole};

    use super::DbSys;

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = DbSys::new(dir.path()).await.unwrap();

        db.create_user("a", "a@test.com", "hash", vec![UserRole::diner()])
            .await
            .unwrap();
        let err = db
            .create_user("b", "a@test.com", "hash", vec![UserRole::diner()])
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UserAlreadyExists");
    }

    #[tokio::test]
    async fn store_lifecycle_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();

        let franchise_id = {
            let db = DbSys::new(dir.path()).await.unwrap();
            let franchise = db
                .create_franchise("pizza palace", vec!["admin-1".to_string()])
                .await
                .unwrap();
            db.create_store(&franchise.id, "downtown").await.unwrap();
            franchise.id
        };

        // Fresh system over the same data dir sees the persisted state.
        let db = DbSys::new(dir.path()).await.unwrap();
        let franchise = db.get_franchise(&franchise_id).unwrap().unwrap();
        assert_eq!(franchise.stores.len(), 1);
        assert_eq!(franchise.stores[0].name, "downtown");

        db.delete_store(&franchise_id, &franchise.stores[0].id)
            .await
            .unwrap();
        assert!(
            db.get_franchise(&franchise_id)
                .unwrap()
                .unwrap()
                .stores
                .is_empty()
        );
    }

    #[tokio::test]
    async fn orders_are_scoped_to_the_diner() {
        let dir = tempfile::tempdir().unwrap();
        let db = DbSys::new(dir.path()).await.unwrap();

        let franchise = db.create_franchise("slice city", Vec::new()).await.unwrap();
        let store = db.create_store(&franchise.id, "uptown").await.unwrap();

        let item = OrderItem {
            menu_id: "m1".to_string(),
            description: "Veggie".to_string(),
            price: 0.05,
        };
        db.create_order("diner-1", &franchise.id, &store.id, vec![item.clone()])
            .await
            .unwrap();
        db.create_order("diner-2", &franchise.id, &store.id, vec![item])
            .await
            .unwrap();

        assert_eq!(db.orders_for_diner("diner-1").unwrap().len(), 1);
        assert_eq!(db.orders_for_diner("diner-3").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn order_requires_known_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = DbSys::new(dir.path()).await.unwrap();

        let franchise = db.create_franchise("solo", Vec::new()).await.unwrap();
        let err = db
            .create_order(
                "diner-1",
                &franchise.id,
                "missing-store",
                vec![OrderItem {
                    menu_id: "m1".to_string(),
                    description: "Margherita".to_string(),
                    price: 0.1,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "StoreNotFound");
    }
}
