use std::path::{Path, PathBuf};

use crustio_common::error::{CrustioError, Result};
use tokio::fs;

use crate::types::{Franchise, MenuItem, Order, User};

/// One JSON document per entity under `<data-dir>/.crustio/`.
#[derive(Debug, Clone)]
pub struct DbStore {
    users_dir: PathBuf,
    franchises_dir: PathBuf,
    menu_dir: PathBuf,
    orders_dir: PathBuf,
}

impl DbStore {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let base = data_dir.as_ref().join(".crustio");
        let users_dir = base.join("users");
        let franchises_dir = base.join("franchises");
        let menu_dir = base.join("menu");
        let orders_dir = base.join("orders");
        fs::create_dir_all(&users_dir).await?;
        fs::create_dir_all(&franchises_dir).await?;
        fs::create_dir_all(&menu_dir).await?;
        fs::create_dir_all(&orders_dir).await?;

        Ok(Self {
            users_dir,
            franchises_dir,
            menu_dir,
            orders_dir,
        })
    }

    pub async fn save_user(&self, user: &User) -> Result<()> {
        self.write_json(self.users_dir.join(format!("{}.json", user.id)), user)
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.read_all_json::<User>(&self.users_dir).await
    }

    pub async fn save_franchise(&self, franchise: &Franchise) -> Result<()> {
        self.write_json(
            self.franchises_dir.join(format!("{}.json", franchise.id)),
            franchise,
        )
        .await
    }

    pub async fn delete_franchise(&self, id: &str) -> Result<()> {
        self.delete_if_exists(self.franchises_dir.join(format!("{id}.json")))
            .await
    }

    pub async fn list_franchises(&self) -> Result<Vec<Franchise>> {
        self.read_all_json::<Franchise>(&self.franchises_dir).await
    }

    pub async fn save_menu_item(&self, item: &MenuItem) -> Result<()> {
        self.write_json(self.menu_dir.join(format!("{}.json", item.id)), item)
            .await
    }

    pub async fn list_menu(&self) -> Result<Vec<MenuItem>> {
        self.read_all_json::<MenuItem>(&self.menu_dir).await
    }

    pub async fn save_order(&self, order: &Order) -> Result<()> {
        self.write_json(self.orders_dir.join(format!("{}.json", order.id)), order)
            .await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        self.read_all_json::<Order>(&self.orders_dir).await
    }

    async fn write_json<T: serde::Serialize>(&self, path: PathBuf, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value).map_err(|err| {
            CrustioError::InternalError(format!("failed to serialize {:?}: {err}", path))
        })?;
        fs::write(path, data).await?;
        Ok(())
    }

    async fn delete_if_exists(&self, path: PathBuf) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn read_all_json<T: serde::de::DeserializeOwned>(&self, dir: &Path) -> Result<Vec<T>> {
        let mut values = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if !is_json {
                continue;
            }

            let bytes = fs::read(&path).await?;
            let value = serde_json::from_slice::<T>(&bytes).map_err(|err| {
                CrustioError::InternalError(format!("failed to deserialize {:?}: {err}", path))
            })?;
            values.push(value);
        }
        Ok(values)
    }
}
