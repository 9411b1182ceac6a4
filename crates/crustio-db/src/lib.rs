pub mod store;
pub mod system;
pub mod types;

pub use store::DbStore;
pub use system::DbSys;
pub use types::{Franchise, MenuItem, Order, OrderItem, Role, Store, User, UserRole};
