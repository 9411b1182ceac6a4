pub mod error;
pub mod factory;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::{AppState, pizza_router};
