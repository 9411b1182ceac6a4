pub mod parser;
pub mod password;
pub mod sessions;
pub mod token;

pub use parser::parse_bearer_header;
pub use password::{hash_password, verify_password};
pub use sessions::SessionRegistry;
pub use token::{Claims, RoleClaim, TokenCodec, TokenError};
