pub mod jwt;
pub mod password;
mod types;

pub use jwt::JwtKeys;
pub use types::{Claims, Role, TokenResponse};
