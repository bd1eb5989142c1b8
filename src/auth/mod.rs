pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod password;

pub use claims::{Claims, TokenKind};
pub use extractors::AuthUser;
pub use jwt::JwtKeys;
