//! Bearer token authentication.

pub mod extractor;
pub mod jwt;
pub mod layer;
pub mod types;

pub use extractor::{AdminAuth, Auth, SuperAdminAuth};
pub use jwt::{decode_token, encode_token};
pub use layer::{AuthLayer, AuthMiddleware};
pub use types::{AuthUser, Claims, TokenType, ROLE_ADMIN, ROLE_SUPER_ADMIN, ROLE_USER};
