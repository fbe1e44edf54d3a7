pub mod admin_auth;
pub mod request_id;

pub use admin_auth::{admin_token_middleware, AdminRouterExt, AdminToken};
pub use request_id::request_id_middleware;
