mod auth;
mod cors;

pub use auth::{management_auth_middleware, SecurityConfig};
pub use cors::cors_layer;
