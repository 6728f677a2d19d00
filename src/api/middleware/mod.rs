//! API middleware components

pub mod logging;
pub mod security;
pub mod user_auth;

pub use logging::logging_middleware;
pub use security::{cors_layer, security_headers_middleware};
pub use user_auth::RequireUser;
