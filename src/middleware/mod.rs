mod auth;
mod rate_limit;

pub use auth::{AuthMiddleware, AUTH_COOKIE};
pub use rate_limit::RateLimitMiddleware;

pub(crate) use auth::request_token;
