//! Middleware stack for the Claims Gateway.
//!
//! Layer order: Request → Trace → CORS → Timeout → BodyLimit → Handler

pub mod auth;
pub mod cors;
pub mod timeout;

pub use auth::bearer_token;
pub use cors::create_cors_layer;
pub use timeout::TimeoutLayer;
