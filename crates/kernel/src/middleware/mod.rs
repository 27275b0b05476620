//! HTTP middleware components.
//!
//! Provides origin enforcement and bearer token authentication layers.

pub mod bearer_auth;
pub mod cors;

pub use bearer_auth::authenticate_bearer_token;
pub use cors::{CorsPolicy, enforce_origin};
