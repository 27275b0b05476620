//! fprints Kernel Library
//!
//! HTTP service that deletes uploaded blueprint images from CDN storage on
//! behalf of signed-in users. The `fprints` binary is the entry point for
//! running the server; the library is exposed for integration testing.

pub mod config;
pub mod error;
pub mod file;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{ApiResponse, DeleteError};
pub use state::AppState;
