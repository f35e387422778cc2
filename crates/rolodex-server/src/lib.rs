//! HTTP server for rolodex.
//!
//! Exposes the user service as a small REST API under `/api/v1/users`.

pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::RolodexServer;
