//! HTTP server for crease.
//!
//! Exposes the scoring command surface over REST. Every mutation requires
//! the scorer role; reads are open to anonymous callers unless configured
//! otherwise.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod router;
pub mod server;

pub use auth::{Action, AllowAllAuth, AuthProvider, Credentials, Identity, Role, TokenAuth};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use extract::Payload;
pub use handler::{AppState, LiveScorer};
pub use server::CreaseServer;
