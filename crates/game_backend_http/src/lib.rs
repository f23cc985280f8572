//! Transport-only HTTP implementation of the shared `game_backend` contract.
//!
//! This crate owns endpoint construction, JSON payload handling, and
//! status/transport error mapping for the game server's API. Session identity
//! travels in a server-set cookie, so the client keeps a cookie jar and no
//! auth code lives here. It intentionally contains no client-side game state.

pub mod client;
pub mod config;
pub mod error;
pub mod url;

pub use client::HttpGameBackend;
pub use config::GameApiConfig;
pub use error::parse_error_message;
pub use url::{join_endpoint, DEFAULT_BASE_URL};
