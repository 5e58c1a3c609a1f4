//! # Weight Map Networking Layer
//!
//! Tokio-based client transport for a weight map server.
//!
//! ## Modules
//!
//! - [`config`] - Session configuration options
//! - [`session`] - One serialized TCP connection and the continuation protocol
//! - [`client`] - Typed operations and the [`MapService`] trait

pub mod client;
pub mod config;
pub mod session;

// Re-export commonly used items
pub use client::{MapService, WeightMapClient};
pub use config::{AckMode, SessionConfig};
pub use session::{Session, SessionStats};
