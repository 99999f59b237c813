//! Authoritative match server for remote timed chess
//!
//! ## Module Organization
//!
//! - `clock` - Per-match countdowns, increments and penalties
//! - `session` - The match state machine
//! - `actor` - One task per match serialising its events
//! - `registry` - Code to match lookup, code minting, cleanup
//! - `gateway` - axum routes and the WebSocket protocol loop
//! - `config` - Command-line and environment configuration

pub mod actor;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod session;

pub use error::{MatchError, ServerResult};
pub use registry::MatchRegistry;
