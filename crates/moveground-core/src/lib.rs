//! Domain layer for Moveground.
//!
//! Types and traits shared by the session orchestration layer: request
//! payloads, the session state model, layout modes, page location parsing,
//! configuration, and the seams (`PlaygroundApi`, `GistService`,
//! `KeyValueStore`) that infrastructure implements.

pub mod code;
pub mod config;
pub mod error;
pub mod gist;
pub mod layout;
pub mod location;
pub mod session;
pub mod storage;

// Re-export common error type
pub use error::{MovegroundError, Result};
