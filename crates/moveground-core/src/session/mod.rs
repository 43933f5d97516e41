//! Session domain module.
//!
//! This module contains the session state model and the notices a session
//! raises. The orchestration that mutates a session across asynchronous
//! events lives in `moveground-application`.
//!
//! # Module Structure
//!
//! - `model`: Core session state (`Session`) and its pure transitions
//! - `notice`: Transient user-visible notices (`Notice`)

mod model;
mod notice;

// Re-export public API
pub use model::{
    ActiveView, FORMAT_FAILURE_MESSAGE, FORMAT_SUCCESS_MESSAGE, OUTPUT_PLACEHOLDER,
    PendingOperation, Session, ShareState, WELCOME_CODE,
};
pub use notice::Notice;
