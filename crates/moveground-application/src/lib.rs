//! Application layer for Moveground.
//!
//! This crate coordinates the domain types of `moveground-core` with the
//! injected services: request memoization, debounced buffer persistence,
//! mount-time imports, layout tracking and the session orchestrator that
//! ties them together.

pub mod import_resolver;
pub mod layout_controller;
pub mod persistence;
pub mod request_cache;
pub mod session;

#[cfg(test)]
mod test_support;

pub use import_resolver::RemoteImportResolver;
pub use layout_controller::{LayoutModeController, LayoutObserver};
pub use persistence::{DebouncedPersistence, PersistenceErrorHandler};
pub use request_cache::{CachedResponse, RequestCache};
pub use session::{ImportOutcome, Mount, OperationOutcome, SessionFactory, SessionOrchestrator};
