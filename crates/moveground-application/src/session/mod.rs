//! Session orchestration.
//!
//! [`SessionOrchestrator`] owns one live [`Session`](moveground_core::session::Session)
//! and is the only thing that mutates it. [`SessionFactory`] wires the
//! orchestrator to its services and restores the persisted buffer.

mod factory;
mod orchestrator;
mod sequence;

pub use factory::SessionFactory;
pub use orchestrator::{ImportOutcome, Mount, OperationOutcome, SessionOrchestrator};
pub use sequence::{SequenceGuard, Ticket};
