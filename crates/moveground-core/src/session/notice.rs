//! Transient user-visible notices.

use crate::code::OperationKind;
use serde::{Deserialize, Serialize};

/// A non-fatal event the rendering surface should show briefly (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    /// The share id on the page did not resolve to any source
    ImportNotFound { share_id: String },
    /// A remote operation failed; the session is unchanged
    OperationFailed { kind: OperationKind, message: String },
    /// The settled buffer could not be written to durable storage
    PersistenceFailed { message: String },
}

impl Notice {
    /// Short text suitable for a toast.
    pub fn message(&self) -> String {
        match self {
            Self::ImportNotFound { .. } => "The specified gist was not found".to_string(),
            Self::OperationFailed { kind, message } => format!("{} failed: {}", kind, message),
            Self::PersistenceFailed { message } => format!("Could not save code: {}", message),
        }
    }
}
