//! Remote build/format/share service trait.

use super::model::{BuildOutput, CodeRequest, FormatOutput, ShareLink};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract client for the playground compilation service.
///
/// Implementations map transport failures and non-2xx responses to
/// [`MovegroundError::Network`](crate::error::MovegroundError::Network).
#[async_trait]
pub trait PlaygroundApi: Send + Sync {
    /// `POST {base}/build`
    async fn build(&self, request: &CodeRequest) -> Result<BuildOutput>;

    /// `POST {base}/format`
    async fn format(&self, request: &CodeRequest) -> Result<FormatOutput>;

    /// `POST {base}/share`
    async fn share(&self, request: &CodeRequest) -> Result<ShareLink>;
}
