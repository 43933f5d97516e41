use moveground_core::error::{MovegroundError, Result};
use moveground_core::gist::GistService;
use moveground_core::location::ImportReference;
use std::sync::Arc;

/// Turns an [`ImportReference`] into source text.
///
/// Fragments carry the code literally and resolve without a fetch. Share ids
/// are looked up on the gist service and yield the first file's content.
/// Resolution is attempted once; nothing is retried.
pub struct RemoteImportResolver {
    gists: Arc<dyn GistService>,
}

impl RemoteImportResolver {
    pub fn new(gists: Arc<dyn GistService>) -> Self {
        Self { gists }
    }

    /// Resolves `reference` to source text.
    ///
    /// # Errors
    ///
    /// `ImportNotFound` when the gist is missing, has no readable file, or
    /// the service could not be reached.
    pub async fn resolve(&self, reference: &ImportReference) -> Result<String> {
        match reference {
            ImportReference::Fragment(code) => Ok(code.clone()),
            ImportReference::ShareId(share_id) => self.fetch(share_id).await,
        }
    }

    async fn fetch(&self, share_id: &str) -> Result<String> {
        tracing::debug!(target: "import", share_id, "Resolving shared code");

        let gist = match self.gists.fetch_gist(share_id).await {
            Ok(gist) => gist,
            Err(e) => {
                tracing::warn!(target: "import", share_id, "Gist fetch failed: {}", e);
                None
            }
        };

        match gist.and_then(|gist| gist.first_file_content()) {
            Some(content) => {
                tracing::info!(target: "import", share_id, "Imported shared code");
                Ok(content)
            }
            None => {
                tracing::warn!(target: "import", share_id, "Shared code not found");
                Err(MovegroundError::import_not_found(share_id))
            }
        }
    }
}
