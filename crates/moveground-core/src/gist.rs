//! Remote content (gist) domain types.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A gist as returned by `GET /gists/{id}`.
///
/// `files` keeps the response's key order (serde_json `preserve_order`), so
/// "first file" means first in the document, not first alphabetically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub files: Map<String, Value>,
}

impl Gist {
    /// Content of the first file, when it carries a string `content` field.
    ///
    /// A shared playground gist always holds a single source file.
    pub fn first_file_content(&self) -> Option<String> {
        let (_, file) = self.files.iter().next()?;
        file.get("content")?.as_str().map(str::to_string)
    }
}

/// Read access to the remote content store.
#[async_trait]
pub trait GistService: Send + Sync {
    /// Fetches a gist by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Gist))`: the gist exists
    /// - `Ok(None)`: the service reported it missing (404)
    /// - `Err(_)`: transport failure or other non-success status
    async fn fetch_gist(&self, id: &str) -> Result<Option<Gist>>;
}
