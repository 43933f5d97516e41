use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use moveground_core::code::{
    BuildOutput, CodeRequest, OperationKind, PlaygroundApi, ShareLink,
};
use moveground_core::error::{MovegroundError, Result};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A memoized service response.
///
/// Format responses are stored already reduced to the formatted text for the
/// requested module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedResponse {
    Build(BuildOutput),
    Format(String),
    Share(ShareLink),
}

type SharedCall = Shared<BoxFuture<'static, Result<Arc<CachedResponse>>>>;

struct Inner {
    api: Arc<dyn PlaygroundApi>,
    entries: Mutex<LruCache<String, Arc<CachedResponse>>>,
    in_flight: Mutex<HashMap<String, SharedCall>>,
}

/// Memoizes build/format/share calls keyed by the canonical request.
///
/// - A populated entry is returned without a network call, for every kind
///   including share.
/// - Concurrent identical requests share one network call.
/// - Failures are never cached; the next identical request retries.
///
/// Entries are held in an LRU bounded by the configured capacity. Clones
/// share the same entries, so one cache can serve several sessions.
#[derive(Clone)]
pub struct RequestCache {
    inner: Arc<Inner>,
}

impl RequestCache {
    /// Creates a cache holding at most `capacity` entries. `0` disables
    /// eviction.
    pub fn new(api: Arc<dyn PlaygroundApi>, capacity: usize) -> Self {
        let entries = match NonZeroUsize::new(capacity) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            inner: Arc::new(Inner {
                api,
                entries: Mutex::new(entries),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the memoized response for `(kind, request)`, issuing the
    /// network call only when no entry exists and none is in flight.
    pub async fn execute(
        &self,
        kind: OperationKind,
        request: &CodeRequest,
    ) -> Result<Arc<CachedResponse>> {
        let key = request.request_key(kind)?;

        let call = {
            let mut in_flight = self.inner.in_flight.lock().await;

            // Checked under the in-flight lock: a completing call stores its
            // entry before leaving `in_flight`, so one of the two is visible.
            if let Some(hit) = self.inner.entries.lock().await.get(&key).cloned() {
                tracing::debug!(target: "request_cache", %kind, "Cache hit");
                return Ok(hit);
            }

            if let Some(existing) = in_flight.get(&key) {
                tracing::debug!(target: "request_cache", %kind, "Joining in-flight request");
                existing.clone()
            } else {
                let call = Self::spawn_call(self.inner.clone(), kind, key.clone(), request.clone());
                in_flight.insert(key, call.clone());
                call
            }
        };

        call.await
    }

    /// Runs the service call on its own task so it completes, and stores or
    /// drops its entry, even when every caller stops waiting.
    fn spawn_call(
        inner: Arc<Inner>,
        kind: OperationKind,
        key: String,
        request: CodeRequest,
    ) -> SharedCall {
        let task = tokio::spawn(async move {
            tracing::debug!(target: "request_cache", %kind, module = %request.name, "Cache miss, calling service");
            let result = match kind {
                OperationKind::Build => inner.api.build(&request).await.map(CachedResponse::Build),
                OperationKind::Format => inner
                    .api
                    .format(&request)
                    .await
                    .map(|output| CachedResponse::Format(output.source_for(&request.name))),
                OperationKind::Share => inner.api.share(&request).await.map(CachedResponse::Share),
            }
            .map(Arc::new);

            match &result {
                Ok(response) => {
                    inner.entries.lock().await.put(key.clone(), response.clone());
                }
                Err(e) => {
                    tracing::warn!(target: "request_cache", %kind, "Request failed, not cached: {}", e);
                }
            }
            inner.in_flight.lock().await.remove(&key);

            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(MovegroundError::internal(format!(
                    "{} request task failed: {}",
                    kind, e
                )))
            })
        }
        .boxed()
        .shared()
    }

    /// `/build`, through the cache.
    pub async fn build(&self, request: &CodeRequest) -> Result<BuildOutput> {
        match self.execute(OperationKind::Build, request).await?.as_ref() {
            CachedResponse::Build(output) => Ok(output.clone()),
            other => Err(mismatch(OperationKind::Build, other)),
        }
    }

    /// `/format`, through the cache. Returns the formatted module text.
    pub async fn format(&self, request: &CodeRequest) -> Result<String> {
        match self.execute(OperationKind::Format, request).await?.as_ref() {
            CachedResponse::Format(source) => Ok(source.clone()),
            other => Err(mismatch(OperationKind::Format, other)),
        }
    }

    /// `/share`, through the cache.
    pub async fn share(&self, request: &CodeRequest) -> Result<ShareLink> {
        match self.execute(OperationKind::Share, request).await?.as_ref() {
            CachedResponse::Share(link) => Ok(link.clone()),
            other => Err(mismatch(OperationKind::Share, other)),
        }
    }

    /// Whether a response for `(kind, request)` is memoized.
    pub async fn contains(&self, kind: OperationKind, request: &CodeRequest) -> Result<bool> {
        let key = request.request_key(kind)?;
        Ok(self.inner.entries.lock().await.contains(&key))
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.lock().await.is_empty()
    }

    /// Drops every memoized response. In-flight calls are unaffected.
    pub async fn clear(&self) {
        self.inner.entries.lock().await.clear();
    }
}

fn mismatch(expected: OperationKind, found: &CachedResponse) -> MovegroundError {
    MovegroundError::internal(format!(
        "Cached response for {} has unexpected shape: {:?}",
        expected, found
    ))
}
