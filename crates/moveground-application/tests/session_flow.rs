//! End-to-end session flows against mocked services.

use async_trait::async_trait;
use moveground_application::{ImportOutcome, OperationOutcome, SessionFactory};
use moveground_core::code::{BuildOutput, CodeRequest, FormatOutput, PlaygroundApi, ShareLink};
use moveground_core::config::EditorConfig;
use moveground_core::error::Result;
use moveground_core::gist::{Gist, GistService};
use moveground_core::layout::LayoutMode;
use moveground_core::location::PageLocation;
use moveground_core::session::{FORMAT_SUCCESS_MESSAGE, Notice, PendingOperation};
use moveground_core::storage::KeyValueStore;
use moveground_infrastructure::InMemoryKeyValueStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TEMP_MODULE: &str = "module temp::temp; public fun foo(): bool { true }";

/// Playground service answering like the real one, with an optional delay.
#[derive(Default)]
struct MockApi {
    delay: Option<Duration>,
    builds: AtomicUsize,
    formats: AtomicUsize,
}

impl MockApi {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PlaygroundApi for MockApi {
    async fn build(&self, _request: &CodeRequest) -> Result<BuildOutput> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        Ok(BuildOutput {
            stdout: "ok".into(),
            stderr: String::new(),
        })
    }

    async fn format(&self, _request: &CodeRequest) -> Result<FormatOutput> {
        self.formats.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let mut sources = BTreeMap::new();
        sources.insert("temp".to_string(), "formatted".to_string());
        Ok(FormatOutput { sources })
    }

    async fn share(&self, request: &CodeRequest) -> Result<ShareLink> {
        Ok(ShareLink {
            id: format!("share-{}", request.name),
            url: format!("https://gist.github.com/share-{}", request.name),
        })
    }
}

/// Gist service where every id is missing.
#[derive(Default)]
struct EmptyGists {
    calls: AtomicUsize,
}

#[async_trait]
impl GistService for EmptyGists {
    async fn fetch_gist(&self, _id: &str) -> Result<Option<Gist>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

/// In-memory store counting writes.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryKeyValueStore,
    writes: AtomicUsize,
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key).await
    }
}

fn factory(api: Arc<MockApi>, gists: Arc<EmptyGists>, store: Arc<CountingStore>) -> SessionFactory {
    SessionFactory::new(api, gists, store, EditorConfig::default())
}

#[tokio::test]
async fn build_flow_produces_combined_output() {
    let api = Arc::new(MockApi::default());
    let factory = factory(api.clone(), Arc::default(), Arc::default());
    let session = factory.create_session(Some(TEMP_MODULE)).await;

    assert_eq!(session.build(true).await, OperationOutcome::Applied);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.output.as_deref(), Some("ok\n"));
    assert_eq!(snapshot.pending_operation, PendingOperation::None);
    assert!(snapshot.show_output_panel());
}

#[tokio::test]
async fn format_flow_replaces_buffer() {
    let api = Arc::new(MockApi::default());
    let factory = factory(api.clone(), Arc::default(), Arc::default());
    let session = factory.create_session(Some(TEMP_MODULE)).await;

    session.format().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.buffer, "formatted");
    assert_eq!(snapshot.output.as_deref(), Some(FORMAT_SUCCESS_MESSAGE));
}

#[tokio::test]
async fn missing_share_id_leaves_buffer_and_notifies_once() {
    let gists = Arc::new(EmptyGists::default());
    let factory = factory(Arc::default(), gists.clone(), Arc::default());
    let session = factory.create_session(Some(TEMP_MODULE)).await;
    let mut notices = session.subscribe_notices();

    let location = PageLocation::parse("https://playmove.dev/?share_id=abc").unwrap();
    let outcome = session.mount(&location).outcome().await;

    assert_eq!(
        outcome,
        ImportOutcome::NotFound {
            share_id: "abc".into()
        }
    );
    assert_eq!(session.snapshot().buffer, TEMP_MODULE);
    assert_eq!(
        notices.try_recv().unwrap(),
        Notice::ImportNotFound {
            share_id: "abc".into()
        }
    );
    assert!(notices.try_recv().is_err());
    assert_eq!(gists.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_identical_builds_share_one_call() {
    let api = Arc::new(MockApi::with_delay(Duration::from_millis(250)));
    let factory = factory(api.clone(), Arc::default(), Arc::default());
    let first = factory.create_session(Some(TEMP_MODULE)).await;
    let second = factory.create_session(Some(TEMP_MODULE)).await;

    let (a, b) = tokio::join!(first.build(true), second.build(true));

    assert!(a.is_applied());
    assert!(b.is_applied());
    assert_eq!(api.builds.load(Ordering::SeqCst), 1);
    assert_eq!(first.snapshot().output, second.snapshot().output);
}

#[tokio::test(start_paused = true)]
async fn typing_burst_is_persisted_once() {
    let store = Arc::new(CountingStore::default());
    let factory = factory(Arc::default(), Arc::default(), store.clone());
    let session = factory.create_session(Some("")).await;

    let mut text = String::new();
    for ch in "module a::b;".chars() {
        text.push(ch);
        session.edit_buffer(text.clone());
        tokio::time::advance(Duration::from_millis(50)).await;
    }
    assert_eq!(store.writes.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_millis(1000)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    assert_eq!(
        store.get("moveground.code").await.unwrap().as_deref(),
        Some("module a::b;")
    );
}

#[tokio::test]
async fn restored_buffer_survives_a_new_session() {
    let store = Arc::new(CountingStore::default());
    let factory = factory(Arc::default(), Arc::default(), store.clone());

    let first = factory.create_session(None).await;
    first.edit_buffer("module kept::kept;");
    first.flush_persistence().await;
    first.shutdown();

    let second = factory.create_session(None).await;
    assert_eq!(second.snapshot().buffer, "module kept::kept;");
}

#[tokio::test]
async fn resize_sequence_around_breakpoint() {
    let factory = factory(Arc::default(), Arc::default(), Arc::default());
    let session = factory.create_session(None).await;

    let modes: Vec<_> = [800.0, 599.0, 600.0, 599.5, 1024.0]
        .into_iter()
        .map(|width| session.on_resize(width))
        .collect();

    assert_eq!(
        modes,
        vec![
            LayoutMode::Horizontal,
            LayoutMode::Vertical,
            LayoutMode::Horizontal,
            LayoutMode::Vertical,
            LayoutMode::Horizontal,
        ]
    );
}
