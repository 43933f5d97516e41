//! Hand-written mocks shared by the unit tests of this crate.

use async_trait::async_trait;
use moveground_core::code::{
    BuildOutput, CodeRequest, FormatOutput, OperationKind, PlaygroundApi, ShareLink,
};
use moveground_core::error::{MovegroundError, Result};
use moveground_core::gist::{Gist, GistService};
use moveground_core::storage::KeyValueStore;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::watch;

/// Holds one mocked call in flight until released.
pub struct Gate {
    tx: watch::Sender<bool>,
}

impl Gate {
    pub fn release(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Default)]
struct Script {
    build: VecDeque<BuildOutput>,
    format: VecDeque<FormatOutput>,
    share: VecDeque<ShareLink>,
    failures: HashMap<OperationKind, VecDeque<MovegroundError>>,
    gates: HashMap<OperationKind, VecDeque<watch::Receiver<bool>>>,
    calls: HashMap<OperationKind, usize>,
    requests: Vec<(OperationKind, CodeRequest)>,
}

/// Mock playground service.
///
/// Unscripted calls answer with `stdout: "ok"` for build, the request's own
/// source for format, and a fixed share link.
#[derive(Default)]
pub struct MockPlaygroundApi {
    script: Mutex<Script>,
}

impl MockPlaygroundApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response for every unscripted build call from now on.
    pub fn set_build(&self, output: BuildOutput) {
        let mut script = self.script.lock().unwrap();
        script.build.clear();
        script.build.push_back(output);
    }

    /// Queues a response for the next build call.
    pub fn push_build(&self, output: BuildOutput) {
        self.script.lock().unwrap().build.push_back(output);
    }

    /// Queues a link for the next share call.
    pub fn push_share(&self, link: ShareLink) {
        self.script.lock().unwrap().share.push_back(link);
    }

    pub fn set_format(&self, output: FormatOutput) {
        let mut script = self.script.lock().unwrap();
        script.format.clear();
        script.format.push_back(output);
    }

    /// Makes the next `kind` call fail with `error`.
    pub fn fail_next(&self, kind: OperationKind, error: MovegroundError) {
        self.script
            .lock()
            .unwrap()
            .failures
            .entry(kind)
            .or_default()
            .push_back(error);
    }

    /// Holds the next `kind` call until the returned gate is released.
    pub fn hold(&self, kind: OperationKind) -> Gate {
        let (tx, rx) = watch::channel(false);
        self.script
            .lock()
            .unwrap()
            .gates
            .entry(kind)
            .or_default()
            .push_back(rx);
        Gate { tx }
    }

    pub fn calls(&self, kind: OperationKind) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn requests(&self) -> Vec<(OperationKind, CodeRequest)> {
        self.script.lock().unwrap().requests.clone()
    }

    /// Records the call, picks its scripted response, then waits on the
    /// call's gate if one was queued.
    async fn call<T>(
        &self,
        kind: OperationKind,
        request: &CodeRequest,
        respond: impl FnOnce(&mut Script) -> T,
    ) -> Result<T> {
        let (gate, outcome) = {
            let mut script = self.script.lock().unwrap();
            *script.calls.entry(kind).or_insert(0) += 1;
            script.requests.push((kind, request.clone()));
            let gate = script.gates.get_mut(&kind).and_then(VecDeque::pop_front);
            let outcome = match script.failures.get_mut(&kind).and_then(VecDeque::pop_front) {
                Some(error) => Err(error),
                None => Ok(respond(&mut *script)),
            };
            (gate, outcome)
        };
        if let Some(mut gate) = gate {
            let _ = gate.wait_for(|released| *released).await;
        }
        outcome
    }
}

#[async_trait]
impl PlaygroundApi for MockPlaygroundApi {
    async fn build(&self, request: &CodeRequest) -> Result<BuildOutput> {
        self.call(OperationKind::Build, request, |script| {
            next(&mut script.build).unwrap_or(BuildOutput {
                stdout: "ok".into(),
                stderr: String::new(),
            })
        })
        .await
    }

    async fn format(&self, request: &CodeRequest) -> Result<FormatOutput> {
        let echo = FormatOutput {
            sources: request.sources.clone(),
        };
        self.call(OperationKind::Format, request, |script| {
            script.format.front().cloned().unwrap_or(echo)
        })
        .await
    }

    async fn share(&self, request: &CodeRequest) -> Result<ShareLink> {
        self.call(OperationKind::Share, request, |script| {
            next(&mut script.share).unwrap_or(ShareLink {
                id: "gist-1".into(),
                url: "https://gist.github.com/gist-1".into(),
            })
        })
        .await
    }
}

/// Pops a queued response, keeping the last one for later calls.
fn next<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

/// Mock gist service. Unknown ids resolve to `Ok(None)` (a 404).
#[derive(Default)]
pub struct MockGistService {
    gists: Mutex<HashMap<String, Result<Option<Gist>>>>,
    calls: Mutex<usize>,
}

impl MockGistService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(self, id: &str, filename: &str, content: &str) -> Self {
        self.gists
            .lock()
            .unwrap()
            .insert(id.to_string(), Ok(Some(gist(filename, content))));
        self
    }

    pub fn with_result(self, id: &str, result: Result<Option<Gist>>) -> Self {
        self.gists.lock().unwrap().insert(id.to_string(), result);
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

pub fn gist(filename: &str, content: &str) -> Gist {
    let mut files = serde_json::Map::new();
    files.insert(
        filename.to_string(),
        serde_json::json!({ "filename": filename, "content": content }),
    );
    Gist {
        id: Some("gist".into()),
        files,
    }
}

#[async_trait]
impl GistService for MockGistService {
    async fn fetch_gist(&self, id: &str) -> Result<Option<Gist>> {
        *self.calls.lock().unwrap() += 1;
        self.gists
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or(Ok(None))
    }
}

/// A storage write observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    Set(String, String),
    Remove(String),
}

/// Key/value store that records every write.
#[derive(Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<Write>>,
    failing: Mutex<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn check(&self) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(MovegroundError::storage("disk full"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.entry(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.writes
            .lock()
            .unwrap()
            .push(Write::Set(key.to_string(), value.to_string()));
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check()?;
        self.writes.lock().unwrap().push(Write::Remove(key.to_string()));
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
