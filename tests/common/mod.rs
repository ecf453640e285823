//! Common test utilities for integration tests
//!
//! Provides a scriptable resolver, a recording snapshot store and helpers
//! shared by the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use handle_resolver::{ResolveError, Resolver, Snapshot, SnapshotStore, StoreError};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll `predicate` every 10ms until it holds or `timeout_ms` elapses.
pub async fn wait_for<F>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> bool,
{
    let start = tokio::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    predicate()
}

#[derive(Default)]
struct Script {
    names: HashMap<String, String>,
    errors: HashSet<String>,
    panics: HashSet<String>,
    default_name: bool,
}

/// Scriptable resolver that records every call.
///
/// Unknown handles resolve to `None` unless `echo_names` is set. A gated
/// resolver holds each call until a permit is released, which lets tests
/// observe queued and in-flight state.
#[derive(Default)]
pub struct MockResolver {
    script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver whose calls block until [`release`](Self::release) is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Resolve every unscripted handle to `"Name of <handle>"`.
    pub fn echo_names(self) -> Self {
        self.script.lock().unwrap().default_name = true;
        self
    }

    pub fn with_name(self, handle: &str, name: &str) -> Self {
        self.set_name(handle, name);
        self
    }

    pub fn with_error(self, handle: &str) -> Self {
        self.script.lock().unwrap().errors.insert(handle.to_string());
        self
    }

    pub fn with_panic(self, handle: &str) -> Self {
        self.script.lock().unwrap().panics.insert(handle.to_string());
        self
    }

    pub fn set_name(&self, handle: &str, name: &str) {
        let mut script = self.script.lock().unwrap();
        script.errors.remove(handle);
        script.names.insert(handle.to_string(), name.to_string());
    }

    /// Let `n` gated calls finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, handle: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|h| *h == handle).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls currently inside `resolve`.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent calls observed.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Resolver for MockResolver {
    async fn resolve(&self, handle: &str) -> Result<Option<String>, ResolveError> {
        self.calls.lock().unwrap().push(handle.to_string());
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        let _guard = ActiveGuard(&self.active);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let script = self.script.lock().unwrap();
        if script.panics.contains(handle) {
            drop(script);
            panic!("scripted resolver panic for {handle}");
        }
        if script.errors.contains(handle) {
            return Err(ResolveError::Other(format!("scripted failure for {handle}")));
        }
        if let Some(name) = script.names.get(handle) {
            return Ok(Some(name.clone()));
        }
        Ok(script.default_name.then(|| format!("Name of {handle}")))
    }
}

/// Snapshot store that keeps every save for inspection.
#[derive(Default)]
pub struct RecordingStore {
    initial: Snapshot,
    fail_load: bool,
    fail_save: bool,
    load_delay: Option<Duration>,
    save_gate: Option<Semaphore>,
    saves: Mutex<Vec<Snapshot>>,
    saves_started: AtomicUsize,
    loads: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            initial: snapshot,
            ..Self::default()
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    /// Make `load_snapshot` take `delay` before returning.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// Hold every save until [`release_saves`](Self::release_saves) is called.
    pub fn gated_saves(mut self) -> Self {
        self.save_gate = Some(Semaphore::new(0));
        self
    }

    pub fn release_saves(&self, n: usize) {
        if let Some(gate) = &self.save_gate {
            gate.add_permits(n);
        }
    }

    /// Saves that have begun, including ones still held by the gate.
    pub fn saves_started(&self) -> usize {
        self.saves_started.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> Vec<Snapshot> {
        self.saves.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn last_save(&self) -> Option<Snapshot> {
        self.saves.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SnapshotStore for RecordingStore {
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_load {
            return Err(StoreError::Io(std::io::Error::other("scripted load failure")));
        }
        Ok(self.initial.clone())
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        self.saves_started.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.save_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_save {
            return Err(StoreError::Io(std::io::Error::other("scripted save failure")));
        }
        self.saves.lock().unwrap().push(snapshot);
        Ok(())
    }
}

/// Resolver and store as the trait objects the service builder expects.
pub fn ports(
    resolver: &Arc<MockResolver>,
    store: &Arc<RecordingStore>,
) -> (Arc<dyn Resolver>, Arc<dyn SnapshotStore>) {
    (
        Arc::clone(resolver) as Arc<dyn Resolver>,
        Arc::clone(store) as Arc<dyn SnapshotStore>,
    )
}
