//! The resolution service: one event loop owning the name cache, the fetch
//! scheduler and the persistence coordinator.
//!
//! Callers hold a cheap, cloneable [`ResolutionService`] handle and talk to
//! the loop through a command channel. Resolver calls run in a `JoinSet`
//! owned by the loop and their completions come back through the same
//! `select!`, so every check-then-enqueue and completion-then-drain step is
//! serialized without locks. Each task id maps back to its handle, so a
//! task that panics still releases its slot and answers its waiters.
//!
//! Startup loads the stored snapshot before the first command is read;
//! commands sent earlier wait in the channel, so nothing is dispatched
//! before the cache is known.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::domain::errors::{ServiceResult, StoreError};
use crate::domain::models::{
    CacheConfig, CacheStats, Config, Priority, ResolveOutcome, SchedulerConfig, SchedulerState,
    Snapshot,
};
use crate::domain::ports::{Clock, Notifier, NullNotifier, Resolver, SnapshotStore, SystemClock};
use crate::services::fetch_scheduler::FetchScheduler;
use crate::services::name_cache::NameCache;
use crate::services::persistence::PersistenceCoordinator;

const COMMAND_CHANNEL_CAPACITY: usize = 1024;

enum Command {
    Request {
        handle: String,
        priority: Priority,
    },
    Resolve {
        handle: String,
        priority: Priority,
        reply: oneshot::Sender<ResolveOutcome>,
    },
    Lookup {
        handle: String,
        priority: Priority,
        reply: oneshot::Sender<Option<String>>,
    },
    Get {
        handle: String,
        reply: oneshot::Sender<Option<String>>,
    },
    Insert {
        handle: String,
        name: String,
        reply: oneshot::Sender<()>,
    },
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    Entries {
        reply: oneshot::Sender<Snapshot>,
    },
    Clear {
        reply: oneshot::Sender<()>,
    },
    FlushNow {
        reply: oneshot::Sender<()>,
    },
    SchedulerState {
        reply: oneshot::Sender<SchedulerState>,
    },
    WaitIdle {
        reply: oneshot::Sender<()>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Builder for [`ResolutionService`].
pub struct ResolutionServiceBuilder {
    cache: CacheConfig,
    scheduler: SchedulerConfig,
    debounce: Duration,
    resolver: Arc<dyn Resolver>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl ResolutionServiceBuilder {
    /// Take cache, scheduler and debounce settings from a loaded config.
    pub fn config(mut self, config: &Config) -> Self {
        self.cache = config.cache.clone();
        self.scheduler = config.scheduler.clone();
        self.debounce = config.persistence.debounce();
        self
    }

    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub const fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.scheduler.max_concurrent = max_concurrent;
        self
    }

    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the event loop. Must be called from within a Tokio runtime.
    pub fn start(self) -> ResolutionService {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let event_loop = EventLoop {
            cache: NameCache::new(&self.cache, self.clock),
            scheduler: FetchScheduler::new(self.scheduler.max_concurrent),
            persistence: PersistenceCoordinator::new(self.debounce),
            resolver: self.resolver,
            store: self.store,
            notifier: self.notifier,
            in_flight: JoinSet::new(),
            in_flight_handles: HashMap::new(),
            saves: JoinSet::new(),
            waiters: HashMap::new(),
            idle_waiters: Vec::new(),
        };

        info!(
            max_size = self.cache.max_size,
            max_concurrent = self.scheduler.max_concurrent,
            debounce_ms = u64::try_from(self.debounce.as_millis()).unwrap_or(u64::MAX),
            "starting resolution service"
        );
        tokio::spawn(event_loop.run(rx));

        ResolutionService { commands: tx }
    }
}

/// Handle to the resolution service event loop.
#[derive(Clone)]
pub struct ResolutionService {
    commands: mpsc::Sender<Command>,
}

impl ResolutionService {
    /// Builder with default configuration, no notifier and the system clock.
    pub fn builder(
        resolver: Arc<dyn Resolver>,
        store: Arc<dyn SnapshotStore>,
    ) -> ResolutionServiceBuilder {
        ResolutionServiceBuilder {
            cache: CacheConfig::default(),
            scheduler: SchedulerConfig::default(),
            debounce: Config::default().persistence.debounce(),
            resolver,
            store,
            notifier: Arc::new(NullNotifier),
            clock: Arc::new(SystemClock),
        }
    }

    /// Queue a resolution without waiting for it. Duplicates are ignored.
    pub async fn request(&self, handle: impl Into<String>, priority: Priority) -> ServiceResult<()> {
        self.commands
            .send(Command::Request {
                handle: handle.into(),
                priority,
            })
            .await?;
        Ok(())
    }

    /// Resolve a handle, waiting for the outcome.
    ///
    /// A fresh cached name is returned immediately. Otherwise the request is
    /// queued, or joins the queued or in-flight work for the same handle.
    pub async fn resolve(
        &self,
        handle: impl Into<String>,
        priority: Priority,
    ) -> ServiceResult<ResolveOutcome> {
        let handle = handle.into();
        self.call(|reply| Command::Resolve {
            handle,
            priority,
            reply,
        })
        .await
    }

    /// Cached name, or `None` after queueing a resolution.
    pub async fn lookup(
        &self,
        handle: impl Into<String>,
        priority: Priority,
    ) -> ServiceResult<Option<String>> {
        let handle = handle.into();
        self.call(|reply| Command::Lookup {
            handle,
            priority,
            reply,
        })
        .await
    }

    /// Cached name without queueing anything.
    pub async fn get(&self, handle: impl Into<String>) -> ServiceResult<Option<String>> {
        let handle = handle.into();
        self.call(|reply| Command::Get { handle, reply }).await
    }

    /// Write a known name straight into the cache.
    pub async fn insert(
        &self,
        handle: impl Into<String>,
        name: impl Into<String>,
    ) -> ServiceResult<()> {
        let handle = handle.into();
        let name = name.into();
        self.call(|reply| Command::Insert {
            handle,
            name,
            reply,
        })
        .await
    }

    pub async fn stats(&self) -> ServiceResult<CacheStats> {
        self.call(|reply| Command::Stats { reply }).await
    }

    /// Every cached entry, least recently used first.
    pub async fn entries(&self) -> ServiceResult<Snapshot> {
        self.call(|reply| Command::Entries { reply }).await
    }

    /// Empty the cache and persist the empty snapshot.
    pub async fn clear(&self) -> ServiceResult<()> {
        self.call(|reply| Command::Clear { reply }).await
    }

    /// Sweep and save now instead of waiting for the debounce timer.
    pub async fn flush_now(&self) -> ServiceResult<()> {
        self.call(|reply| Command::FlushNow { reply }).await
    }

    pub async fn scheduler_state(&self) -> ServiceResult<SchedulerState> {
        self.call(|reply| Command::SchedulerState { reply }).await
    }

    /// Wait until both lanes and the in-flight set are empty.
    pub async fn wait_idle(&self) -> ServiceResult<()> {
        self.call(|reply| Command::WaitIdle { reply }).await
    }

    /// Flush once more and stop the event loop.
    ///
    /// Resolutions still in flight are abandoned.
    pub async fn shutdown(&self) -> ServiceResult<()> {
        self.call(|reply| Command::Shutdown { reply }).await
    }

    async fn call<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> ServiceResult<T> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(command(tx)).await?;
        Ok(rx.await?)
    }
}

struct EventLoop {
    cache: NameCache,
    scheduler: FetchScheduler,
    persistence: PersistenceCoordinator,
    resolver: Arc<dyn Resolver>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    in_flight: JoinSet<Option<String>>,
    in_flight_handles: HashMap<task::Id, String>,
    saves: JoinSet<Result<(), StoreError>>,
    waiters: HashMap<String, Vec<oneshot::Sender<ResolveOutcome>>>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl EventLoop {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        self.load().await;

        loop {
            let deadline = self.persistence.deadline();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command).await {
                            break;
                        }
                    }
                    None => {
                        self.shutdown().await;
                        break;
                    }
                },
                Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
                    self.on_resolution_joined(joined);
                }
                Some(saved) = self.saves.join_next(), if !self.saves.is_empty() => {
                    self.on_save_finished(saved);
                }
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.persistence.take_due(Instant::now()) {
                        self.start_flush();
                    }
                }
            }
        }

        info!("resolution service stopped");
    }

    async fn load(&mut self) {
        match self.store.load_snapshot().await {
            Ok(snapshot) => {
                let stored = snapshot.len();
                self.cache.restore(snapshot);
                info!(stored, entries = self.cache.len(), "loaded name cache snapshot");
            }
            Err(err) => {
                warn!(error = %err, "failed to load name cache snapshot, starting empty");
            }
        }
    }

    /// Apply one command; returns `false` once the loop should stop.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Request { handle, priority } => self.enqueue(handle, priority),
            Command::Resolve {
                handle,
                priority,
                reply,
            } => {
                if let Some(name) = self.cache.get(&handle) {
                    let _ = reply.send(ResolveOutcome::Resolved(name));
                } else {
                    self.waiters.entry(handle.clone()).or_default().push(reply);
                    self.enqueue(handle, priority);
                }
            }
            Command::Lookup {
                handle,
                priority,
                reply,
            } => {
                let cached = self.cache.get(&handle);
                if cached.is_none() {
                    self.enqueue(handle, priority);
                }
                let _ = reply.send(cached);
            }
            Command::Get { handle, reply } => {
                let _ = reply.send(self.cache.get(&handle));
            }
            Command::Insert {
                handle,
                name,
                reply,
            } => {
                self.cache.put(&handle, name.as_str());
                self.notifier.on_resolved(&handle, &name);
                self.after_mutation();
                let _ = reply.send(());
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.cache.stats());
            }
            Command::Entries { reply } => {
                let _ = reply.send(self.cache.snapshot());
            }
            Command::Clear { reply } => {
                let removed = self.cache.len();
                self.cache.clear();
                self.cache.take_dirty();
                self.flush_sync().await;
                info!(removed, "cleared name cache");
                let _ = reply.send(());
            }
            Command::FlushNow { reply } => {
                self.flush_sync().await;
                let _ = reply.send(());
            }
            Command::SchedulerState { reply } => {
                let _ = reply.send(self.scheduler.state());
            }
            Command::WaitIdle { reply } => {
                if self.scheduler.is_idle() {
                    let _ = reply.send(());
                } else {
                    self.idle_waiters.push(reply);
                }
            }
            Command::Shutdown { reply } => {
                self.shutdown().await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn enqueue(&mut self, handle: String, priority: Priority) {
        if self.scheduler.request(&handle, priority) {
            debug!(handle = %handle, %priority, "queued resolution");
            self.drain();
        }
    }

    /// Dispatch queued handles until the concurrency cap is reached.
    fn drain(&mut self) {
        while let Some(handle) = self.scheduler.next_dispatch() {
            if let Some(name) = self.cache.get(&handle) {
                debug!(handle = %handle, "already cached, lookup skipped");
                self.scheduler.complete(&handle);
                self.reply_waiters(&handle, &ResolveOutcome::Resolved(name));
                continue;
            }

            if !self.cache.should_attempt(&handle) {
                debug!(handle = %handle, "backing off, request dropped");
                self.scheduler.complete(&handle);
                self.reply_waiters(&handle, &ResolveOutcome::Skipped);
                continue;
            }

            self.spawn_resolution(handle);
        }

        if self.scheduler.is_idle() {
            for waiter in self.idle_waiters.drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    fn spawn_resolution(&mut self, handle: String) {
        let resolver = Arc::clone(&self.resolver);
        debug!(handle = %handle, in_flight = self.scheduler.in_flight_len(), "dispatching resolution");

        let task_handle = handle.clone();
        let abort = self.in_flight.spawn(async move {
            match resolver.resolve(&task_handle).await {
                Ok(name) => name
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty()),
                Err(err) => {
                    debug!(handle = %task_handle, error = %err, "resolver failed");
                    None
                }
            }
        });
        self.in_flight_handles.insert(abort.id(), handle);
    }

    fn on_resolution_joined(&mut self, joined: Result<(task::Id, Option<String>), JoinError>) {
        let (id, name) = match joined {
            Ok((id, name)) => (id, name),
            Err(err) => {
                if err.is_panic() {
                    warn!(error = %err, "resolver panicked");
                } else {
                    warn!(error = %err, "resolution task did not complete");
                }
                (err.id(), None)
            }
        };

        match self.in_flight_handles.remove(&id) {
            Some(handle) => self.finish_resolution(handle, name),
            None => warn!(task = %id, "finished resolution task has no handle"),
        }
    }

    fn finish_resolution(&mut self, handle: String, name: Option<String>) {
        self.scheduler.complete(&handle);

        let outcome = match name {
            Some(name) => {
                debug!(handle = %handle, name = %name, "resolved");
                self.cache.put(&handle, name.as_str());
                self.notifier.on_resolved(&handle, &name);
                ResolveOutcome::Resolved(name)
            }
            None => {
                self.cache.record_failure(&handle);
                ResolveOutcome::Failed
            }
        };

        self.reply_waiters(&handle, &outcome);
        self.after_mutation();
        self.drain();
    }

    fn reply_waiters(&mut self, handle: &str, outcome: &ResolveOutcome) {
        if let Some(waiters) = self.waiters.remove(handle) {
            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        }
    }

    fn after_mutation(&mut self) {
        if self.cache.take_dirty() {
            self.persistence.on_mutation(Instant::now());
        }
    }

    /// Sweep and hand the snapshot to a background save.
    fn start_flush(&mut self) {
        let swept = self.cache.sweep_expired();
        let snapshot = self.cache.snapshot();
        debug!(entries = snapshot.len(), swept, "flushing name cache");

        let store = Arc::clone(&self.store);
        self.saves
            .spawn(async move { store.save_snapshot(snapshot).await });
    }

    fn on_save_finished(&mut self, saved: Result<Result<(), StoreError>, JoinError>) {
        match saved {
            Ok(Ok(())) => debug!("name cache snapshot saved"),
            Ok(Err(err)) => warn!(error = %err, "failed to save name cache snapshot"),
            Err(err) => warn!(error = %err, "snapshot save task did not complete"),
        }
        self.persistence.flush_finished(Instant::now());
    }

    /// Sweep and save in place, after any background save has landed.
    async fn flush_sync(&mut self) {
        while let Some(saved) = self.saves.join_next().await {
            self.on_save_finished(saved);
        }
        self.persistence.cancel_pending();

        let swept = self.cache.sweep_expired();
        let snapshot = self.cache.snapshot();
        let entries = snapshot.len();
        match self.store.save_snapshot(snapshot).await {
            Ok(()) => debug!(entries, swept, "name cache snapshot saved"),
            Err(err) => warn!(error = %err, "failed to save name cache snapshot"),
        }
    }

    async fn shutdown(&mut self) {
        self.flush_sync().await;
        self.in_flight.abort_all();
        info!(entries = self.cache.len(), "resolution service shutting down");
    }
}
