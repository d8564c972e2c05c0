//! FeedEngine - orchestration of refresh, pagination, and teardown.
//!
//! The engine is the single logical owner of the displayed photo list.
//! All state mutation goes through its session lock; the feed and the
//! store are the only suspension points. Superseded operations are
//! detected by a generation number captured at operation start and
//! re-checked at every resumption point - a stale result is discarded,
//! never applied. Cancellation is cooperative: effects that committed
//! before the check stand (store writes are idempotent upserts).

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use photofeed_core::{LoadMoreOutcome, NotifyGate, RefreshFailure, RefreshOutcome, SessionState};
use photofeed_store::PhotoStore;
use photofeed_types::{FeedError, PageRequest, PhotoRecord};

use crate::config::EngineConfig;
use crate::notify::{NoticeKind, NotificationSink};
use crate::source::FeedSource;

/// Text surfaced with a success signal.
const FEED_UPDATED_TEXT: &str = "photo feed updated";

/// Point-in-time view of the engine's session, published to watchers
/// after every state change.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    /// Displayed photos, duplicate-free, in display order.
    pub photos: Vec<PhotoRecord>,
    /// Last applied page number.
    pub current_page: u32,
    /// Whether the feed may have further pages.
    pub has_more: bool,
    /// Whether a refresh is in flight.
    pub is_loading: bool,
    /// Whether a pagination fetch is in flight.
    pub is_loading_more: bool,
    /// Blocking or pagination error, if any.
    pub last_error: Option<FeedError>,
}

impl FeedSnapshot {
    fn of(session: &SessionState) -> Self {
        Self {
            photos: session.photos().to_vec(),
            current_page: session.current_page(),
            has_more: session.has_more(),
            is_loading: session.is_loading(),
            is_loading_more: session.is_loading_more(),
            last_error: session.last_error().cloned(),
        }
    }
}

impl Default for FeedSnapshot {
    fn default() -> Self {
        Self::of(&SessionState::new())
    }
}

#[derive(Default)]
struct PendingTasks {
    /// Scheduled (not yet past the gate) load-more fetch.
    debounce: Option<JoinHandle<()>>,
    /// Trailing success signal deferred by the throttle.
    deferred_notify: Option<JoinHandle<()>>,
}

struct EngineInner<F, S, N> {
    source: F,
    store: S,
    sink: N,
    config: EngineConfig,
    session: Mutex<SessionState>,
    tasks: StdMutex<PendingTasks>,
    notify_gate: StdMutex<NotifyGate>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
}

impl<F, S, N> EngineInner<F, S, N> {
    fn publish(&self, session: &SessionState) {
        self.snapshot_tx.send_replace(FeedSnapshot::of(session));
    }

    fn abort_debounce(&self) {
        if let Some(handle) = self.tasks.lock().unwrap().debounce.take() {
            handle.abort();
        }
    }
}

/// The photo feed synchronization engine.
///
/// Cheap to clone; clones share one session. Collaborators (feed
/// source, photo store, notification sink) are injected at
/// construction.
pub struct FeedEngine<F, S, N> {
    inner: Arc<EngineInner<F, S, N>>,
}

impl<F, S, N> Clone for FeedEngine<F, S, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F, S, N> FeedEngine<F, S, N>
where
    F: FeedSource + 'static,
    S: PhotoStore + 'static,
    N: NotificationSink + 'static,
{
    /// Create an engine over the given collaborators.
    pub fn new(config: EngineConfig, source: F, store: S, sink: N) -> Self {
        let notify_gate = NotifyGate::new(config.notify_window);
        let (snapshot_tx, _) = watch::channel(FeedSnapshot::default());
        Self {
            inner: Arc::new(EngineInner {
                source,
                store,
                sink,
                config,
                session: Mutex::new(SessionState::new()),
                tasks: StdMutex::new(PendingTasks::default()),
                notify_gate: StdMutex::new(notify_gate),
                snapshot_tx,
            }),
        }
    }

    /// Subscribe to session snapshots.
    ///
    /// The receiver always holds the latest snapshot; intermediate
    /// updates may be conflated.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The displayed photos, in display order.
    pub async fn photos(&self) -> Vec<PhotoRecord> {
        self.inner.session.lock().await.photos().to_vec()
    }

    /// Last applied page number.
    pub async fn current_page(&self) -> u32 {
        self.inner.session.lock().await.current_page()
    }

    /// Whether the feed may have further pages.
    pub async fn has_more(&self) -> bool {
        self.inner.session.lock().await.has_more()
    }

    /// Whether a refresh is in flight.
    pub async fn is_loading(&self) -> bool {
        self.inner.session.lock().await.is_loading()
    }

    /// Whether a pagination fetch is in flight.
    pub async fn is_loading_more(&self) -> bool {
        self.inner.session.lock().await.is_loading_more()
    }

    /// The current blocking or pagination error, if any.
    pub async fn last_error(&self) -> Option<FeedError> {
        self.inner.session.lock().await.last_error().cloned()
    }

    /// The injected photo store.
    ///
    /// Exposed so consumers can drive maintenance paths (`clear`,
    /// `evict_expired`) directly.
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Full refresh.
    ///
    /// Supersedes every in-flight operation, paints cached records
    /// instantly when the list is empty, then fetches page 1 as the
    /// authoritative result. Never returns an error: failures land in
    /// the session state and the notification sink.
    pub async fn load(&self) {
        let inner = &self.inner;

        let generation = {
            let mut session = inner.session.lock().await;
            let generation = session.begin_refresh();
            inner.publish(&session);
            generation
        };
        // A refresh supersedes any scheduled page fetch.
        inner.abort_debounce();

        self.paint_from_cache(generation).await;

        let request = match PageRequest::new(1, inner.config.page_size) {
            Ok(request) => request,
            Err(error) => {
                self.fail_refresh(generation, error).await;
                return;
            }
        };

        match inner.source.fetch_page(request).await {
            Ok(records) => {
                let applied = {
                    let mut session = inner.session.lock().await;
                    match session.finish_refresh(generation, records.clone(), inner.config.page_size)
                    {
                        RefreshOutcome::Applied { changed } => {
                            inner.publish(&session);
                            Some(changed)
                        }
                        RefreshOutcome::Stale => {
                            tracing::debug!(generation, "discarding superseded refresh result");
                            None
                        }
                    }
                };
                if let Some(changed) = applied {
                    self.persist(&records).await;
                    if changed {
                        self.notify_success();
                    }
                }
            }
            Err(error) => self.fail_refresh(generation, error).await,
        }
    }

    /// Incremental pagination, designed for bursty scroll triggers.
    ///
    /// Schedules the fetch after the debounce delay; a new call replaces
    /// the pending schedule (last call wins). Once past the gate the
    /// fetch runs to completion and is reconciled by generation.
    pub fn load_more(&self) {
        let engine = self.clone();
        let debounce = self.inner.config.load_more_debounce;
        let mut tasks = self.inner.tasks.lock().unwrap();
        if let Some(handle) = tasks.debounce.take() {
            handle.abort();
        }
        tasks.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Past the gate: the authoritative fetch must survive
            // teardown and further debounce replacement.
            tokio::spawn(async move { engine.run_load_more().await });
        }));
    }

    /// Cooperative teardown hook.
    ///
    /// Cancels the scheduled debounce timer and any deferred success
    /// signal. An authoritative fetch already past its debounce gate is
    /// left to finish; generation checks decide whether its result
    /// still applies.
    pub fn cancel_pending_work(&self) {
        let mut tasks = self.inner.tasks.lock().unwrap();
        if let Some(handle) = tasks.debounce.take() {
            handle.abort();
        }
        if let Some(handle) = tasks.deferred_notify.take() {
            handle.abort();
        }
    }

    async fn paint_from_cache(&self, generation: u64) {
        let inner = &self.inner;
        if !inner.session.lock().await.photos().is_empty() {
            return;
        }
        match inner.store.load(inner.config.page_size as usize).await {
            Ok(cached) if !cached.is_empty() => {
                let mut session = inner.session.lock().await;
                if session.paint_cached(generation, cached) {
                    inner.publish(&session);
                }
            }
            Ok(_) => {}
            Err(error) => tracing::warn!(%error, "cache read failed; skipping instant paint"),
        }
    }

    async fn fail_refresh(&self, generation: u64, error: FeedError) {
        let inner = &self.inner;
        let failure = {
            let mut session = inner.session.lock().await;
            let failure = session.fail_refresh(generation, error.clone());
            if failure != RefreshFailure::Stale {
                inner.publish(&session);
            }
            failure
        };
        match failure {
            RefreshFailure::Blocking => {
                tracing::warn!(%error, "refresh failed with nothing to display");
            }
            RefreshFailure::Degraded => {
                // Stale photos stay up; the failure is a toast, not a wall.
                tracing::warn!(%error, "refresh failed; keeping stale photos");
                inner.sink.notify(NoticeKind::Error, &error.to_string());
            }
            RefreshFailure::Stale => {
                tracing::debug!(generation, "discarding superseded refresh failure");
            }
        }
    }

    async fn run_load_more(&self) {
        let inner = &self.inner;
        let begun = {
            let mut session = inner.session.lock().await;
            let begun = session.begin_load_more();
            if begun.is_some() {
                inner.publish(&session);
            }
            begun
        };
        let (generation, page) = match begun {
            Some(begun) => begun,
            None => return,
        };

        let request = match PageRequest::new(page, inner.config.page_size) {
            Ok(request) => request,
            Err(error) => {
                self.fail_load_more(generation, error).await;
                return;
            }
        };

        match inner.source.fetch_page(request).await {
            Ok(records) => {
                let applied = {
                    let mut session = inner.session.lock().await;
                    match session.finish_load_more(
                        generation,
                        records.clone(),
                        inner.config.page_size,
                    ) {
                        LoadMoreOutcome::Applied { appended } => {
                            tracing::debug!(page, appended, "applied feed page");
                            inner.publish(&session);
                            true
                        }
                        LoadMoreOutcome::Stale => {
                            tracing::debug!(page, "discarding superseded page fetch");
                            false
                        }
                    }
                };
                if applied {
                    // Cache reflects server truth: persist the full page,
                    // including records the duplicate filter dropped.
                    self.persist(&records).await;
                }
            }
            Err(error) => self.fail_load_more(generation, error).await,
        }
    }

    async fn fail_load_more(&self, generation: u64, error: FeedError) {
        let inner = &self.inner;
        let applied = {
            let mut session = inner.session.lock().await;
            let applied = session.fail_load_more(generation, error.clone());
            if applied {
                inner.publish(&session);
            }
            applied
        };
        if applied {
            tracing::warn!(%error, "page fetch failed; rolled back page counter");
        } else {
            tracing::debug!(generation, "discarding superseded page failure");
        }
    }

    /// Persist a fetched page, then sweep expired entries off-path.
    ///
    /// Store failures are logged and swallowed: the feed is the source
    /// of truth, the store is best-effort acceleration.
    async fn persist(&self, records: &[PhotoRecord]) {
        let inner = &self.inner;
        if let Err(error) = inner.store.save(records).await {
            tracing::warn!(%error, "cache save failed");
            return;
        }
        // The TTL sweep never blocks the caller.
        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            match inner.store.evict_expired().await {
                Ok(0) => {}
                Ok(evicted) => tracing::debug!(evicted, "evicted expired cache entries"),
                Err(error) => tracing::warn!(%error, "cache eviction failed"),
            }
        });
    }

    /// Surface a rate-limited "data updated" signal.
    ///
    /// Bursts inside the cool-down window collapse into at most one
    /// trailing signal.
    fn notify_success(&self) {
        let now = tokio::time::Instant::now().into_std();
        let wait = self.inner.notify_gate.lock().unwrap().try_allow(now);
        let Some(wait) = wait else {
            self.inner.sink.notify(NoticeKind::Success, FEED_UPDATED_TEXT);
            return;
        };

        let mut tasks = self.inner.tasks.lock().unwrap();
        let pending = tasks
            .deferred_notify
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false);
        if pending {
            // Collapse into the already-scheduled trailing signal.
            return;
        }
        let inner = Arc::clone(&self.inner);
        tasks.deferred_notify = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            let now = tokio::time::Instant::now().into_std();
            if inner.notify_gate.lock().unwrap().try_allow(now).is_none() {
                inner.sink.notify(NoticeKind::Success, FEED_UPDATED_TEXT);
            }
        }));
    }
}
