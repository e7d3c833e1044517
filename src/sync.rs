//! Local-first synchronization between the in-memory dataset, the local cache
//! and the remote record store.
//!
//! Boot paints from the cache, then a single background fetch replaces the
//! dataset wholesale with the remote copy. Afterwards the remote only receives
//! per-day pushes; it is never pulled again during the session.

use crate::config::TrackerConfig;
use crate::errors::TrackerError;
use crate::models::{day_key, Dataset, DayRecord};
use crate::remote::RemoteStore;
use crate::storage::LocalCache;
use crate::tasks;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Loading,
    Saving,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub message: String,
}

impl SyncStatus {
    pub fn new(state: SyncState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// How far the in-memory dataset is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    LocalAuthoritative,
    RemoteReconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Reconciled,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOp {
    Toggle(String),
    /// Empties the task list; the note survives.
    Clear,
    SetNote(String),
}

/// Sequence numbers of the pushes issued and acknowledged for one day.
#[derive(Debug, Clone, Copy, Default)]
struct WriteLedger {
    issued: u64,
    acked: u64,
    // outcome of the latest push
    failed: bool,
}

struct State {
    data: Dataset,
    ledger: HashMap<usize, WriteLedger>,
    // days mutated while the boot fetch was still running
    touched_early: BTreeSet<usize>,
    reconciling: bool,
}

struct Inner<R> {
    config: TrackerConfig,
    cache: LocalCache,
    remote: R,
    state: Mutex<State>,
    status: watch::Sender<SyncStatus>,
    phase: watch::Sender<Phase>,
    in_flight: watch::Sender<usize>,
}

/// Handle to the session's dataset. Cloning shares the same state.
pub struct Tracker<R> {
    inner: Arc<Inner<R>>,
}

impl<R> Clone for Tracker<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RemoteStore> Tracker<R> {
    /// Loads the local cache and starts the one-time remote reconciliation.
    ///
    /// Returns as soon as the cached data is in memory; the remote fetch runs
    /// in the background. Call once per session.
    pub async fn boot(config: TrackerConfig, remote: R) -> Self {
        let cache = LocalCache::new(config.cache_path.clone());
        let data = cache.load().await;
        info!(
            days = data.len(),
            path = %cache.path().display(),
            "loaded local cache"
        );

        let (status, _) = watch::channel(SyncStatus::new(
            SyncState::Loading,
            "Loading from remote store…",
        ));
        let (phase, _) = watch::channel(Phase::Pending);
        let (in_flight, _) = watch::channel(0);

        let tracker = Self {
            inner: Arc::new(Inner {
                config,
                cache,
                remote,
                state: Mutex::new(State {
                    data,
                    ledger: HashMap::new(),
                    touched_early: BTreeSet::new(),
                    reconciling: true,
                }),
                status,
                phase,
                in_flight,
            }),
        };

        let reconciler = tracker.clone();
        tokio::spawn(async move { reconciler.reconcile().await });

        tracker
    }

    async fn reconcile(&self) {
        match self.inner.remote.fetch_all().await {
            Ok(mut remote) => {
                let mut state = self.inner.state.lock().await;
                for &index in &state.touched_early {
                    remote.insert(day_key(index), state.data.record(index).clone());
                }
                let early_failed = state.touched_early.iter().any(|index| {
                    state
                        .ledger
                        .get(index)
                        .is_some_and(|ledger| ledger.failed)
                });
                state.data = remote;
                state.touched_early.clear();
                state.reconciling = false;
                self.inner.cache.save(&state.data).await;
                info!(days = state.data.len(), "reconciled with remote store");

                // an early push that failed or is still running owns the status
                if early_failed || self.pending_writes() > 0 {
                    debug!(early_failed, "keeping write status after reconcile");
                } else {
                    self.set_status(SyncState::Ok, "Synced with remote store");
                }
                drop(state);
                self.inner.phase.send_replace(Phase::Reconciled);
            }
            Err(err) => {
                warn!("remote load failed, using local data: {err}");
                {
                    let mut state = self.inner.state.lock().await;
                    state.touched_early.clear();
                    state.reconciling = false;
                }
                self.set_status(SyncState::Error, "Offline — using local data");
                self.inner.phase.send_replace(Phase::Offline);
            }
        }
    }

    /// Applies `op` to day `index` (zero-based) and returns the updated record.
    ///
    /// Memory and the local cache are updated before returning; the remote push
    /// runs in the background and only affects [`Tracker::sync_status`].
    pub async fn mutate(&self, index: usize, op: DayOp) -> Result<DayRecord, TrackerError> {
        let config = &self.inner.config;
        if !config.contains_day(index) {
            return Err(TrackerError::DayOutOfRange {
                day: index + 1,
                total: config.total_days,
            });
        }
        if let DayOp::Toggle(task) = &op {
            if !tasks::is_known_task(task) {
                return Err(TrackerError::UnknownTask(task.clone()));
            }
        }

        let mut state = self.inner.state.lock().await;
        let record = {
            let entry = state.data.ensure(index);
            match &op {
                DayOp::Toggle(task) => {
                    entry.toggle(task);
                }
                DayOp::Clear => entry.clear_tasks(),
                DayOp::SetNote(text) => entry.set_note(text),
            }
            entry.clone()
        };
        let seq = {
            let ledger = state.ledger.entry(index).or_default();
            ledger.issued += 1;
            ledger.issued
        };
        if state.reconciling {
            state.touched_early.insert(index);
        }
        self.inner.cache.save(&state.data).await;
        self.set_status(SyncState::Saving, "Saving…");
        self.inner.in_flight.send_modify(|count| *count += 1);
        drop(state);

        debug!(day = %day_key(index), seq, ?op, "applied mutation");

        let pusher = self.clone();
        let pushed = record.clone();
        tokio::spawn(async move { pusher.push(index, pushed, seq).await });

        Ok(record)
    }

    async fn push(&self, index: usize, record: DayRecord, seq: u64) {
        let result = self.inner.remote.save_day(index, &record).await;
        let key = day_key(index);

        let (superseded, overtaken) = {
            let mut state = self.inner.state.lock().await;
            let ledger = state.ledger.entry(index).or_default();
            let superseded = seq < ledger.issued;
            let overtaken = seq < ledger.acked;
            if result.is_ok() && seq > ledger.acked {
                ledger.acked = seq;
            }
            if !superseded {
                ledger.failed = result.is_err();
            }
            (superseded, overtaken)
        };

        match result {
            Ok(()) if overtaken => {
                warn!(
                    day = %key,
                    seq,
                    "older write acknowledged after a newer one; remote may hold stale state"
                );
            }
            Ok(()) if superseded => debug!(day = %key, seq, "superseded write acknowledged"),
            Ok(()) => {
                debug!(day = %key, seq, "saved to remote store");
                self.set_status(SyncState::Ok, "Saved to remote store");
            }
            Err(err) if superseded => {
                debug!(day = %key, seq, "superseded write failed: {err}");
            }
            Err(err) => {
                warn!(day = %key, seq, "remote save failed, kept locally: {err}");
                self.set_status(SyncState::Error, "Save failed — kept locally");
            }
        }

        self.inner
            .in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }

    fn set_status(&self, state: SyncState, message: &str) {
        self.inner.status.send_replace(SyncStatus::new(state, message));
    }

    pub async fn current_dataset(&self) -> Dataset {
        self.inner.state.lock().await.data.clone()
    }

    pub async fn record(&self, index: usize) -> DayRecord {
        self.inner.state.lock().await.data.record(index).clone()
    }

    /// Blocks until the boot-time fetch has resolved either way.
    pub async fn wait_reconciled(&self) -> Authority {
        let mut phase = self.inner.phase.subscribe();
        let resolved = match phase.wait_for(|phase| *phase != Phase::Pending).await {
            Ok(current) => *current,
            Err(_) => Phase::Offline,
        };
        authority_of(resolved)
    }

    /// Blocks until every remote push issued so far has completed.
    pub async fn settled(&self) {
        let mut in_flight = self.inner.in_flight.subscribe();
        let _ = in_flight.wait_for(|count| *count == 0).await;
    }
}

impl<R> Tracker<R> {
    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.inner.status.subscribe()
    }

    pub fn authority(&self) -> Authority {
        authority_of(*self.inner.phase.borrow())
    }

    pub fn pending_writes(&self) -> usize {
        *self.inner.in_flight.borrow()
    }
}

fn authority_of(phase: Phase) -> Authority {
    match phase {
        Phase::Reconciled => Authority::RemoteReconciled,
        Phase::Pending | Phase::Offline => Authority::LocalAuthoritative,
    }
}
