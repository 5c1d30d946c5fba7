//! Poller: drives refresh cycles over the tracked entities.
//!
//! One background task owns the cache writer and runs the loop. A cycle is
//! started by any of three triggers:
//! - the interval timer (the first tick fires immediately, giving a startup
//!   refresh),
//! - an on-demand request through [`PollerHandle::request_refresh`] or a
//!   [`RefreshTrigger`],
//! - a credentials change in the [`SessionStore`].
//!
//! Requests are coalesced: any number of triggers arriving while a cycle runs
//! produce exactly one follow-up cycle. The stop flag is checked between
//! cycles, so stopping never interrupts an in-flight cycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Notify, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

use hubpanel_domain::credentials::Credentials;
use hubpanel_domain::entity::EntityReading;
use hubpanel_domain::error::{FailureKind, FetchError};
use hubpanel_domain::time::now;

use crate::entity_cache::CacheWriter;
use crate::ports::{EntitiesUpdated, StateClient, UpdatePublisher};
use crate::session::SessionStore;

/// Default delay between two timer-driven cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

/// Consecutive failures of one entity logged at `warn` before escalating.
const WARN_LIMIT: u32 = 3;

/// Poller settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Outcome counts of a single refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub succeeded: usize,
    pub failed: usize,
    /// Entities not fetched because credentials were absent.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Timer,
    Requested,
    Credentials,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timer => "timer",
            Self::Requested => "requested",
            Self::Credentials => "credentials",
        })
    }
}

/// Coalescing refresh request flag.
#[derive(Debug, Default)]
struct RefreshSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl RefreshSignal {
    fn request(&self) {
        self.pending.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    /// Resolves once a request is pending, consuming it.
    async fn wait(&self) {
        loop {
            if self.pending.swap(false, Ordering::AcqRel) {
                return;
            }
            self.notify.notified().await;
        }
    }

    /// Drop requests made before the cycle that is about to run.
    fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// Cloneable fire-and-forget refresh request.
#[derive(Debug, Clone)]
pub struct RefreshTrigger {
    signal: Arc<RefreshSignal>,
}

impl RefreshTrigger {
    /// Ask for a refresh as soon as possible. Never blocks.
    pub fn request(&self) {
        self.signal.request();
    }
}

/// Refresh engine. Owns the only [`CacheWriter`].
pub struct Poller<C, P> {
    client: C,
    publisher: P,
    writer: CacheWriter,
    session: watch::Receiver<Option<Credentials>>,
    config: PollerConfig,
    signal: Arc<RefreshSignal>,
    cycle: u64,
    failures: HashMap<String, u32>,
}

impl<C, P> Poller<C, P>
where
    C: StateClient + Send + Sync + 'static,
    P: UpdatePublisher + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(
        client: C,
        publisher: P,
        writer: CacheWriter,
        session: &SessionStore,
        config: PollerConfig,
    ) -> Self {
        Self {
            client,
            publisher,
            writer,
            session: session.subscribe(),
            config,
            signal: Arc::default(),
            cycle: 0,
            failures: HashMap::new(),
        }
    }

    /// Trigger that requests refreshes from this poller.
    #[must_use]
    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            signal: Arc::clone(&self.signal),
        }
    }

    /// Spawn the refresh loop on the current tokio runtime.
    #[must_use]
    pub fn spawn(self) -> PollerHandle {
        let signal = Arc::clone(&self.signal);
        let (running, running_rx) = watch::channel(true);
        let task = tokio::spawn(self.run(running_rx));
        PollerHandle {
            signal,
            running,
            task,
        }
    }

    async fn run(mut self, mut running: watch::Receiver<bool>) {
        let period = if self.config.interval.is_zero() {
            tracing::warn!("zero poll interval, using the default");
            DEFAULT_INTERVAL
        } else {
            self.config.interval
        };
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = period.as_secs(),
            entities = self.writer.ids().len(),
            "poller started"
        );

        let mut session_open = true;
        loop {
            if !*running.borrow_and_update() {
                break;
            }

            let trigger = tokio::select! {
                biased;
                changed = running.changed() => {
                    if changed.is_err() {
                        tracing::debug!("poller handle dropped");
                        break;
                    }
                    continue;
                }
                changed = self.session.changed(), if session_open => {
                    if changed.is_err() {
                        // last credentials stay readable; timer and requests keep driving cycles
                        tracing::warn!("session store dropped, credentials are now fixed");
                        session_open = false;
                        continue;
                    }
                    Trigger::Credentials
                }
                () = self.signal.wait() => Trigger::Requested,
                _ = ticker.tick() => Trigger::Timer,
            };

            let report = self.refresh().await;
            tracing::info!(
                cycle = report.cycle,
                %trigger,
                succeeded = report.succeeded,
                failed = report.failed,
                skipped = report.skipped,
                "refresh cycle complete"
            );
        }

        tracing::info!(cycles = self.cycle, "poller stopped");
    }

    /// Run one refresh cycle and publish its result.
    ///
    /// Serves every trigger pending when it starts. Without credentials
    /// every entry is marked failed and no request is made.
    pub async fn refresh(&mut self) -> CycleReport {
        self.signal.clear();
        let configured = self.session.borrow_and_update().is_some();
        self.cycle += 1;
        let cycle = self.cycle;

        let report = if configured {
            self.fetch_all(cycle).await
        } else {
            let skipped = self.writer.ids().len();
            self.writer.mark_all_failed(FailureKind::Unconfigured, now());
            self.failures.clear();
            tracing::debug!(cycle, "no credentials, all entities marked unconfigured");
            CycleReport {
                cycle,
                succeeded: 0,
                failed: 0,
                skipped,
            }
        };

        self.publisher.publish(EntitiesUpdated {
            cycle,
            completed_at: now(),
            readings: self.writer.snapshot_all(),
        });
        report
    }

    async fn fetch_all(&mut self, cycle: u64) -> CycleReport {
        let ids = self.writer.ids();
        let client = &self.client;
        let writer = &self.writer;

        let fetches = ids.iter().map(|id| async move {
            let (reading, error) = match client.fetch_state(id).await {
                Ok(state) => (EntityReading::success(id.as_str(), state, now()), None),
                Err(err) => (EntityReading::failed(id.as_str(), err.kind(), now()), Some(err)),
            };
            if let Err(err) = writer.update(reading) {
                tracing::error!(cycle, error = %err, "fetched entity missing from cache");
            }
            (id, error)
        });
        let outcomes = join_all(fetches).await;

        let mut report = CycleReport {
            cycle,
            succeeded: 0,
            failed: 0,
            skipped: 0,
        };
        for (id, error) in outcomes {
            match error {
                None => report.succeeded += 1,
                Some(_) => report.failed += 1,
            }
            self.track_failures(id, error.as_ref());
        }
        report
    }

    fn track_failures(&mut self, entity_id: &str, error: Option<&FetchError>) {
        match error {
            None => {
                if let Some(failures) = self.failures.remove(entity_id) {
                    tracing::info!(entity_id, failures, "entity recovered");
                }
            }
            // credentials were cleared mid-cycle; the next cycle wipes the cache
            Some(FetchError::Unconfigured) => {}
            Some(err) => {
                let failures = self.failures.entry(entity_id.to_string()).or_insert(0);
                *failures += 1;
                let failures = *failures;
                if failures <= WARN_LIMIT {
                    tracing::warn!(entity_id, failures, error = %err, "fetch failed");
                } else if failures == WARN_LIMIT + 1 {
                    tracing::error!(
                        entity_id,
                        failures,
                        error = %err,
                        "fetch keeps failing, further failures are silent until it recovers"
                    );
                }
            }
        }
    }
}

/// Control handle for a spawned [`Poller`].
///
/// Dropping the handle stops the poller after its current cycle.
#[derive(Debug)]
pub struct PollerHandle {
    signal: Arc<RefreshSignal>,
    running: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Ask for a refresh as soon as possible. Never blocks; coalesced.
    pub fn request_refresh(&self) {
        self.signal.request();
    }

    /// Cloneable trigger for other tasks.
    #[must_use]
    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            signal: Arc::clone(&self.signal),
        }
    }

    /// Set the stop flag. The current cycle, if any, completes.
    pub fn stop(&self) {
        self.running.send_replace(false);
    }

    /// Whether the loop task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop and wait for the loop task to exit.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the loop task panicked.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.stop();
        self.task.await
    }
}
