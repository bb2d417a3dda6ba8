//! Dashboard polling and operator actions.
//!
//! Two independent schedules keep the dashboard fresh: one for node status,
//! balance and staking, one for the log tail. Each cycle takes a sequence
//! number when it starts; a completion older than what is already displayed
//! is dropped, so an overlapping slow cycle can never overwrite newer data.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};

use crate::api::types::{BalanceResponse, StakingInfoResponse};
use crate::api::{NodeApi, ValidatorApi, WalletApi};
use crate::config_store::PollingConfig;
use crate::confirm::{gated, ConfirmationGate, DestructiveAction, GateOutcome};
use crate::errors::{ConsoleError, ConsoleResult};
use crate::navigation;
use crate::snapshot::StatusSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub snapshot: Option<StatusSnapshot>,
    pub balance: Option<BalanceResponse>,
    /// `None` when staking info is unavailable; never an error.
    pub staking: Option<StakingInfoResponse>,
    pub logs: Vec<String>,
    /// Message of the last failed data refresh, cleared on success.
    pub last_error: Option<String>,
    /// The backend rejected the session; the console must re-reconcile.
    pub session_expired: bool,
    pub refreshed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    data_seq: u64,
    #[serde(skip)]
    log_seq: u64,
}

/// Result of one status+balance+staking cycle.
#[derive(Debug)]
pub enum DataCycle {
    Fresh {
        snapshot: StatusSnapshot,
        balance: BalanceResponse,
        staking: Option<StakingInfoResponse>,
    },
    Failed(ConsoleError),
}

/// Fetch status, balance and staking concurrently.
pub async fn fetch_data_cycle<B>(api: &B) -> DataCycle
where
    B: NodeApi + WalletApi + ValidatorApi,
{
    let (status, balance, staking) =
        tokio::join!(api.node_status(), api.balance(), api.staking_info());

    let staking = match staking {
        Ok(info) => Some(info),
        Err(e) => {
            log::debug!("Staking info unavailable: {}", e);
            None
        }
    };

    match (status, balance) {
        (Ok(status), Ok(balance)) => DataCycle::Fresh {
            snapshot: StatusSnapshot::from_node_status(&status, true),
            balance,
            staking,
        },
        (Err(e), _) | (_, Err(e)) => DataCycle::Failed(e),
    }
}

struct FeedInner {
    state: watch::Sender<DashboardState>,
    next_data_seq: AtomicU64,
    next_log_seq: AtomicU64,
    active: AtomicBool,
}

/// Published dashboard state. Clones share the same channel.
#[derive(Clone)]
pub struct DashboardFeed {
    inner: Arc<FeedInner>,
}

impl Default for DashboardFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardFeed {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(FeedInner {
                state,
                next_data_seq: AtomicU64::new(1),
                next_log_seq: AtomicU64::new(1),
                active: AtomicBool::new(true),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn activate(&self) {
        self.inner.active.store(true, Ordering::SeqCst);
    }

    /// After this nothing is applied until `activate`.
    pub fn deactivate(&self) {
        self.inner.active.store(false, Ordering::SeqCst);
    }

    pub fn begin_data_cycle(&self) -> u64 {
        self.inner.next_data_seq.fetch_add(1, Ordering::SeqCst)
    }

    pub fn begin_log_cycle(&self) -> u64 {
        self.inner.next_log_seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Apply a data cycle. Returns whether it was applied.
    pub fn apply_data(&self, seq: u64, cycle: DataCycle) -> bool {
        if !self.is_active() {
            return false;
        }
        self.inner.state.send_if_modified(|state| {
            if seq <= state.data_seq {
                log::debug!("Dropping stale data cycle {} (shown: {})", seq, state.data_seq);
                return false;
            }
            state.data_seq = seq;
            match cycle {
                DataCycle::Fresh {
                    snapshot,
                    balance,
                    staking,
                } => {
                    state.snapshot = Some(snapshot);
                    state.balance = Some(balance);
                    state.staking = staking;
                    state.last_error = None;
                    state.session_expired = false;
                    state.refreshed_at = Some(Utc::now());
                }
                DataCycle::Failed(err) => {
                    log::warn!("Dashboard refresh failed: {}", err);
                    state.session_expired = err.is_unauthorized();
                    state.last_error = Some(err.to_string());
                }
            }
            true
        })
    }

    /// Replace the log buffer wholesale.
    pub fn apply_logs(&self, seq: u64, logs: Vec<String>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.inner.state.send_if_modified(|state| {
            if seq <= state.log_seq {
                return false;
            }
            state.log_seq = seq;
            state.logs = logs;
            true
        })
    }

    /// Local only; the next log cycle refills the buffer.
    pub fn clear_logs(&self) {
        self.inner.state.send_modify(|state| state.logs.clear());
    }
}

/// Run one data cycle and publish it.
pub async fn refresh_data<B>(api: &B, feed: &DashboardFeed) -> bool
where
    B: NodeApi + WalletApi + ValidatorApi,
{
    let seq = feed.begin_data_cycle();
    let cycle = fetch_data_cycle(api).await;
    feed.apply_data(seq, cycle)
}

/// Run one log cycle and publish it. Failures keep the old buffer.
pub async fn refresh_logs<B: NodeApi>(api: &B, feed: &DashboardFeed) -> bool {
    let seq = feed.begin_log_cycle();
    match api.node_logs().await {
        Ok(tail) => feed.apply_logs(seq, tail.logs),
        Err(e) => {
            log::debug!("Log tail unavailable: {}", e);
            false
        }
    }
}

/// Background schedules feeding a [`DashboardFeed`].
pub struct DashboardPoller {
    feed: DashboardFeed,
    shutdown: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardPoller {
    pub fn start<B>(api: Arc<B>, feed: DashboardFeed, polling: &PollingConfig) -> Self
    where
        B: NodeApi + WalletApi + ValidatorApi + 'static,
    {
        Self::with_intervals(api, feed, polling.data_interval(), polling.log_interval())
    }

    /// Both schedules fire immediately, then at their interval.
    pub fn with_intervals<B>(
        api: Arc<B>,
        feed: DashboardFeed,
        data_interval: Duration,
        log_interval: Duration,
    ) -> Self
    where
        B: NodeApi + WalletApi + ValidatorApi + 'static,
    {
        feed.activate();
        let (shutdown, rx) = watch::channel(false);

        let data_worker = {
            let api = Arc::clone(&api);
            let feed = feed.clone();
            spawn_schedule(data_interval, rx.clone(), move || {
                let api = Arc::clone(&api);
                let feed = feed.clone();
                async move {
                    refresh_data(api.as_ref(), &feed).await;
                }
            })
        };
        let log_worker = {
            let feed = feed.clone();
            spawn_schedule(log_interval, rx, move || {
                let api = Arc::clone(&api);
                let feed = feed.clone();
                async move {
                    refresh_logs(api.as_ref(), &feed).await;
                }
            })
        };
        log::info!(
            "Dashboard polling started (data every {:?}, logs every {:?})",
            data_interval,
            log_interval
        );

        Self {
            feed,
            shutdown,
            workers: Mutex::new(vec![data_worker, log_worker]),
        }
    }

    pub fn feed(&self) -> &DashboardFeed {
        &self.feed
    }

    /// Stop both schedules and abort any cycle still in flight.
    pub async fn stop(&self) {
        self.feed.deactivate();
        if self.shutdown.send(true).is_err() {
            log::debug!("Dashboard schedules already gone");
        }
        let workers = std::mem::take(&mut *self.workers.lock().await);
        for handle in workers {
            if let Err(err) = handle.await {
                log::debug!("Dashboard schedule exited with error: {}", err);
            }
        }
        log::info!("Dashboard polling stopped");
    }
}

impl Drop for DashboardPoller {
    fn drop(&mut self) {
        self.feed.deactivate();
        let _ = self.shutdown.send(true);
    }
}

fn spawn_schedule<F, Fut>(
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut cycle: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Dropping the set aborts cycles still running.
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    in_flight.spawn(cycle());
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = done {
                        log::debug!("Dashboard cycle ended abnormally: {}", err);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        in_flight.abort_all();
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DashboardAction {
    StartNode,
    StopNode,
    WithdrawRewards,
    RestakeRewards,
}

impl DashboardAction {
    fn label(&self) -> &'static str {
        match self {
            DashboardAction::StartNode => "Starting the node",
            DashboardAction::StopNode => "Stopping the node",
            DashboardAction::WithdrawRewards => "Withdrawing rewards",
            DashboardAction::RestakeRewards => "Restaking rewards",
        }
    }
}

/// Operator actions on the dashboard. At most one call per action kind is
/// in flight; each success is followed by a data refresh.
pub struct DashboardActions<'a, B> {
    api: &'a B,
    feed: DashboardFeed,
    in_flight: parking_lot::Mutex<HashSet<DashboardAction>>,
}

struct InFlight<'g> {
    set: &'g parking_lot::Mutex<HashSet<DashboardAction>>,
    action: DashboardAction,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.action);
    }
}

impl<'a, B> DashboardActions<'a, B>
where
    B: NodeApi + WalletApi + ValidatorApi,
{
    pub fn new(api: &'a B, feed: DashboardFeed) -> Self {
        Self {
            api,
            feed,
            in_flight: parking_lot::Mutex::new(HashSet::new()),
        }
    }

    fn begin(&self, action: DashboardAction) -> ConsoleResult<InFlight<'_>> {
        if !self.in_flight.lock().insert(action) {
            return Err(ConsoleError::Busy(action.label().to_string()));
        }
        Ok(InFlight {
            set: &self.in_flight,
            action,
        })
    }

    pub async fn refresh(&self) -> bool {
        refresh_data(self.api, &self.feed).await
    }

    pub async fn start_node(&self) -> ConsoleResult<()> {
        let _guard = self.begin(DashboardAction::StartNode)?;
        let ready = self
            .feed
            .current()
            .snapshot
            .as_ref()
            .is_some_and(navigation::can_start_node);
        if !ready {
            return Err(ConsoleError::ValidationError(
                "Create a wallet, initialize the node and create the validator first".to_string(),
            ));
        }

        self.api.start_node().await?;
        log::info!("Node start requested");
        self.refresh().await;
        Ok(())
    }

    pub async fn stop_node(&self) -> ConsoleResult<()> {
        let _guard = self.begin(DashboardAction::StopNode)?;
        self.api.stop_node().await?;
        log::info!("Node stop requested");
        self.refresh().await;
        Ok(())
    }

    pub async fn withdraw_rewards<G: ConfirmationGate>(
        &self,
        gate: &G,
    ) -> ConsoleResult<GateOutcome<()>> {
        let _guard = self.begin(DashboardAction::WithdrawRewards)?;
        let api = self.api;
        let outcome = gated(gate, &DestructiveAction::WithdrawRewards, || async move {
            api.withdraw_rewards().await.map(|_| ())
        })
        .await?;
        self.after_gated(&outcome, "Rewards withdrawn").await;
        Ok(outcome)
    }

    pub async fn restake_rewards<G: ConfirmationGate>(
        &self,
        gate: &G,
    ) -> ConsoleResult<GateOutcome<()>> {
        let _guard = self.begin(DashboardAction::RestakeRewards)?;
        let api = self.api;
        let outcome = gated(gate, &DestructiveAction::RestakeRewards, || async move {
            api.restake_rewards().await.map(|_| ())
        })
        .await?;
        self.after_gated(&outcome, "Rewards restaked").await;
        Ok(outcome)
    }

    pub fn clear_logs(&self) {
        self.feed.clear_logs();
    }

    async fn after_gated(&self, outcome: &GateOutcome<()>, message: &str) {
        if !outcome.is_declined() {
            log::info!("{}", message);
            self.refresh().await;
        }
    }
}
