//! Reconciling storage strategy
//!
//! # Read path
//! ```text
//! load_*()
//!     → local delegate        (value returned to the caller immediately)
//!     → spawned reconciliation:
//!         remote decodes, equal      → nothing
//!         remote decodes, different  → local := remote, notify(local, remote)
//!         remote missing/malformed   → remote := local, notify(local, local)
//!         remote unreachable         → log only
//! ```
//!
//! # Write path
//! ```text
//! save_*()
//!     → local delegate        (synchronous)
//!     → spawned remote push   (best effort, failures logged)
//! ```
//!
//! Remote writes are not atomic across keys; a half-written record reads as
//! malformed and is re-seeded from local.
//!
//! Concurrent passes are not serialised. The last completion wins and an
//! observer may be notified more than once for the same divergence.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use breakers_core::codec::{decode_configuration, decode_state, encode_configuration, encode_state};
use breakers_core::{
    configurations_equal, states_equal, CircuitBreakerConfiguration, CircuitBreakerState, CoreError,
    KeySpace, RemoteStore, StorageStrategy,
};

use crate::config::SyncConfig;
use crate::observer::{ObserverSlot, StorageChange};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Result of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Remote and local already agreed
    Unchanged,
    /// The remote value replaced the local one
    Adopted,
    /// The remote record was missing or malformed and was re-seeded from local
    Repaired,
    /// The remote store could not be read, or a repair could not be written
    Failed,
}

/// A value kept in sync between the local delegate and the remote store
trait SyncedValue: Clone + Debug + Send + Sync + 'static {
    const NAME: &'static str;

    fn remote_keys(keys: &KeySpace) -> Vec<String>;
    fn decode(values: &[Option<String>]) -> Result<Self, CoreError>;
    fn encode(&self, keys: &KeySpace) -> Vec<(String, String)>;
    fn same_as(&self, other: &Self) -> bool;
    fn load_local(store: &dyn StorageStrategy) -> Self;
    fn save_local(self, store: &dyn StorageStrategy);
    fn observers(reconciler: &Reconciler) -> &ObserverSlot<Self>;
    fn change(previous: Self, next: Self) -> StorageChange;
}

impl SyncedValue for CircuitBreakerConfiguration {
    const NAME: &'static str = "configuration";

    fn remote_keys(keys: &KeySpace) -> Vec<String> {
        keys.configuration_keys()
    }

    fn decode(values: &[Option<String>]) -> Result<Self, CoreError> {
        decode_configuration(values)
    }

    fn encode(&self, keys: &KeySpace) -> Vec<(String, String)> {
        encode_configuration(keys, self)
    }

    fn same_as(&self, other: &Self) -> bool {
        configurations_equal(self, other)
    }

    fn load_local(store: &dyn StorageStrategy) -> Self {
        store.load_configuration()
    }

    fn save_local(self, store: &dyn StorageStrategy) {
        store.save_configuration(self)
    }

    fn observers(reconciler: &Reconciler) -> &ObserverSlot<Self> {
        &reconciler.configuration_observer
    }

    fn change(previous: Self, next: Self) -> StorageChange {
        StorageChange::Configuration { previous, next }
    }
}

impl SyncedValue for CircuitBreakerState {
    const NAME: &'static str = "state";

    fn remote_keys(keys: &KeySpace) -> Vec<String> {
        keys.state_keys()
    }

    fn decode(values: &[Option<String>]) -> Result<Self, CoreError> {
        decode_state(values)
    }

    fn encode(&self, keys: &KeySpace) -> Vec<(String, String)> {
        encode_state(keys, self)
    }

    fn same_as(&self, other: &Self) -> bool {
        states_equal(self, other)
    }

    fn load_local(store: &dyn StorageStrategy) -> Self {
        store.load_state()
    }

    fn save_local(self, store: &dyn StorageStrategy) {
        store.save_state(self)
    }

    fn observers(reconciler: &Reconciler) -> &ObserverSlot<Self> {
        &reconciler.state_observer
    }

    fn change(previous: Self, next: Self) -> StorageChange {
        StorageChange::State { previous, next }
    }
}

/// Shared core of the strategy, owned by the strategy and its background tasks
struct Reconciler {
    keys: KeySpace,
    remote: Arc<dyn RemoteStore>,
    delegate: Arc<dyn StorageStrategy>,
    runtime: Handle,
    configuration_observer: ObserverSlot<CircuitBreakerConfiguration>,
    state_observer: ObserverSlot<CircuitBreakerState>,
    changes: broadcast::Sender<StorageChange>,
}

impl Reconciler {
    fn id(&self) -> &str {
        self.keys.id()
    }

    async fn load_remote<V: SyncedValue>(&self) -> Result<V, CoreError> {
        let values = self.remote.get_many(&V::remote_keys(&self.keys)).await?;
        debug!("Raw {} values loaded for breaker {}: {:?}", V::NAME, self.id(), values);
        V::decode(&values)
    }

    async fn save_remote<V: SyncedValue>(&self, value: &V) -> Result<(), CoreError> {
        self.remote.set_many(&value.encode(&self.keys)).await
    }

    fn notify<V: SyncedValue>(&self, previous: V, next: V) {
        V::observers(self).notify(&previous, &next);
        // no subscribers is not an error
        let _ = self.changes.send(V::change(previous, next));
    }

    #[instrument(level = "debug", skip_all, fields(breaker_id = %self.id(), value = V::NAME))]
    async fn reconcile<V: SyncedValue>(&self, local: V) -> ReconcileOutcome {
        match self.load_remote::<V>().await {
            Ok(remote) => {
                if local.same_as(&remote) {
                    return ReconcileOutcome::Unchanged;
                }
                info!("Updating local {} of breaker {} with remote one: {:?}", V::NAME, self.id(), remote);
                remote.clone().save_local(self.delegate.as_ref());
                self.notify(local, remote);
                ReconcileOutcome::Adopted
            }
            Err(e) if e.is_decode() => {
                warn!("Unable to decode remote {} of breaker {}: {}", V::NAME, self.id(), e);
                info!("Overwriting remote {} of breaker {} with local one: {:?}", V::NAME, self.id(), local);
                let outcome = match self.save_remote(&local).await {
                    Ok(()) => ReconcileOutcome::Repaired,
                    Err(e) => {
                        error!("Unable to repair remote {} of breaker {}: {}", V::NAME, self.id(), e);
                        ReconcileOutcome::Failed
                    }
                };
                // observers hear about the repair attempt even when the write failed
                self.notify(local.clone(), local);
                outcome
            }
            Err(e) => {
                error!("Unable to load remote {} of breaker {}: {}", V::NAME, self.id(), e);
                ReconcileOutcome::Failed
            }
        }
    }

    async fn reconcile_current<V: SyncedValue>(&self) -> ReconcileOutcome {
        let local = V::load_local(self.delegate.as_ref());
        self.reconcile(local).await
    }

    async fn refresh(&self) -> (ReconcileOutcome, ReconcileOutcome) {
        let configuration = self.reconcile_current::<CircuitBreakerConfiguration>().await;
        let state = self.reconcile_current::<CircuitBreakerState>().await;
        (configuration, state)
    }

    fn spawn_reconcile<V: SyncedValue>(self: &Arc<Self>, local: V) {
        let reconciler = Arc::clone(self);
        self.runtime.spawn(async move {
            reconciler.reconcile(local).await;
        });
    }

    fn spawn_push<V: SyncedValue>(self: &Arc<Self>, value: V) {
        let reconciler = Arc::clone(self);
        self.runtime.spawn(async move {
            if let Err(e) = reconciler.save_remote(&value).await {
                error!("Unable to update remote {} of breaker {}: {}", V::NAME, reconciler.id(), e);
            }
        });
    }
}

/// Connect, run the initial pass, then refresh periodically until cancelled
async fn run_background(reconciler: Arc<Reconciler>, period: Option<Duration>, cancel: CancellationToken) {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        connected = reconciler.remote.connect() => match connected {
            Ok(()) => {
                info!("Connected to remote store for breaker {}", reconciler.id());
                reconciler.refresh().await;
            }
            Err(e) => error!("Unable to connect to remote store for breaker {}: {}", reconciler.id(), e),
        }
    }

    let Some(period) = period else {
        return;
    };

    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Refresh loop of breaker {} stopped", reconciler.id());
                break;
            }
            _ = interval.tick() => {
                reconciler.refresh().await;
            }
        }
    }
}

/// Storage strategy keeping a local delegate and a remote store converged
///
/// Reads always answer from the local delegate and reconcile in the
/// background; outcomes are only visible through the change observers and
/// [`subscribe`](Self::subscribe). Dropping the strategy stops its refresh
/// loop.
pub struct ReconcilingStorageStrategy {
    reconciler: Arc<Reconciler>,
    cancel: CancellationToken,
}

impl ReconcilingStorageStrategy {
    /// Create a strategy and start connecting to the remote store
    ///
    /// Must be called within a Tokio runtime. With a refresh interval the
    /// reconciliation pass is repeated on that period.
    pub fn new(
        id: impl Into<String>,
        remote: Arc<dyn RemoteStore>,
        delegate: Arc<dyn StorageStrategy>,
        refresh_interval: Option<Duration>,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::ConfigurationError("Breaker id is required".to_string()));
        }
        let runtime = Handle::try_current().map_err(|_| {
            CoreError::ConfigurationError(
                "ReconcilingStorageStrategy must be created within a Tokio runtime".to_string(),
            )
        })?;
        let refresh_interval = refresh_interval.filter(|period| !period.is_zero());

        debug!("Creating reconciling storage strategy for breaker {}, refresh: {:?}", id, refresh_interval);
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let reconciler = Arc::new(Reconciler {
            keys: KeySpace::new(id),
            remote,
            delegate,
            runtime: runtime.clone(),
            configuration_observer: ObserverSlot::new(),
            state_observer: ObserverSlot::new(),
            changes,
        });

        let cancel = CancellationToken::new();
        runtime.spawn(run_background(reconciler.clone(), refresh_interval, cancel.clone()));

        Ok(Self { reconciler, cancel })
    }

    /// Create a strategy from a [`SyncConfig`]
    pub fn from_config(
        config: &SyncConfig,
        remote: Arc<dyn RemoteStore>,
        delegate: Arc<dyn StorageStrategy>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        Self::new(config.breaker_id.clone(), remote, delegate, config.refresh_interval())
    }

    /// Breaker id
    pub fn id(&self) -> &str {
        self.reconciler.id()
    }

    /// Register the configuration observer, replacing any previous one
    pub fn on_configuration_change<F>(&self, observer: F)
    where
        F: Fn(&CircuitBreakerConfiguration, &CircuitBreakerConfiguration) + Send + Sync + 'static,
    {
        self.reconciler.configuration_observer.replace(Arc::new(observer));
    }

    /// Register the state observer, replacing any previous one
    pub fn on_state_change<F>(&self, observer: F)
    where
        F: Fn(&CircuitBreakerState, &CircuitBreakerState) + Send + Sync + 'static,
    {
        self.reconciler.state_observer.replace(Arc::new(observer));
    }

    /// Remove both observers
    pub fn clear_observers(&self) {
        self.reconciler.configuration_observer.clear();
        self.reconciler.state_observer.clear();
    }

    /// Subscribe to every change notification
    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.reconciler.changes.subscribe()
    }

    /// Run one configuration pass against the current local value
    pub async fn reconcile_configuration(&self) -> ReconcileOutcome {
        self.reconciler.reconcile_current::<CircuitBreakerConfiguration>().await
    }

    /// Run one state pass against the current local value
    pub async fn reconcile_state(&self) -> ReconcileOutcome {
        self.reconciler.reconcile_current::<CircuitBreakerState>().await
    }

    /// Run the configuration pass, then the state pass
    pub async fn refresh(&self) -> (ReconcileOutcome, ReconcileOutcome) {
        self.reconciler.refresh().await
    }

    /// Stop the background refresh loop
    pub fn shutdown(&self) {
        debug!("Shutting down reconciling storage strategy for breaker {}", self.id());
        self.cancel.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) was called
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for ReconcilingStorageStrategy {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl StorageStrategy for ReconcilingStorageStrategy {
    fn load_configuration(&self) -> CircuitBreakerConfiguration {
        let local = self.reconciler.delegate.load_configuration();
        self.reconciler.spawn_reconcile(local.clone());
        local
    }

    fn save_configuration(&self, configuration: CircuitBreakerConfiguration) {
        self.reconciler.delegate.save_configuration(configuration.clone());
        self.reconciler.spawn_push(configuration);
    }

    fn load_state(&self) -> CircuitBreakerState {
        let local = self.reconciler.delegate.load_state();
        self.reconciler.spawn_reconcile(local.clone());
        local
    }

    fn save_state(&self, state: CircuitBreakerState) {
        self.reconciler.delegate.save_state(state.clone());
        self.reconciler.spawn_push(state);
    }
}
