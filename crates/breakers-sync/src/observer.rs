//! Change notification for reconciled values
//!
//! Each value type has a single observer slot; registering replaces the
//! previous observer. Every notification is also published as a
//! [`StorageChange`] on a broadcast channel for any number of subscribers.

use std::sync::Arc;

use parking_lot::RwLock;

use breakers_core::{CircuitBreakerConfiguration, CircuitBreakerState};

/// Callback receiving `(previous, next)`
pub type ChangeObserver<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// A change produced by reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    /// The configuration was adopted from remote or repaired on remote
    Configuration {
        /// Local value before reconciliation
        previous: CircuitBreakerConfiguration,
        /// Value now held locally
        next: CircuitBreakerConfiguration,
    },
    /// The state was adopted from remote or repaired on remote
    State {
        /// Local value before reconciliation
        previous: CircuitBreakerState,
        /// Value now held locally
        next: CircuitBreakerState,
    },
}

impl StorageChange {
    /// Whether this notification reports a remote repair, not a value change
    pub fn is_repair(&self) -> bool {
        match self {
            StorageChange::Configuration { previous, next } => previous == next,
            StorageChange::State { previous, next } => previous == next,
        }
    }
}

/// Single-observer slot
pub struct ObserverSlot<T> {
    observer: RwLock<Option<ChangeObserver<T>>>,
}

impl<T> ObserverSlot<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self {
            observer: RwLock::new(None),
        }
    }

    /// Install an observer, dropping the previous one
    pub fn replace(&self, observer: ChangeObserver<T>) {
        *self.observer.write() = Some(observer);
    }

    /// Remove the current observer
    pub fn clear(&self) {
        *self.observer.write() = None;
    }

    /// Invoke the observer, if any; returns whether one was called
    pub fn notify(&self, previous: &T, next: &T) -> bool {
        // clone out so the observer may re-register without deadlocking
        let observer = self.observer.read().clone();
        match observer {
            Some(observer) => {
                observer(previous, next);
                true
            }
            None => false,
        }
    }
}

impl<T> Default for ObserverSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
