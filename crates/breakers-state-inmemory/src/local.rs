//! In-process storage strategy
//!
//! This is the default local delegate: it keeps the last saved configuration
//! and state in memory and hands out clones.

use parking_lot::RwLock;
use tracing::trace;

use breakers_core::{CircuitBreakerConfiguration, CircuitBreakerState, StorageStrategy};

/// In-memory implementation of StorageStrategy
#[derive(Debug)]
pub struct InMemoryStorageStrategy {
    configuration: RwLock<CircuitBreakerConfiguration>,
    state: RwLock<CircuitBreakerState>,
}

impl InMemoryStorageStrategy {
    /// Create a store seeded with an initial configuration and state
    pub fn new(configuration: CircuitBreakerConfiguration, state: CircuitBreakerState) -> Self {
        Self {
            configuration: RwLock::new(configuration),
            state: RwLock::new(state),
        }
    }
}

impl Default for InMemoryStorageStrategy {
    fn default() -> Self {
        Self::new(CircuitBreakerConfiguration::default(), CircuitBreakerState::default())
    }
}

impl StorageStrategy for InMemoryStorageStrategy {
    fn load_configuration(&self) -> CircuitBreakerConfiguration {
        self.configuration.read().clone()
    }

    fn save_configuration(&self, configuration: CircuitBreakerConfiguration) {
        trace!("Saving local configuration: {:?}", configuration);
        *self.configuration.write() = configuration;
    }

    fn load_state(&self) -> CircuitBreakerState {
        self.state.read().clone()
    }

    fn save_state(&self, state: CircuitBreakerState) {
        trace!("Saving local state: {:?}", state);
        *self.state.write() = state;
    }
}
