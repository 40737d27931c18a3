//! Action lock database - last server-confirmed lock per action

use std::collections::HashMap;
use std::fmt;

use animlock_core::{
    lock_ms, ActionId, DEFAULT_CLIENT_ANIMATION_LOCK, SIMULATED_RTT, UNSET_LOCK_THRESHOLD,
};
use tracing::{debug, warn};

use crate::LockPersister;

/// Persistent mapping from action id to raw confirmed lock (seconds)
pub struct ActionLockDatabase {
    /// Raw locks as confirmed by the server
    locks: HashMap<ActionId, f32>,
    /// Uncorrected client lock used for unknown actions
    default_lock: f32,
    /// Durability sink, called on every change
    persister: Box<dyn LockPersister>,
}

impl ActionLockDatabase {
    /// Create an empty database
    pub fn new(persister: impl LockPersister + 'static) -> Self {
        Self::from_map(HashMap::new(), persister)
    }

    /// Take ownership of a map loaded from configuration
    pub fn from_map(map: HashMap<u32, f32>, persister: impl LockPersister + 'static) -> Self {
        ActionLockDatabase {
            locks: map.into_iter().map(|(id, lock)| (ActionId(id), lock)).collect(),
            default_lock: DEFAULT_CLIENT_ANIMATION_LOCK,
            persister: Box::new(persister),
        }
    }

    /// Override the client default lock
    pub fn with_default_lock(mut self, default_lock: f32) -> Self {
        self.default_lock = default_lock;
        self
    }

    /// Client default lock for unknown actions
    pub fn default_lock(&self) -> f32 {
        self.default_lock
    }

    /// Raw stored lock, if any
    pub fn get(&self, id: ActionId) -> Option<f32> {
        self.locks.get(&id).copied()
    }

    /// Lock to apply for an action: stored or default, plus the simulated RTT
    ///
    /// Stored values below [`UNSET_LOCK_THRESHOLD`] are treated as unset.
    pub fn lookup(&self, id: ActionId) -> f32 {
        self.lookup_with_default(id, self.default_lock)
    }

    /// [`lookup`](Self::lookup) with the host's current client default
    pub fn lookup_with_default(&self, id: ActionId, default_lock: f32) -> f32 {
        let stored = self
            .get(id)
            .filter(|lock| *lock >= UNSET_LOCK_THRESHOLD)
            .unwrap_or(default_lock);
        stored + SIMULATED_RTT
    }

    /// Store a confirmed lock, persisting only when the value changed
    /// Returns true if the entry was written
    pub fn record(&mut self, id: ActionId, lock: f32) -> bool {
        if !lock.is_finite() || lock < 0.0 {
            debug!(action_id = %id, lock, "Refusing to record invalid animation lock");
            return false;
        }

        if self.get(id) == Some(lock) {
            return false;
        }

        self.locks.insert(id, lock);
        if let Err(e) = self.persister.persist(&self.snapshot()) {
            warn!(action_id = %id, error = %e, "Failed to persist animation lock database");
        }

        debug!(
            action_id = %id,
            "Recorded new animation lock value of {} ms for {}",
            lock_ms(lock),
            id
        );
        true
    }

    /// Copy of the database in its persisted form
    pub fn snapshot(&self) -> HashMap<u32, f32> {
        self.locks.iter().map(|(id, lock)| (id.0, *lock)).collect()
    }

    /// Number of recorded actions
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl fmt::Debug for ActionLockDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionLockDatabase")
            .field("entries", &self.locks.len())
            .field("default_lock", &self.default_lock)
            .finish()
    }
}
