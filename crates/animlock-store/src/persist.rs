//! Persistence capability for the lock database
//!
//! The database calls [`LockPersister::persist`] with a full snapshot on
//! every change. Writers must not block event delivery for long; hosts that
//! write to disk should wrap their writer in a [`BackgroundPersister`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use animlock_core::{AnimLockError, AnimLockResult, Configuration};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Durability sink for lock snapshots
pub trait LockPersister: Send {
    /// Persist the complete lock map
    fn persist(&mut self, locks: &HashMap<u32, f32>) -> AnimLockResult<()>;
}

/// Discards every snapshot
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPersister;

impl LockPersister for NullPersister {
    fn persist(&mut self, _locks: &HashMap<u32, f32>) -> AnimLockResult<()> {
        Ok(())
    }
}

/// Keeps every snapshot in memory; clones share the same log
#[derive(Clone, Debug, Default)]
pub struct MemoryPersister {
    writes: Arc<Mutex<Vec<HashMap<u32, f32>>>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        MemoryPersister::default()
    }

    /// All snapshots received so far, oldest first
    pub fn writes(&self) -> Vec<HashMap<u32, f32>> {
        self.writes.lock().clone()
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<HashMap<u32, f32>> {
        self.writes.lock().last().cloned()
    }
}

impl LockPersister for MemoryPersister {
    fn persist(&mut self, locks: &HashMap<u32, f32>) -> AnimLockResult<()> {
        self.writes.lock().push(locks.clone());
        Ok(())
    }
}

/// Writes the lock map into the JSON settings file, keeping the other settings
#[derive(Clone, Debug)]
pub struct JsonFilePersister {
    path: PathBuf,
}

impl JsonFilePersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFilePersister { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl LockPersister for JsonFilePersister {
    fn persist(&mut self, locks: &HashMap<u32, f32>) -> AnimLockResult<()> {
        let mut config = Configuration::load(&self.path)?;
        config.animation_locks = locks.clone();
        config.save(&self.path)?;
        debug!(path = %self.path.display(), entries = locks.len(), "Saved animation locks");
        Ok(())
    }
}

/// Fire-and-forget writer running on a tokio runtime
///
/// Snapshots queued while a write is in flight are coalesced; only the
/// newest one reaches the inner persister.
pub struct BackgroundPersister {
    tx: mpsc::UnboundedSender<HashMap<u32, f32>>,
    task: JoinHandle<()>,
}

impl BackgroundPersister {
    /// Spawn the writer task on `handle`
    pub fn spawn<P: LockPersister + 'static>(handle: &Handle, inner: P) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<HashMap<u32, f32>>();
        let inner = Arc::new(Mutex::new(inner));

        let task = handle.spawn(async move {
            while let Some(mut snapshot) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    snapshot = newer;
                }

                let inner = Arc::clone(&inner);
                let result =
                    tokio::task::spawn_blocking(move || inner.lock().persist(&snapshot)).await;

                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!(error = %e, "Background lock persist failed"),
                    Err(e) => warn!(error = %e, "Background lock writer aborted"),
                }
            }
        });

        BackgroundPersister { tx, task }
    }

    /// Stop accepting snapshots; the returned handle completes once the queue is drained
    pub fn shutdown(self) -> JoinHandle<()> {
        drop(self.tx);
        self.task
    }
}

impl LockPersister for BackgroundPersister {
    fn persist(&mut self, locks: &HashMap<u32, f32>) -> AnimLockResult<()> {
        self.tx
            .send(locks.clone())
            .map_err(|_| AnimLockError::Persistence("background writer stopped".into()))
    }
}
