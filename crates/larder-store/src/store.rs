//! The observable store wrapping the reducer.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::trace;

use crate::command::Command;
use crate::reducer;
use crate::state::AppState;

/// The before/after states of one applied command.
///
/// The change interceptor diffs these to decide what to push; both sides
/// are cheap shared snapshots.
#[derive(Debug, Clone)]
pub struct Applied {
    /// State immediately before the command ran.
    pub before: Arc<AppState>,
    /// State immediately after.
    pub after: Arc<AppState>,
}

/// The persisted local store's in-memory half.
///
/// Commands are applied atomically and serially under an internal lock;
/// observers receive each new state through a `watch` channel. The store
/// itself knows nothing about synchronization — provenance and push
/// decisions live a layer up.
#[derive(Debug)]
pub struct Store {
    state: Mutex<Arc<AppState>>,
    watch_tx: watch::Sender<Arc<AppState>>,
}

impl Store {
    /// Create a store over an initial state (usually the loaded snapshot).
    pub fn new(initial: AppState) -> Self {
        let initial = Arc::new(initial);
        let (watch_tx, _) = watch::channel(Arc::clone(&initial));
        Self {
            state: Mutex::new(initial),
            watch_tx,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Apply a command and return the before/after pair.
    pub fn apply(&self, command: &Command) -> Applied {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let before = Arc::clone(&guard);

        let mut next = (*before).clone();
        reducer::apply(&mut next, command);
        let after = Arc::new(next);

        *guard = Arc::clone(&after);
        drop(guard);

        trace!(?command, "command applied");
        // Receivers may all be gone; that is fine.
        let _ = self.watch_tx.send(Arc::clone(&after));

        Applied { before, after }
    }

    /// Observe every state change. The receiver starts at the current
    /// state.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.watch_tx.subscribe()
    }
}
