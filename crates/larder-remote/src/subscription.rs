//! Realtime subscription handles.

use tokio::task::JoinHandle;

/// A live subscription to a remote collection or document.
///
/// Dropping the handle cancels the forwarder task, so holding the handle
/// is what keeps the subscription alive. This is the unsubscribe
/// mechanism: the orchestrator tears a subscription down by letting its
/// handle go out of scope.
#[derive(Debug)]
pub struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Wrap a spawned forwarder task.
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Cancel the subscription explicitly.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
