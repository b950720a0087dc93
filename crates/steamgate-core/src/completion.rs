//! One-shot completion handle for callback-convention operations.
//!
//! A backend operation that signals completion through a callback receives a
//! [`Completion`] in place of the original callback argument. The handle can
//! fire at most once; repeat invocations are ignored and the first delivered
//! result set wins.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;

/// Completion handle handed to a backend operation.
///
/// Cloneable so the backend can stash it wherever its own completion path
/// needs it; all clones share the same at-most-once guard.
#[derive(Clone)]
pub struct Completion {
    arg_index: usize,
    tx: Arc<Mutex<Option<oneshot::Sender<Vec<Value>>>>>,
}

/// Receiving side of a [`Completion`], held by the dispatcher.
pub struct CompletionReceiver {
    rx: oneshot::Receiver<Vec<Value>>,
}

impl Completion {
    /// Create a handle and the receiver that resolves when it fires.
    ///
    /// `arg_index` is the position the callback occupied in the operation's
    /// argument list.
    pub fn new(arg_index: usize) -> (Self, CompletionReceiver) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                arg_index,
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            CompletionReceiver { rx },
        )
    }

    /// Position the callback occupied in the operation's argument list.
    pub fn arg_index(&self) -> usize {
        self.arg_index
    }

    /// Fire the completion with the operation's results.
    ///
    /// Returns `true` on the first invocation. Later invocations deliver
    /// nothing and return `false`.
    pub fn complete(&self, results: Vec<Value>) -> bool {
        let Some(tx) = self.tx.lock().take() else {
            return false;
        };
        tx.send(results).is_ok()
    }

    /// Whether the handle has already fired.
    pub fn is_completed(&self) -> bool {
        self.tx.lock().is_none()
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("arg_index", &self.arg_index)
            .field("completed", &self.is_completed())
            .finish()
    }
}

impl CompletionReceiver {
    /// Wait for the completion to fire.
    ///
    /// Resolves to `None` if every handle was dropped without firing.
    pub async fn wait(self) -> Option<Vec<Value>> {
        self.rx.await.ok()
    }
}
