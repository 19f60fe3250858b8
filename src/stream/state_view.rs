//! The state cell and its read-only observable views.
//!
//! The cell is the single authoritative home of a container's state. Commits
//! go through [`StateCell::commit`], which suppresses values that are
//! unchanged (same allocation or equal by `PartialEq`) and broadcasts the
//! rest in commit order. [`StateView`] is the handle epics and callers hold:
//! a synchronous read of the latest value plus a change stream that replays
//! the current value to each fresh subscriber.

use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// Authoritative state holder with distinct-change publishing.
pub(crate) struct StateCell<S> {
    value: RwLock<Arc<S>>,
    sender: broadcast::Sender<Arc<S>>,
}

impl<S: Send + Sync + 'static> StateCell<S> {
    pub(crate) fn new(initial: Arc<S>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            value: RwLock::new(initial),
            sender,
        }
    }

    /// The latest committed value.
    pub(crate) fn value(&self) -> Arc<S> {
        match self.value.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}

impl<S: PartialEq + Send + Sync + 'static> StateCell<S> {
    /// Installs `next` as the current value and broadcasts it.
    ///
    /// Returns `false` without emitting when `next` is the same allocation
    /// as the current value or compares equal to it. Emissions happen in
    /// commit order; a subscriber that cannot keep up skips the gap on its
    /// own side rather than blocking the cell.
    pub(crate) fn commit(&self, next: Arc<S>) -> bool {
        {
            let mut guard = match self.value.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if Arc::ptr_eq(&guard, &next) || **guard == *next {
                debug!("commit elided: value unchanged");
                return false;
            }
            *guard = Arc::clone(&next);
        }
        // Send outside the lock; a send error just means nobody is watching.
        let _ = self.sender.send(next);
        true
    }
}

/// Read-only handle onto a container's state.
///
/// Cloning a view is cheap and every clone observes the same cell.
pub struct StateView<S> {
    cell: Arc<StateCell<S>>,
}

impl<S> Clone for StateView<S> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<S: Send + Sync + 'static> StateView<S> {
    pub(crate) fn new(cell: Arc<StateCell<S>>) -> Self {
        Self { cell }
    }

    /// The latest committed value, read synchronously.
    pub fn value(&self) -> Arc<S> {
        self.cell.value()
    }

    /// Subscribes to state changes.
    ///
    /// The returned stream yields the current value immediately, then every
    /// distinct committed value in commit order. Adjacent duplicates are
    /// never yielded; values are otherwise never coalesced.
    pub fn changes(&self) -> StateStream<S> {
        // Subscribe before snapshotting so no commit lands in between; a
        // commit racing the snapshot shows up twice and is elided by the
        // last-yielded guard below.
        let receiver = self.cell.sender.subscribe();
        let current = self.cell.value();
        StateStream {
            replay: Some(current),
            last: None,
            inner: BroadcastStream::new(receiver),
        }
    }
}

/// Stream of distinct committed state values, current value first.
pub struct StateStream<S> {
    replay: Option<Arc<S>>,
    last: Option<Arc<S>>,
    inner: BroadcastStream<Arc<S>>,
}

impl<S: Send + Sync + 'static> StateStream<S> {
    /// Receives the next distinct value, or `None` once the container is gone.
    pub async fn recv(&mut self) -> Option<Arc<S>> {
        self.next().await
    }
}

impl<S: Send + Sync + 'static> Stream for StateStream<S> {
    type Item = Arc<S>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(current) = this.replay.take() {
            this.last = Some(Arc::clone(&current));
            return Poll::Ready(Some(current));
        }
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(value))) => {
                    if let Some(last) = &this.last {
                        if Arc::ptr_eq(last, &value) {
                            continue;
                        }
                    }
                    this.last = Some(Arc::clone(&value));
                    return Poll::Ready(Some(value));
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(missed)))) => {
                    warn!(missed, "state subscriber lagged; skipping missed values");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
