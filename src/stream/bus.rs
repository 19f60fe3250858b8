//! The ordered action bus.
//!
//! Every container owns exactly one bus. Dispatch publishes each action to
//! the bus after the commit step, and every epic holds its own subscription.
//! Delivery is fan-out in publish order with no replay: a subscriber that
//! arrives late starts from the next publish, and one that falls behind a
//! full channel skips the gap rather than stalling the publisher.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, warn};

/// Fan-out sender for dispatched actions.
///
/// Internal to the container; epics only ever see [`ActionStream`]s handed
/// out by [`ActionBus::stream`].
pub(crate) struct ActionBus<A> {
    sender: broadcast::Sender<A>,
}

impl<A: Clone + Send + 'static> ActionBus<A> {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an action to all live subscribers, returning how many
    /// received it. Zero subscribers is not an error; the action simply
    /// had no audience.
    pub(crate) fn publish(&self, action: A) -> usize {
        match self.sender.send(action) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("action published with no subscribers");
                0
            }
        }
    }

    /// Opens a fresh subscription starting at the next publish.
    pub(crate) fn stream(&self) -> ActionStream<A> {
        ActionStream {
            inner: BroadcastStream::new(self.sender.subscribe()),
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// An ordered stream of dispatched actions.
///
/// Yields every action published after the subscription was opened, in
/// publish order. If the subscriber lags behind the channel capacity the
/// missed actions are skipped with a warning; the stream ends when the
/// container's bus is dropped.
pub struct ActionStream<A> {
    inner: BroadcastStream<A>,
}

impl<A: Clone + Send + 'static> ActionStream<A> {
    /// Receives the next action, or `None` once the container is gone.
    pub async fn recv(&mut self) -> Option<A> {
        self.next().await
    }
}

impl<A: Clone + Send + 'static> Stream for ActionStream<A> {
    type Item = A;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(action))) => return Poll::Ready(Some(action)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(missed)))) => {
                    warn!(missed, "action subscriber lagged; skipping missed actions");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
