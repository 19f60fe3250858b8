//! Subscribing epics and tearing them down again.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::{Action, TeardownError, TeardownFault};
use crate::runtime::dispatch::{ContainerCore, Dispatcher};
use crate::runtime::epic::Epic;
use crate::stream::StateView;

/// Handle on one running epic's drain task.
pub struct EpicSubscription {
    index: usize,
    handle: Option<JoinHandle<()>>,
}

impl EpicSubscription {
    /// Aborts the drain task. Safe to call more than once; only the first
    /// call returns the handle for reaping.
    pub fn cancel(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.handle.take()?;
        handle.abort();
        debug!(epic = self.index, "epic subscription cancelled");
        Some(handle)
    }

    /// Whether [`cancel`](EpicSubscription::cancel) has already run.
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_none()
    }
}

/// Owns the drain tasks of every epic registered on one container.
pub(crate) struct EpicRunner {
    subscriptions: Vec<EpicSubscription>,
}

impl EpicRunner {
    pub(crate) fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Invokes each epic exactly once and spawns a task that drains its
    /// output stream until the stream ends or the task is aborted.
    pub(crate) fn subscribe_all<S, A>(
        &mut self,
        epics: Vec<Box<dyn Epic<S, A>>>,
        core: &Arc<ContainerCore<S, A>>,
        view: &StateView<S>,
    ) where
        S: PartialEq + Send + Sync + 'static,
        A: Action,
    {
        for (index, epic) in epics.into_iter().enumerate() {
            let actions = core.bus.stream();
            let dispatcher = Dispatcher::new(Arc::clone(core));
            let mut output = epic.run(actions, view.clone(), dispatcher);
            let handle = tokio::spawn(async move {
                while output.next().await.is_some() {}
                debug!(epic = index, "epic output stream ended");
            });
            self.subscriptions.push(EpicSubscription {
                index,
                handle: Some(handle),
            });
        }
    }

    /// Cancels every subscription and reaps the tasks.
    ///
    /// Continues past individual failures: a panicked epic is recorded as a
    /// fault and the remaining subscriptions are still cancelled. Faults are
    /// aggregated into one [`TeardownError`].
    pub(crate) async fn cancel_all(&mut self) -> Result<(), TeardownError> {
        let mut faults = Vec::new();
        for subscription in &mut self.subscriptions {
            let index = subscription.index;
            let Some(handle) = subscription.cancel() else {
                continue;
            };
            match handle.await {
                Ok(()) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    warn!(epic = index, %err, "epic failed during teardown");
                    faults.push(TeardownFault {
                        epic: index,
                        reason: err.to_string(),
                    });
                }
            }
        }
        if faults.is_empty() {
            Ok(())
        } else {
            Err(TeardownError { faults })
        }
    }

    /// Last-resort synchronous abort, for `Drop`.
    pub(crate) fn abort_all(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let handle = tokio::spawn(async {
            futures::future::pending::<()>().await;
        });
        let mut subscription = EpicSubscription {
            index: 0,
            handle: Some(handle),
        };
        assert!(!subscription.is_cancelled());
        assert!(subscription.cancel().is_some());
        assert!(subscription.is_cancelled());
        assert!(subscription.cancel().is_none());
    }

    #[tokio::test]
    async fn cancel_all_reports_panicked_epics_and_keeps_going() {
        let mut runner = EpicRunner::new();
        runner.subscriptions.push(EpicSubscription {
            index: 0,
            handle: Some(tokio::spawn(async {
                panic!("epic blew up");
            })),
        });
        runner.subscriptions.push(EpicSubscription {
            index: 1,
            handle: Some(tokio::spawn(async {
                futures::future::pending::<()>().await;
            })),
        });

        // Let the panicking task run to completion first.
        tokio::task::yield_now().await;
        let err = runner.cancel_all().await.unwrap_err();
        assert_eq!(err.faults.len(), 1);
        assert_eq!(err.faults[0].epic, 0);
        assert!(runner.subscriptions.iter().all(|s| s.is_cancelled()));
    }

    #[tokio::test]
    async fn cancel_all_is_clean_for_healthy_epics() {
        let mut runner = EpicRunner::new();
        for index in 0..3 {
            runner.subscriptions.push(EpicSubscription {
                index,
                handle: Some(tokio::spawn(async {
                    futures::future::pending::<()>().await;
                })),
            });
        }
        runner.cancel_all().await.unwrap();
    }
}
