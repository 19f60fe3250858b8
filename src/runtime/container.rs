//! The container: one cell, one bus, one reducer, and the epics wired to
//! them.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::core::{Action, TeardownError};
use crate::runtime::builder::ContainerBuilder;
use crate::runtime::dispatch::{ContainerCore, Dispatcher};
use crate::runtime::runner::EpicRunner;
use crate::stream::StateView;

/// A running reactive state container.
///
/// Holds the authoritative state cell and the action bus, plus the drain
/// tasks of every registered epic. Callers interact through the handles:
/// [`Container::state`] for observation, [`Container::dispatcher`] for
/// input. Dropping the container aborts the epics; prefer
/// [`Container::shutdown`] for an orderly teardown that reports faults.
pub struct Container<S, A> {
    pub(crate) core: Arc<ContainerCore<S, A>>,
    pub(crate) view: StateView<S>,
    pub(crate) runner: EpicRunner,
}

impl<S, A> Container<S, A>
where
    S: PartialEq + Send + Sync + 'static,
    A: Action,
{
    /// Starts configuring a new container.
    pub fn builder() -> ContainerBuilder<S, A> {
        ContainerBuilder::new()
    }

    /// A read-only view onto this container's state.
    pub fn state(&self) -> StateView<S> {
        self.view.clone()
    }

    /// A dispatcher addressing this container.
    pub fn dispatcher(&self) -> Dispatcher<S, A> {
        Dispatcher::new(Arc::clone(&self.core))
    }

    /// This container's identity, as carried in its log events.
    pub fn id(&self) -> Uuid {
        self.core.id
    }

    /// Tears the container down.
    ///
    /// Closes the dispatch facade first, so no new action can slip in, then
    /// cancels every epic subscription. Teardown continues past individual
    /// epic failures; whatever went wrong is aggregated into the returned
    /// [`TeardownError`]. After shutdown every dispatcher clone fails with
    /// `DispatchError::Closed` and the state cell keeps its final value.
    pub async fn shutdown(mut self) -> Result<(), TeardownError> {
        self.core.close();
        debug!(container = %self.core.id, "container shutting down");
        self.runner.cancel_all().await
    }
}

impl<S, A> Drop for Container<S, A> {
    fn drop(&mut self) {
        self.core.close();
        self.runner.abort_all();
    }
}
