//! The dispatch facade: reduce, commit, publish — atomically, in that order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::core::{decode_action, Action, DispatchError, Outcome, Reducer};
use crate::stream::{ActionBus, StateCell};

/// Shared guts of one container: the cell, the bus, the reducer, and the
/// dispatch lock that serializes them.
pub(crate) struct ContainerCore<S, A> {
    pub(crate) id: Uuid,
    pub(crate) reducer: Box<dyn Reducer<S, A>>,
    pub(crate) cell: Arc<StateCell<S>>,
    pub(crate) bus: ActionBus<A>,
    dispatch_lock: Mutex<()>,
    closed: AtomicBool,
}

impl<S, A> ContainerCore<S, A> {
    pub(crate) fn new(
        id: Uuid,
        reducer: Box<dyn Reducer<S, A>>,
        cell: Arc<StateCell<S>>,
        bus: ActionBus<A>,
    ) -> Self {
        Self {
            id,
            reducer,
            cell,
            bus,
            dispatch_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Entry point for feeding actions into a container.
///
/// Dispatchers are cheap to clone and every clone addresses the same
/// container; [`Dispatcher::same_container`] makes the shared identity
/// checkable. Epics receive one, and callers obtain one from the container.
pub struct Dispatcher<S, A> {
    core: Arc<ContainerCore<S, A>>,
}

impl<S, A> Clone for Dispatcher<S, A> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<S, A> Dispatcher<S, A>
where
    S: PartialEq + Send + Sync + 'static,
    A: Action,
{
    pub(crate) fn new(core: Arc<ContainerCore<S, A>>) -> Self {
        Self { core }
    }

    /// Runs one action through the container.
    ///
    /// The sequence is: take the dispatch lock, reduce against the current
    /// state, commit the outcome (unless the reducer kept the state), then
    /// publish the action to the bus. The whole sequence is atomic per call;
    /// concurrent dispatches queue on the lock and run in acquisition order.
    /// The commit always happens before the publish, so an epic that reads
    /// the state on seeing an action observes that action's effect.
    ///
    /// A failing reducer aborts the call before anything is committed or
    /// published, and after teardown every call fails with
    /// [`DispatchError::Closed`].
    pub fn dispatch(&self, action: A) -> Result<(), DispatchError> {
        if self.core.is_closed() {
            return Err(DispatchError::Closed);
        }
        let _guard = match self.core.dispatch_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.core.is_closed() {
            return Err(DispatchError::Closed);
        }

        let kind = action.kind();
        let current = self.core.cell.value();
        let outcome = self
            .core
            .reducer
            .reduce(&current, &action)
            .map_err(|source| DispatchError::Reducer { kind, source })?;

        match outcome {
            Outcome::Next(next) => {
                let committed = self.core.cell.commit(next);
                debug!(container = %self.core.id, kind, committed, "action reduced");
            }
            Outcome::NoChange => {
                debug!(container = %self.core.id, kind, "action kept the state");
            }
        }
        self.core.bus.publish(action);
        Ok(())
    }

    /// Decodes external input and dispatches the resulting action.
    ///
    /// This is the one entry point where an unknown action kind can be
    /// observed, as [`DispatchError::UnknownAction`].
    pub fn dispatch_json(&self, kind: &str, payload: Value) -> Result<(), DispatchError>
    where
        A: DeserializeOwned,
    {
        let action = decode_action(kind, payload)?;
        self.dispatch(action)
    }

    /// The discriminators this container's action type can produce.
    pub fn kinds(&self) -> &'static [&'static str] {
        A::KINDS
    }

    /// Whether `other` addresses the same container as `self`.
    pub fn same_container(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> crate::stream::StateView<S> {
        crate::stream::StateView::new(Arc::clone(&self.core.cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DirectReducer, HandlerResult};
    use crate::DEFAULT_CHANNEL_CAPACITY;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Inc,
        Dec,
        Noop,
    }

    impl Action for Msg {
        const KINDS: &'static [&'static str] = &["inc", "dec", "noop"];

        fn kind(&self) -> &'static str {
            match self {
                Msg::Inc => "inc",
                Msg::Dec => "dec",
                Msg::Noop => "noop",
            }
        }
    }

    fn dispatcher(initial: i64) -> Dispatcher<i64, Msg> {
        let reducer = DirectReducer::new(|state: &i64, action: &Msg| -> HandlerResult<i64> {
            match action {
                Msg::Inc => Ok(Outcome::Next(state + 1)),
                Msg::Dec => {
                    if *state == 0 {
                        return Err("underflow".into());
                    }
                    Ok(Outcome::Next(state - 1))
                }
                Msg::Noop => Ok(Outcome::NoChange),
            }
        });
        let cell = Arc::new(StateCell::new(Arc::new(initial), DEFAULT_CHANNEL_CAPACITY));
        let bus = ActionBus::new(DEFAULT_CHANNEL_CAPACITY);
        let core = ContainerCore::new(Uuid::new_v4(), Box::new(reducer), cell, bus);
        Dispatcher::new(Arc::new(core))
    }

    #[tokio::test]
    async fn dispatch_commits_then_publishes() {
        let dispatcher = dispatcher(0);
        let mut actions = dispatcher.core.bus.stream();
        dispatcher.dispatch(Msg::Inc).unwrap();
        assert_eq!(*dispatcher.view().value(), 1);
        assert_eq!(actions.recv().await, Some(Msg::Inc));
    }

    #[tokio::test]
    async fn sentinel_skips_the_commit_but_not_the_publish() {
        let dispatcher = dispatcher(5);
        let mut actions = dispatcher.core.bus.stream();
        dispatcher.dispatch(Msg::Noop).unwrap();
        assert_eq!(*dispatcher.view().value(), 5);
        assert_eq!(actions.recv().await, Some(Msg::Noop));
    }

    #[tokio::test]
    async fn reducer_failure_aborts_the_whole_call() {
        let dispatcher = dispatcher(0);
        let mut actions = dispatcher.core.bus.stream();
        let err = dispatcher.dispatch(Msg::Dec).unwrap_err();
        assert!(matches!(err, DispatchError::Reducer { kind: "dec", .. }));
        assert_eq!(*dispatcher.view().value(), 0);

        // Nothing was published for the failed dispatch.
        dispatcher.dispatch(Msg::Inc).unwrap();
        assert_eq!(actions.recv().await, Some(Msg::Inc));
    }

    #[test]
    fn closed_core_rejects_every_dispatch() {
        let dispatcher = dispatcher(3);
        dispatcher.core.close();
        let err = dispatcher.dispatch(Msg::Inc).unwrap_err();
        assert!(matches!(err, DispatchError::Closed));
        assert_eq!(*dispatcher.view().value(), 3);
    }

    #[test]
    fn clones_share_the_container() {
        let a = dispatcher(0);
        let b = a.clone();
        let unrelated = dispatcher(0);
        assert!(a.same_container(&b));
        assert!(!a.same_container(&unrelated));
        assert_eq!(a.kinds(), b.kinds());
    }
}
