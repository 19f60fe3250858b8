//! Epics: where side effects live.
//!
//! An epic is invoked exactly once, when its container is built. It receives
//! the container's action stream, a state view, and a dispatcher, and
//! returns an output stream. The runner drains that stream for as long as
//! the container lives; the items carry no information, draining is just
//! what keeps the epic's work running. An epic that wants to feed actions
//! back in calls the dispatcher from inside its stream.

use std::fmt::Debug;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::debug;

use crate::core::Action;
use crate::runtime::dispatch::Dispatcher;
use crate::stream::{ActionStream, StateView};

/// A side-effect handler wired to one container.
///
/// Implemented for any `FnOnce` closure with the right signature, so most
/// epics are written inline:
///
/// ```
/// use epicell::{ActionStream, Dispatcher, Epic, StateView};
/// use futures::StreamExt;
///
/// fn quiet_epic<S, A>() -> impl Epic<S, A>
/// where
///     S: Send + Sync + 'static,
///     A: epicell::Action,
/// {
///     |actions: ActionStream<A>, _state: StateView<S>, _dispatcher: Dispatcher<S, A>| {
///         actions.map(|_| ())
///     }
/// }
/// ```
pub trait Epic<S, A>: Send + 'static {
    /// Consumes the epic, producing its output stream. Called exactly once.
    fn run(
        self: Box<Self>,
        actions: ActionStream<A>,
        state: StateView<S>,
        dispatcher: Dispatcher<S, A>,
    ) -> BoxStream<'static, ()>;
}

impl<S, A, F, St> Epic<S, A> for F
where
    F: FnOnce(ActionStream<A>, StateView<S>, Dispatcher<S, A>) -> St + Send + 'static,
    St: futures::Stream<Item = ()> + Send + 'static,
{
    fn run(
        self: Box<Self>,
        actions: ActionStream<A>,
        state: StateView<S>,
        dispatcher: Dispatcher<S, A>,
    ) -> BoxStream<'static, ()> {
        (*self)(actions, state, dispatcher).boxed()
    }
}

/// A ready-made epic that logs every action it observes, together with the
/// state value at observation time, and emits nothing else.
pub fn trace_epic<S, A>() -> impl Epic<S, A>
where
    S: Debug + Send + Sync + 'static,
    A: Action,
{
    |actions: ActionStream<A>, state: StateView<S>, _dispatcher: Dispatcher<S, A>| {
        futures::stream::unfold((actions, state), |(mut actions, state)| async move {
            let action = actions.recv().await?;
            debug!(kind = action.kind(), state = ?state.value(), "action observed");
            Some(((), (actions, state)))
        })
    }
}
