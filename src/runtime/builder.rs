//! Fluent construction of a [`Container`].

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::core::{
    Action, BuildError, DirectReducer, Draft, DraftReducer, HandlerError, HandlerResult, Reducer,
};
use crate::runtime::container::Container;
use crate::runtime::dispatch::ContainerCore;
use crate::runtime::epic::Epic;
use crate::runtime::runner::EpicRunner;
use crate::stream::{ActionBus, StateCell, StateView};
use crate::DEFAULT_CHANNEL_CAPACITY;

enum InitialState<S> {
    Value(S),
    Lazy(Box<dyn FnOnce() -> S + Send>),
}

impl<S> InitialState<S> {
    fn resolve(self) -> S {
        match self {
            InitialState::Value(value) => value,
            InitialState::Lazy(init) => init(),
        }
    }
}

/// Builder for [`Container`].
///
/// Requires an initial state (eager or lazy) and exactly one reducer,
/// configured in either the direct or the draft style. Epics are optional.
///
/// # Examples
///
/// ```
/// use epicell::{Container, Outcome};
///
/// #[derive(Debug, Clone, PartialEq)]
/// enum Msg { Inc }
///
/// impl epicell::Action for Msg {
///     const KINDS: &'static [&'static str] = &["inc"];
///     fn kind(&self) -> &'static str { "inc" }
/// }
///
/// let container = Container::builder()
///     .initial_state(0_i64)
///     .direct(|state: &i64, _action: &Msg| Ok(Outcome::Next(state + 1)))
///     .build()
///     .unwrap();
///
/// container.dispatcher().dispatch(Msg::Inc).unwrap();
/// assert_eq!(*container.state().value(), 1);
/// ```
pub struct ContainerBuilder<S, A> {
    initial: Option<InitialState<S>>,
    reducer: Option<Box<dyn Reducer<S, A>>>,
    epics: Vec<Box<dyn Epic<S, A>>>,
    capacity: usize,
}

impl<S, A> ContainerBuilder<S, A>
where
    S: PartialEq + Send + Sync + 'static,
    A: Action,
{
    pub fn new() -> Self {
        Self {
            initial: None,
            reducer: None,
            epics: Vec::new(),
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sets the initial state directly.
    pub fn initial_state(mut self, state: S) -> Self {
        self.initial = Some(InitialState::Value(state));
        self
    }

    /// Sets a lazy initializer, evaluated once inside `build()`.
    pub fn init_with<F>(mut self, init: F) -> Self
    where
        F: FnOnce() -> S + Send + 'static,
    {
        self.initial = Some(InitialState::Lazy(Box::new(init)));
        self
    }

    /// Installs a prebuilt reducer.
    pub fn reducer<R>(mut self, reducer: R) -> Self
    where
        R: Reducer<S, A>,
    {
        self.reducer = Some(Box::new(reducer));
        self
    }

    /// Configures the direct update style: the handler returns the next
    /// state, or `Outcome::NoChange` to keep the current one.
    pub fn direct<F>(self, handler: F) -> Self
    where
        F: Fn(&S, &A) -> HandlerResult<S> + Send + Sync + 'static,
    {
        self.reducer(DirectReducer::new(handler))
    }

    /// Configures the draft update style: the handler edits a working copy
    /// and reports whether it touched it.
    pub fn draft<F>(self, handler: F) -> Self
    where
        S: Clone,
        F: Fn(&mut S, &A) -> Result<Draft, HandlerError> + Send + Sync + 'static,
    {
        self.reducer(DraftReducer::new(handler))
    }

    /// Registers an epic. Epics are invoked in registration order, each
    /// exactly once, when `build()` runs.
    pub fn epic<E>(mut self, epic: E) -> Self
    where
        E: Epic<S, A>,
    {
        self.epics.push(Box::new(epic));
        self
    }

    /// Overrides the capacity of the action and state channels.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Validates the configuration and starts the container.
    ///
    /// Must run inside a Tokio runtime when epics are registered, since
    /// each epic's output stream is drained by a spawned task.
    pub fn build(self) -> Result<Container<S, A>, BuildError> {
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let reducer = self.reducer.ok_or(BuildError::MissingReducer)?;

        let id = Uuid::new_v4();
        let cell = Arc::new(StateCell::new(Arc::new(initial.resolve()), self.capacity));
        let bus = ActionBus::new(self.capacity);
        let core = Arc::new(ContainerCore::new(id, reducer, Arc::clone(&cell), bus));
        let view = StateView::new(cell);

        let mut runner = EpicRunner::new();
        let epic_count = self.epics.len();
        runner.subscribe_all(self.epics, &core, &view);
        debug!(container = %id, epics = epic_count, "container started");

        Ok(Container { core, view, runner })
    }
}

impl<S, A> Default for ContainerBuilder<S, A>
where
    S: PartialEq + Send + Sync + 'static,
    A: Action,
{
    fn default() -> Self {
        Self::new()
    }
}
