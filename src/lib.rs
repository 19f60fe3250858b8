//! Epicell: a reactive state container with epic side-effect handlers
//!
//! Epicell pairs a pure reducer with "epics" in a "pure core, imperative
//! shell" arrangement. The reducer is a pure function from state and action
//! to the next state; epics are effect handlers that observe the dispatched
//! action stream and the committed state, perform their I/O off to the side,
//! and feed further dispatches back in asynchronously.
//!
//! # Core Concepts
//!
//! - **Actions**: A closed vocabulary via the `Action` trait, decoded from
//!   external input only at the JSON boundary
//! - **Reducer**: One per container, in the direct (return the next state)
//!   or draft (edit a working copy) style
//! - **State cell**: A single authoritative value with deduplicated,
//!   replay-latest change streams
//! - **Epics**: Task-backed observers of the action stream, torn down with
//!   the container
//!
//! # Example
//!
//! ```rust
//! use epicell::{Action, Container, Outcome};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum CounterAction {
//!     Inc,
//!     Dec,
//! }
//!
//! impl Action for CounterAction {
//!     const KINDS: &'static [&'static str] = &["inc", "dec"];
//!
//!     fn kind(&self) -> &'static str {
//!         match self {
//!             Self::Inc => "inc",
//!             Self::Dec => "dec",
//!         }
//!     }
//! }
//!
//! let container = Container::builder()
//!     .initial_state(0_i64)
//!     .direct(|state: &i64, action: &CounterAction| {
//!         Ok(match action {
//!             CounterAction::Inc => Outcome::Next(state + 1),
//!             CounterAction::Dec => Outcome::Next(state - 1),
//!         })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let dispatcher = container.dispatcher();
//! dispatcher.dispatch(CounterAction::Inc).unwrap();
//! dispatcher.dispatch(CounterAction::Inc).unwrap();
//! dispatcher.dispatch(CounterAction::Dec).unwrap();
//! assert_eq!(*container.state().value(), 1);
//! ```

pub mod core;
pub mod runtime;
pub mod stream;

/// Default capacity of the action and state broadcast channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

// Re-export commonly used types
pub use crate::core::{
    decode_action, Action, BuildError, DirectReducer, DispatchError, Draft, DraftReducer,
    HandlerError, HandlerResult, Outcome, Reducer, TeardownError, TeardownFault,
};
pub use crate::runtime::{trace_epic, Container, ContainerBuilder, Dispatcher, Epic, EpicSubscription};
pub use crate::stream::{of_type, ActionStream, OfType, OfTypeExt, StateStream, StateView};
