//! Observable plumbing: the action bus, the state cell, and filters.
//!
//! Streams are the only way side-effect code observes a container. Epics
//! receive an [`ActionStream`] and a [`StateView`]; the cell and the bus
//! themselves never leave the runtime.

mod bus;
mod of_type;
mod state_view;

pub use bus::ActionStream;
pub use of_type::{of_type, OfType, OfTypeExt};
pub use state_view::{StateStream, StateView};

pub(crate) use bus::ActionBus;
pub(crate) use state_view::StateCell;
