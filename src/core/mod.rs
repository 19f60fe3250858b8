//! Core action and reducer types.
//!
//! This module contains the pure functional core of the container:
//! - Action vocabulary via the `Action` trait and its decode boundary
//! - The reducer engine with its two authoring styles
//! - The error taxonomy
//!
//! All logic in this module is pure (no side effects), following
//! the "pure core, imperative shell" philosophy.

mod action;
mod error;
mod reducer;

pub use action::{decode_action, Action};
pub use error::{BuildError, DispatchError, HandlerError, TeardownError, TeardownFault};
pub use reducer::{DirectReducer, Draft, DraftReducer, HandlerResult, Outcome, Reducer};
