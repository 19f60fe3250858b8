//! The reducer engine: pure state transitions in two styles.
//!
//! A container holds exactly one reducer. The reducer sees the current state
//! and one action, and decides the next state. Two authoring styles are
//! supported, chosen once per container at build time:
//!
//! - **Direct**: the handler borrows the state and returns an [`Outcome`] —
//!   either a freshly constructed next value or the explicit
//!   [`Outcome::NoChange`] sentinel.
//! - **Draft**: the handler receives a mutable working copy, edits it in
//!   place, and returns a [`Draft`] verdict. [`Draft::Untouched`] discards
//!   the copy and keeps the committed value's identity, so downstream
//!   deduplication elides the emission.
//!
//! Either way a handler may fail; the error aborts the pending commit and
//! reaches the dispatch caller with the state still at its last good value.

use std::sync::Arc;

use crate::core::error::HandlerError;

/// What a direct-style handler decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S> {
    /// Commit this value as the next state.
    Next(S),
    /// Leave the state cell alone. The action is still published to epics.
    NoChange,
}

/// What a draft-style handler did to its working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draft {
    /// The copy was edited and should become the next state.
    Mutated,
    /// The copy is abandoned; the committed value keeps its identity.
    Untouched,
}

/// Result type for direct-style handlers.
pub type HandlerResult<S> = Result<Outcome<S>, HandlerError>;

/// A state transition function over `Arc`-held state.
///
/// Implementations must be pure with respect to the state cell: they observe
/// the current value and the action, and report the next value (or the
/// decision not to produce one) without performing side effects. Side
/// effects belong in epics.
pub trait Reducer<S, A>: Send + Sync + 'static {
    /// Computes the next state for `action`, or `Outcome::NoChange` to keep
    /// the current one.
    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Outcome<Arc<S>>, HandlerError>;
}

/// Adapter for the direct "return the next state" style.
///
/// Wraps a `Fn(&S, &A) -> HandlerResult<S>` closure. A returned
/// [`Outcome::Next`] is moved into a fresh `Arc`; the sentinel passes
/// through untouched.
pub struct DirectReducer<F>(F);

impl<F> DirectReducer<F> {
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<S, A, F> Reducer<S, A> for DirectReducer<F>
where
    S: Send + Sync + 'static,
    A: Send + Sync + 'static,
    F: Fn(&S, &A) -> HandlerResult<S> + Send + Sync + 'static,
{
    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Outcome<Arc<S>>, HandlerError> {
        match (self.0)(state, action)? {
            Outcome::Next(next) => Ok(Outcome::Next(Arc::new(next))),
            Outcome::NoChange => Ok(Outcome::NoChange),
        }
    }
}

/// Adapter for the draft "edit a working copy" style.
///
/// The current state is cloned into a working copy before the handler runs.
/// [`Draft::Mutated`] promotes the copy to the next state;
/// [`Draft::Untouched`] returns the original `Arc`, so the cell sees the
/// exact same allocation and skips the commit.
pub struct DraftReducer<F>(F);

impl<F> DraftReducer<F> {
    pub fn new(handler: F) -> Self {
        Self(handler)
    }
}

impl<S, A, F> Reducer<S, A> for DraftReducer<F>
where
    S: Clone + Send + Sync + 'static,
    A: Send + Sync + 'static,
    F: Fn(&mut S, &A) -> Result<Draft, HandlerError> + Send + Sync + 'static,
{
    fn reduce(&self, state: &Arc<S>, action: &A) -> Result<Outcome<Arc<S>>, HandlerError> {
        let mut working = S::clone(state);
        match (self.0)(&mut working, action)? {
            Draft::Mutated => Ok(Outcome::Next(Arc::new(working))),
            Draft::Untouched => Ok(Outcome::Next(Arc::clone(state))),
        }
    }
}
