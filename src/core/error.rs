//! Error taxonomy for dispatch, construction, and teardown.

use thiserror::Error;

/// Boxed error returned by a failing reducer handler.
///
/// Handlers report domain failures through this type; the dispatch facade
/// wraps it in [`DispatchError::Reducer`] and surfaces it synchronously to
/// the caller. The pending commit is aborted, so the state cell stays at its
/// last good value.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the dispatch facade.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The decode boundary was handed a discriminator that names no variant
    /// of the action type.
    #[error("Unknown action type '{kind}'")]
    UnknownAction { kind: String },

    /// The discriminator was recognized but the payload did not deserialize
    /// into the variant's arguments.
    #[error("Malformed payload for action '{kind}'")]
    MalformedPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// The handler for this action failed. Nothing was committed and the
    /// action was not published.
    #[error("Reducer failed for action '{kind}'")]
    Reducer {
        kind: &'static str,
        #[source]
        source: HandlerError,
    },

    /// The container was torn down; its state cell will not be resurrected.
    #[error("Container is torn down; dispatch is no longer possible")]
    Closed,
}

/// Errors that can occur when building a container.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial_state(state) or .init_with(f) before .build()")]
    MissingInitialState,

    #[error("Reducer not specified. Call .direct(handler) or .draft(handler) before .build()")]
    MissingReducer,
}

/// A single epic that failed while being torn down.
#[derive(Debug, Error)]
#[error("epic #{epic} failed during teardown: {reason}")]
pub struct TeardownFault {
    /// Registration index of the epic within its container.
    pub epic: usize,
    /// Why the unsubscribe failed, typically a captured panic message.
    pub reason: String,
}

/// Aggregate teardown failure.
///
/// Teardown continues past individual failures so that live timers and
/// requests never outlive the container; everything that went wrong along
/// the way is collected here.
#[derive(Debug, Error)]
#[error("teardown completed with {} epic fault(s)", .faults.len())]
pub struct TeardownError {
    pub faults: Vec<TeardownFault>,
}
