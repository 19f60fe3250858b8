//! The action vocabulary of a container.
//!
//! Actions form a closed set: the user defines one enum, derives the usual
//! serde/clone machinery, and implements [`Action`] so the runtime can name
//! each variant. Inside the process every dispatch carries a real enum value,
//! so "unknown action" is unrepresentable there. The only place an
//! unrecognized action can appear is the decode boundary, where external
//! input arrives as a kind string plus a JSON payload — [`decode_action`]
//! guards that door.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::error::DispatchError;

/// A member of a container's closed action vocabulary.
///
/// Implementations are enums whose variants each carry their own payload.
/// The discriminator returned by [`kind`](Action::kind) is what the filter
/// combinator and the decode boundary match on, so it must be stable and
/// unique per variant.
///
/// # Examples
///
/// ```
/// use epicell::Action;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// #[serde(tag = "type", content = "payload", rename_all = "snake_case")]
/// enum CounterAction {
///     Inc,
///     Dec,
///     SetDelay(u64),
/// }
///
/// impl Action for CounterAction {
///     const KINDS: &'static [&'static str] = &["inc", "dec", "set_delay"];
///
///     fn kind(&self) -> &'static str {
///         match self {
///             CounterAction::Inc => "inc",
///             CounterAction::Dec => "dec",
///             CounterAction::SetDelay(_) => "set_delay",
///         }
///     }
/// }
///
/// assert_eq!(CounterAction::SetDelay(400).kind(), "set_delay");
/// ```
pub trait Action: Clone + Debug + Send + Sync + 'static {
    /// Every discriminator the enum can produce.
    ///
    /// [`decode_action`] rejects kinds outside this set before touching the
    /// payload, and diagnostics use it to list what a container accepts.
    const KINDS: &'static [&'static str];

    /// The discriminator for this value's variant.
    fn kind(&self) -> &'static str;
}

/// Decodes external input into a concrete action.
///
/// Builds the adjacently tagged envelope `{"type": kind, "payload": ...}`
/// and hands it to serde. A `kind` outside [`Action::KINDS`] fails with
/// [`DispatchError::UnknownAction`] without inspecting the payload; a
/// recognized kind whose payload does not fit the variant fails with
/// [`DispatchError::MalformedPayload`].
///
/// A `null` payload is treated as absent, so unit variants decode from
/// `("inc", Value::Null)` without requiring callers to omit the field.
///
/// # Examples
///
/// ```
/// use epicell::{decode_action, Action, DispatchError};
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// #[serde(tag = "type", content = "payload", rename_all = "snake_case")]
/// enum CounterAction {
///     Inc,
///     SetDelay(u64),
/// }
///
/// impl Action for CounterAction {
///     const KINDS: &'static [&'static str] = &["inc", "set_delay"];
///
///     fn kind(&self) -> &'static str {
///         match self {
///             CounterAction::Inc => "inc",
///             CounterAction::SetDelay(_) => "set_delay",
///         }
///     }
/// }
///
/// let action: CounterAction = decode_action("set_delay", json!(400)).unwrap();
/// assert_eq!(action, CounterAction::SetDelay(400));
///
/// let err = decode_action::<CounterAction>("frobnicate", json!(null)).unwrap_err();
/// assert!(matches!(err, DispatchError::UnknownAction { .. }));
/// ```
pub fn decode_action<A>(kind: &str, payload: Value) -> Result<A, DispatchError>
where
    A: Action + DeserializeOwned,
{
    if !A::KINDS.contains(&kind) {
        return Err(DispatchError::UnknownAction {
            kind: kind.to_string(),
        });
    }

    let mut envelope = Map::new();
    envelope.insert("type".to_string(), Value::String(kind.to_string()));
    if !payload.is_null() {
        envelope.insert("payload".to_string(), payload);
    }

    serde_json::from_value(Value::Object(envelope)).map_err(|source| {
        DispatchError::MalformedPayload {
            kind: kind.to_string(),
            source,
        }
    })
}
