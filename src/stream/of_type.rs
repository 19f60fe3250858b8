//! Filtering an action stream by discriminator.
//!
//! Epics rarely care about the whole vocabulary; `of_type` narrows a stream
//! to the kinds an epic reacts to, preserving order and payloads.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::core::Action;

/// Filters `stream` down to actions whose kind matches one of `kinds`.
///
/// Order and payloads pass through untouched. Calling with an empty kind
/// list is a contract violation and panics: a filter that matches nothing
/// is always a bug at the call site.
///
/// # Panics
///
/// Panics if `kinds` is empty.
pub fn of_type<St, A>(stream: St, kinds: impl IntoIterator<Item = &'static str>) -> OfType<St>
where
    St: Stream<Item = A> + Unpin,
    A: Action,
{
    let kinds: Vec<&'static str> = kinds.into_iter().collect();
    assert!(
        !kinds.is_empty(),
        "of_type requires at least one action kind"
    );
    OfType { inner: stream, kinds }
}

/// Stream adapter produced by [`of_type`].
pub struct OfType<St> {
    inner: St,
    kinds: Vec<&'static str>,
}

impl<St, A> Stream for OfType<St>
where
    St: Stream<Item = A> + Unpin,
    A: Action,
{
    type Item = A;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(action)) => {
                    if this.kinds.contains(&action.kind()) {
                        return Poll::Ready(Some(action));
                    }
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Method-call sugar for [`of_type`].
pub trait OfTypeExt<A>: Stream<Item = A> + Unpin + Sized
where
    A: Action,
{
    /// See [`of_type`].
    fn of_type(self, kinds: impl IntoIterator<Item = &'static str>) -> OfType<Self> {
        of_type(self, kinds)
    }
}

impl<St, A> OfTypeExt<A> for St
where
    St: Stream<Item = A> + Unpin,
    A: Action,
{
}
