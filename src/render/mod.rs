//! Binding helpers for the two renderers.
//!
//! Both return the [`Cancellable`] of the underlying subscription. Dropping it
//! ends the binding; so does dropping or tearing down the target.

pub mod linear;

use crate::builder::IntoFragment;
use crate::collection::{DiffableDataSource, Identifier, Snapshot};
use crate::stream::{Cancellable, Publisher};
use crate::view::StackView;

/// Replaces the arranged children of `stack` with `content(value)` for every
/// value `publisher` delivers.
pub fn bind_linear<P, F, R>(stack: &StackView, publisher: &P, content: F) -> Cancellable
where
    P: Publisher + ?Sized,
    F: Fn(P::Output) -> R + Send + Sync + 'static,
    R: IntoFragment,
{
    stack.render(publisher, content)
}

/// Applies every snapshot `publisher` delivers to `data_source`.
pub fn bind_snapshot<S, I, P>(data_source: &DiffableDataSource<S, I>, publisher: &P) -> Cancellable
where
    S: Identifier,
    I: Identifier,
    P: Publisher<Output = Snapshot<S, I>> + ?Sized,
{
    data_source.bind(publisher)
}
