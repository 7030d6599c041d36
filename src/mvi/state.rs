//! Base trait for renderer state.

/// Marker trait for the state a renderer keeps about its target.
///
/// States are values: cloned to produce the next one, compared to detect
/// changes, and defaulted to the "nothing rendered yet" case.
pub trait RenderState: Clone + PartialEq + Default + Send + 'static {}
