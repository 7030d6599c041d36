//! Base trait for renderer intents.

/// Marker trait for intent objects.
///
/// Intents are produced by stream deliveries and by target teardown.
pub trait Intent: Send + 'static {}
