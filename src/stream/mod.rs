//! Reactive plumbing between value sources and render targets.
//!
//! # Architecture
//!
//! ```text
//! PassthroughSubject / CurrentValueSubject / StreamSource
//!        │  (optional: receive_on(MainQueue))
//!        ▼
//!     Bridge ──(Weak)──→ RenderTarget ──→ sink(target, value)
//! ```
//!
//! Streams carry no failure type. A stream ends at most once, with a plain
//! completion.

mod bridge;
mod cancellable;
mod publisher;
mod queue;
mod source;
mod subject;

pub use bridge::{bind, Bridge, RenderTarget};
pub use cancellable::{CancelBag, Cancellable};
pub use publisher::{Completion, Demand, Publisher, Subscriber, Subscription};
pub use queue::{MainQueue, MainQueueHandle, PublisherExt, ReceiveOn};
pub use source::StreamSource;
pub use subject::{CurrentValueSubject, PassthroughSubject};
