//! Delivery of stream values into a render target that may go away.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::cancellable::Cancellable;
use super::publisher::{Completion, Demand, Publisher, Subscriber, Subscription};

/// Something a bridge can deliver into.
pub trait RenderTarget: Send + Sync + 'static {
    /// True once the owner has torn the target down. Values arriving after
    /// that are dropped.
    fn is_torn_down(&self) -> bool {
        false
    }
}

type Sink<Tgt, T> = Box<dyn Fn(&Tgt, T) + Send + Sync>;

/// Subscriber that forwards each value to `sink` while its target is alive.
///
/// The bridge only holds a [`Weak`] reference, so it never keeps the target
/// alive. A value that arrives after the target was dropped or torn down is
/// discarded; that is not an error. On completion the reference is released
/// and the bridge goes inert.
pub struct Bridge<Tgt, T> {
    target: Mutex<Option<Weak<Tgt>>>,
    subscription: Mutex<Option<Arc<dyn Subscription>>>,
    sink: Sink<Tgt, T>,
}

impl<Tgt: RenderTarget, T: Send + 'static> Bridge<Tgt, T> {
    pub fn new(target: &Arc<Tgt>, sink: impl Fn(&Tgt, T) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            target: Mutex::new(Some(Arc::downgrade(target))),
            subscription: Mutex::new(None),
            sink: Box::new(sink),
        })
    }

    /// Subscribes this bridge to `publisher`.
    pub fn attach<P>(self: Arc<Self>, publisher: &P) -> Cancellable
    where
        P: Publisher<Output = T> + ?Sized,
    {
        publisher.subscribe(self)
    }

    /// False after completion or once the target is gone.
    pub fn is_bound(&self) -> bool {
        self.live_target().is_some()
    }

    fn live_target(&self) -> Option<Arc<Tgt>> {
        self.target
            .lock()
            .as_ref()
            .and_then(Weak::upgrade)
            .filter(|target| !target.is_torn_down())
    }
}

impl<Tgt: RenderTarget, T: Send + 'static> Subscriber<T> for Bridge<Tgt, T> {
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        subscription.request(Demand::Unlimited);
        *self.subscription.lock() = Some(subscription);
    }

    fn receive(&self, value: T) -> Demand {
        match self.live_target() {
            Some(target) => (self.sink)(&target, value),
            None => tracing::trace!("dropping value for released render target"),
        }
        Demand::Unlimited
    }

    fn receive_completion(&self, _completion: Completion) {
        self.target.lock().take();
        self.subscription.lock().take();
        tracing::debug!("stream completed; bridge released its target");
    }
}

/// `Bridge::new(target, sink).attach(publisher)`.
pub fn bind<Tgt, P>(
    target: &Arc<Tgt>,
    publisher: &P,
    sink: impl Fn(&Tgt, P::Output) + Send + Sync + 'static,
) -> Cancellable
where
    Tgt: RenderTarget,
    P: Publisher + ?Sized,
{
    Bridge::new(target, sink).attach(publisher)
}
