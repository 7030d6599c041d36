//! Subscription tokens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::publisher::{Demand, Subscription};

/// Owning handle to a subscription. Cancels it when dropped.
///
/// Cancelling is idempotent and never calls back into the subscriber.
#[must_use = "dropping a Cancellable cancels its subscription"]
pub struct Cancellable {
    subscription: Option<Arc<dyn Subscription>>,
}

impl Cancellable {
    pub fn new(subscription: Arc<dyn Subscription>) -> Self {
        Self {
            subscription: Some(subscription),
        }
    }

    /// Handle for a subscription that is already over.
    pub fn empty() -> Self {
        Self { subscription: None }
    }

    pub fn cancel(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.subscription
            .as_ref()
            .map_or(true, |subscription| subscription.is_cancelled())
    }

    pub fn store_in(self, bag: &mut CancelBag) {
        bag.insert(self);
    }
}

impl Drop for Cancellable {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellable")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Collection of subscriptions that live and die together.
#[derive(Debug, Default)]
pub struct CancelBag {
    items: Vec<Cancellable>,
}

impl CancelBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cancellable: Cancellable) {
        self.items.push(cancellable);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cancel_all(&mut self) {
        for mut item in self.items.drain(..) {
            item.cancel();
        }
    }
}

type Hook = Box<dyn FnOnce() + Send>;
type Waker = Arc<dyn Fn() + Send + Sync>;

/// Shared subscription state used by the built-in publishers.
///
/// Tracks outstanding demand and two terminal flags. `finished` means the
/// publisher completed; `cancelled` means the subscriber asked to stop. Only
/// the latter is reported by [`Subscription::is_cancelled`], so values already
/// handed downstream before completion still count. `on_cancel` runs at most
/// once; `on_request` runs after every successful `request`.
pub(crate) struct Link {
    demand: Mutex<Demand>,
    cancelled: AtomicBool,
    finished: AtomicBool,
    on_cancel: Mutex<Option<Hook>>,
    on_request: Mutex<Option<Waker>>,
}

impl Link {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            demand: Mutex::new(Demand::None),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            on_cancel: Mutex::new(None),
            on_request: Mutex::new(None),
        })
    }

    pub(crate) fn set_on_cancel(&self, hook: impl FnOnce() + Send + 'static) {
        *self.on_cancel.lock() = Some(Box::new(hook));
    }

    pub(crate) fn set_on_request(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self.on_request.lock() = Some(Arc::new(waker));
    }

    /// Neither cancelled nor finished.
    pub(crate) fn is_live(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && !self.finished.load(Ordering::SeqCst)
    }

    /// Consumes one unit of demand if the link is live and has any.
    pub(crate) fn take_demand(&self) -> bool {
        self.is_live() && self.demand.lock().take_one()
    }

    pub(crate) fn has_demand(&self) -> bool {
        self.is_live() && !self.demand.lock().is_none()
    }

    pub(crate) fn add_demand(&self, demand: Demand) {
        let mut current = self.demand.lock();
        *current = current.combine(demand);
    }

    /// Marks the link finished without running the cancel hook. A finished
    /// link is not cancelled.
    pub(crate) fn close(&self) {
        self.finished.store(true, Ordering::SeqCst);
        self.on_cancel.lock().take();
        self.on_request.lock().take();
    }
}

impl Subscription for Link {
    fn request(&self, demand: Demand) {
        if !self.is_live() {
            return;
        }
        self.add_demand(demand);
        let waker = self.on_request.lock().clone();
        if let Some(waker) = waker {
            waker();
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.on_request.lock().take();
        let hook = self.on_cancel.lock().take();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
