//! UI-thread work queue.
//!
//! Renderers must only touch the view hierarchy from the UI thread. Values
//! produced elsewhere are hopped onto that thread through a [`MainQueue`]:
//! any thread enqueues closures through a [`MainQueueHandle`], and the UI
//! loop drains them in FIFO order with [`MainQueue::run_pending`].

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::cancellable::Cancellable;
use super::publisher::{Completion, Demand, Publisher, Subscriber, Subscription};

type Job = Box<dyn FnOnce() + Send>;

pub struct MainQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
}

/// Cloneable, thread-safe side of a [`MainQueue`].
#[derive(Clone)]
pub struct MainQueueHandle {
    tx: Sender<Job>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs every job queued so far, including jobs those jobs enqueue.
    /// Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for one job and runs it, then drains the rest.
    pub fn run_next(&self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                job();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MainQueueHandle {
    /// Enqueues `job`. Dropped silently once the queue itself is gone.
    pub fn schedule(&self, job: impl FnOnce() + Send + 'static) {
        if self.tx.send(Box::new(job)).is_err() {
            tracing::trace!("main queue closed; job dropped");
        }
    }
}

/// Publisher that re-delivers upstream values on a [`MainQueue`].
pub struct ReceiveOn<P> {
    upstream: P,
    queue: MainQueueHandle,
}

impl<P: Publisher> Publisher for ReceiveOn<P> {
    type Output = P::Output;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<P::Output>>) -> Cancellable {
        let hop = Arc::new(Hop {
            downstream: subscriber,
            upstream: Mutex::new(None),
            queue: self.queue.clone(),
        });
        self.upstream.subscribe(hop)
    }
}

struct Hop<T> {
    downstream: Arc<dyn Subscriber<T>>,
    upstream: Mutex<Option<Arc<dyn Subscription>>>,
    queue: MainQueueHandle,
}

impl<T> Hop<T> {
    fn upstream(&self) -> Option<Arc<dyn Subscription>> {
        self.upstream.lock().clone()
    }
}

impl<T: Send + 'static> Subscriber<T> for Hop<T> {
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        *self.upstream.lock() = Some(Arc::clone(&subscription));
        self.downstream.receive_subscription(subscription);
    }

    fn receive(&self, value: T) -> Demand {
        let downstream = Arc::clone(&self.downstream);
        let upstream = self.upstream();
        self.queue.schedule(move || {
            if upstream.as_ref().is_some_and(|sub| sub.is_cancelled()) {
                return;
            }
            let more = downstream.receive(value);
            if let Some(upstream) = upstream {
                if !more.is_none() {
                    upstream.request(more);
                }
            }
        });
        Demand::None
    }

    fn receive_completion(&self, completion: Completion) {
        let downstream = Arc::clone(&self.downstream);
        self.queue
            .schedule(move || downstream.receive_completion(completion));
    }
}

/// Combinators available on every publisher.
pub trait PublisherExt: Publisher + Sized {
    /// Delivers values and completion through `queue` instead of on the
    /// producing thread.
    fn receive_on(self, queue: &MainQueueHandle) -> ReceiveOn<Self> {
        ReceiveOn {
            upstream: self,
            queue: queue.clone(),
        }
    }

    /// Subscribes a closure with unlimited demand.
    fn sink(&self, on_value: impl Fn(Self::Output) + Send + Sync + 'static) -> Cancellable {
        self.subscribe(Arc::new(ClosureSink {
            on_value: Box::new(on_value),
        }))
    }
}

impl<P: Publisher + Sized> PublisherExt for P {}

struct ClosureSink<T> {
    on_value: Box<dyn Fn(T) + Send + Sync>,
}

impl<T: Send + 'static> Subscriber<T> for ClosureSink<T> {
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>) {
        subscription.request(Demand::Unlimited);
    }

    fn receive(&self, value: T) -> Demand {
        (self.on_value)(value);
        Demand::None
    }

    fn receive_completion(&self, _completion: Completion) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::PassthroughSubject;
    use std::thread;

    #[test]
    fn jobs_run_in_fifo_order_on_drain() {
        let queue = MainQueue::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = Arc::clone(&seen);
            queue.handle().schedule(move || seen.lock().push(i));
        }
        assert!(seen.lock().is_empty());
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn receive_on_defers_delivery_until_drained() {
        let queue = MainQueue::new();
        let subject = Arc::new(PassthroughSubject::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let _sub = Arc::clone(&subject)
            .receive_on(&queue.handle())
            .sink(move |v: u32| sink_seen.lock().push(v));

        let producer = Arc::clone(&subject);
        thread::spawn(move || {
            producer.send(1);
            producer.send(2);
        })
        .join()
        .unwrap();

        assert!(seen.lock().is_empty());
        queue.run_pending();
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn cancelled_before_drain_is_not_delivered() {
        let queue = MainQueue::new();
        let subject = Arc::new(PassthroughSubject::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let mut sub = Arc::clone(&subject)
            .receive_on(&queue.handle())
            .sink(move |v: u32| sink_seen.lock().push(v));

        subject.send(1);
        sub.cancel();
        queue.run_pending();

        assert!(seen.lock().is_empty());
    }

    #[test]
    fn completion_after_values_keeps_queued_values() {
        let queue = MainQueue::new();
        let subject = Arc::new(PassthroughSubject::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let _sub = Arc::clone(&subject)
            .receive_on(&queue.handle())
            .sink(move |v: u32| sink_seen.lock().push(v));

        subject.send(1);
        subject.send(2);
        subject.complete();
        queue.run_pending();

        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn run_next_times_out_when_idle() {
        let queue = MainQueue::new();
        assert_eq!(queue.run_next(Duration::from_millis(5)), 0);
    }
}
