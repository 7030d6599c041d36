//! Publisher over a `futures_core::Stream`, driven on a tokio runtime.

use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use super::cancellable::{Cancellable, Link};
use super::publisher::{Completion, Publisher, Subscriber, Subscription};

type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Wraps a stream so it can feed renderers.
///
/// A stream can only be consumed once, so only the first subscriber receives
/// its values. Subscribers attached after that complete immediately.
///
/// The stream is polled only while the subscriber has outstanding demand.
pub struct StreamSource<T> {
    stream: Mutex<Option<BoxStream<T>>>,
    runtime: Handle,
}

impl<T: Send + 'static> StreamSource<T> {
    /// Drives the stream on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(stream: impl Stream<Item = T> + Send + 'static) -> Self {
        Self::with_handle(stream, Handle::current())
    }

    pub fn with_handle(stream: impl Stream<Item = T> + Send + 'static, runtime: Handle) -> Self {
        Self {
            stream: Mutex::new(Some(Box::pin(stream))),
            runtime,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.stream.lock().is_none()
    }
}

impl<T: Send + 'static> Publisher for StreamSource<T> {
    type Output = T;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Cancellable {
        let link = Link::new();
        let Some(stream) = self.stream.lock().take() else {
            subscriber.receive_subscription(link.clone());
            link.close();
            subscriber.receive_completion(Completion::Finished);
            return Cancellable::empty();
        };

        let wake = Arc::new(Notify::new());
        let waker = Arc::clone(&wake);
        link.set_on_request(move || waker.notify_one());

        let task = self
            .runtime
            .spawn(pump(stream, Arc::clone(&link), wake, Arc::clone(&subscriber)));
        link.set_on_cancel(move || task.abort());

        subscriber.receive_subscription(link.clone());
        Cancellable::new(link)
    }
}

async fn pump<T>(
    mut stream: BoxStream<T>,
    link: Arc<Link>,
    wake: Arc<Notify>,
    subscriber: Arc<dyn Subscriber<T>>,
) {
    loop {
        // Register for a wake-up before checking demand so a request that
        // lands in between is not lost.
        let notified = wake.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if link.is_cancelled() {
            return;
        }
        if !link.has_demand() {
            notified.await;
            continue;
        }

        match poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
            Some(value) => {
                if !link.take_demand() {
                    return;
                }
                let more = subscriber.receive(value);
                link.add_demand(more);
            }
            None => {
                if link.is_cancelled() {
                    return;
                }
                link.close();
                subscriber.receive_completion(Completion::Finished);
                return;
            }
        }
    }
}
