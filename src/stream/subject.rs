//! Publishers the caller pushes values into.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::cancellable::{Cancellable, Link};
use super::publisher::{Completion, Publisher, Subscriber, Subscription};

struct Entry<T> {
    id: u64,
    link: Arc<Link>,
    subscriber: Arc<dyn Subscriber<T>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            link: Arc::clone(&self.link),
            subscriber: Arc::clone(&self.subscriber),
        }
    }
}

struct RelayState<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
    completed: bool,
}

/// Fan-out shared by both subjects. Subscribers are called with no lock held,
/// so a subscriber may send, subscribe or cancel from inside `receive`.
struct Relay<T> {
    state: Mutex<RelayState<T>>,
}

impl<T: Clone + Send + 'static> Relay<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RelayState {
                next_id: 0,
                entries: Vec::new(),
                completed: false,
            }),
        })
    }

    /// Registers `subscriber`; `None` when the relay already completed.
    fn attach(
        self: &Arc<Self>,
        subscriber: Arc<dyn Subscriber<T>>,
    ) -> (Arc<Link>, Option<Arc<dyn Subscriber<T>>>) {
        let link = Link::new();
        let mut state = self.state.lock();
        if state.completed {
            return (link, Some(subscriber));
        }
        let id = state.next_id;
        state.next_id += 1;
        state.entries.push(Entry {
            id,
            link: Arc::clone(&link),
            subscriber,
        });
        drop(state);

        let relay: Weak<Self> = Arc::downgrade(self);
        link.set_on_cancel(move || {
            if let Some(relay) = relay.upgrade() {
                relay.state.lock().entries.retain(|entry| entry.id != id);
            }
        });
        (link, None)
    }

    fn entry_for(&self, link: &Arc<Link>) -> Option<Entry<T>> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|entry| Arc::ptr_eq(&entry.link, link))
            .cloned()
    }

    fn send(&self, value: T) {
        let entries = {
            let state = self.state.lock();
            if state.completed {
                return;
            }
            state.entries.clone()
        };
        for entry in entries {
            deliver(&entry, value.clone());
        }
    }

    fn complete(&self) {
        let entries = {
            let mut state = self.state.lock();
            if state.completed {
                return;
            }
            state.completed = true;
            std::mem::take(&mut state.entries)
        };
        for entry in entries {
            if entry.link.is_cancelled() {
                continue;
            }
            entry.link.close();
            entry.subscriber.receive_completion(Completion::Finished);
        }
    }

    fn subscriber_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    fn is_completed(&self) -> bool {
        self.state.lock().completed
    }
}

fn deliver<T>(entry: &Entry<T>, value: T) {
    if !entry.link.take_demand() {
        return;
    }
    let more = entry.subscriber.receive(value);
    entry.link.add_demand(more);
}

fn finish_attach<T: Clone + Send + 'static>(
    link: Arc<Link>,
    completed: Option<Arc<dyn Subscriber<T>>>,
) -> Cancellable {
    if let Some(subscriber) = completed {
        subscriber.receive_subscription(link.clone());
        link.close();
        subscriber.receive_completion(Completion::Finished);
        return Cancellable::empty();
    }
    Cancellable::new(link)
}

/// Broadcasts each sent value to the subscribers attached at that moment.
///
/// Values sent while a subscriber has no outstanding demand are dropped for
/// that subscriber.
pub struct PassthroughSubject<T> {
    relay: Arc<Relay<T>>,
}

impl<T: Clone + Send + 'static> PassthroughSubject<T> {
    pub fn new() -> Self {
        Self {
            relay: Relay::new(),
        }
    }

    pub fn send(&self, value: T) {
        self.relay.send(value);
    }

    /// Ends the stream. Later sends are ignored and later subscribers
    /// complete immediately.
    pub fn complete(&self) {
        self.relay.complete();
    }

    pub fn subscriber_count(&self) -> usize {
        self.relay.subscriber_count()
    }

    pub fn is_completed(&self) -> bool {
        self.relay.is_completed()
    }
}

impl<T: Clone + Send + 'static> Default for PassthroughSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Publisher for PassthroughSubject<T> {
    type Output = T;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Cancellable {
        let (link, completed) = self.relay.attach(Arc::clone(&subscriber));
        if completed.is_some() {
            return finish_attach(link, completed);
        }
        subscriber.receive_subscription(link.clone());
        finish_attach::<T>(link, None)
    }
}

/// Subject that remembers its latest value and replays it to each new
/// subscriber as soon as that subscriber asks for anything.
pub struct CurrentValueSubject<T> {
    relay: Arc<Relay<T>>,
    value: Mutex<T>,
}

impl<T: Clone + Send + 'static> CurrentValueSubject<T> {
    pub fn new(initial: T) -> Self {
        Self {
            relay: Relay::new(),
            value: Mutex::new(initial),
        }
    }

    pub fn value(&self) -> T {
        self.value.lock().clone()
    }

    pub fn send(&self, value: T) {
        *self.value.lock() = value.clone();
        self.relay.send(value);
    }

    pub fn complete(&self) {
        self.relay.complete();
    }

    pub fn subscriber_count(&self) -> usize {
        self.relay.subscriber_count()
    }
}

impl<T: Clone + Send + 'static> Publisher for CurrentValueSubject<T> {
    type Output = T;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<T>>) -> Cancellable {
        let (link, completed) = self.relay.attach(Arc::clone(&subscriber));
        if completed.is_some() {
            return finish_attach(link, completed);
        }
        subscriber.receive_subscription(link.clone());
        if let Some(entry) = self.relay.entry_for(&link) {
            deliver(&entry, self.value());
        }
        finish_attach::<T>(link, None)
    }
}
