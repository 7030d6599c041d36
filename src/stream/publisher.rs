//! Push-based publisher/subscriber protocol.
//!
//! Streams in Herald never fail: a [`Subscriber`] only ever sees values and,
//! at most once, a plain [`Completion`]. There is no error channel to handle.

use std::sync::Arc;

use super::cancellable::Cancellable;

/// How many more values a subscriber is willing to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    None,
    Max(usize),
    Unlimited,
}

impl Demand {
    /// Sum of two demands, saturating into `Unlimited`.
    pub fn combine(self, other: Demand) -> Demand {
        match (self, other) {
            (Demand::Unlimited, _) | (_, Demand::Unlimited) => Demand::Unlimited,
            (Demand::None, other) | (other, Demand::None) => other,
            (Demand::Max(a), Demand::Max(b)) => a
                .checked_add(b)
                .map_or(Demand::Unlimited, Demand::Max),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Demand::None | Demand::Max(0))
    }

    /// Consumes one unit of demand. Returns false when none was left.
    pub(crate) fn take_one(&mut self) -> bool {
        match self {
            Demand::Unlimited => true,
            Demand::Max(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Terminal signal of a stream. Only one kind exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Finished,
}

/// Link between one publisher and one subscriber.
pub trait Subscription: Send + Sync {
    fn request(&self, demand: Demand);

    /// Stops delivery. Idempotent; after it returns the subscriber receives
    /// nothing further from this subscription.
    fn cancel(&self);

    fn is_cancelled(&self) -> bool;
}

pub trait Subscriber<T>: Send + Sync {
    /// Called once, before any value.
    fn receive_subscription(&self, subscription: Arc<dyn Subscription>);

    /// Returns demand to add on top of what is outstanding.
    fn receive(&self, value: T) -> Demand;

    fn receive_completion(&self, completion: Completion);
}

/// A source of values of type `Output`.
pub trait Publisher {
    type Output: Send + 'static;

    /// Attaches `subscriber`. The returned handle cancels the subscription
    /// when cancelled or dropped.
    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Output>>) -> Cancellable;
}

impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    type Output = P::Output;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Output>>) -> Cancellable {
        (**self).subscribe(subscriber)
    }
}

impl<P: Publisher + ?Sized> Publisher for &P {
    type Output = P::Output;

    fn subscribe(&self, subscriber: Arc<dyn Subscriber<Self::Output>>) -> Cancellable {
        (**self).subscribe(subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_saturates() {
        assert_eq!(Demand::None.combine(Demand::Max(2)), Demand::Max(2));
        assert_eq!(Demand::Max(2).combine(Demand::Max(3)), Demand::Max(5));
        assert_eq!(Demand::Max(usize::MAX).combine(Demand::Max(1)), Demand::Unlimited);
        assert_eq!(Demand::Max(1).combine(Demand::Unlimited), Demand::Unlimited);
    }

    #[test]
    fn take_one_counts_down() {
        let mut demand = Demand::Max(2);
        assert!(demand.take_one());
        assert!(demand.take_one());
        assert!(!demand.take_one());
        assert!(demand.is_none());

        let mut unlimited = Demand::Unlimited;
        assert!(unlimited.take_one());
        assert_eq!(unlimited, Demand::Unlimited);
    }
}
