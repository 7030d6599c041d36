use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

/// Single-fire signal that a snapshot apply has finished.
///
/// Resolves exactly once: when the collection view has materialized the
/// applied snapshot, when a newer snapshot that superseded it lands, or when
/// the data source is torn down.
#[must_use = "an acknowledgment does nothing unless awaited or polled"]
#[derive(Debug)]
pub struct Acknowledgment {
    rx: oneshot::Receiver<()>,
    resolved: bool,
}

/// Resolving half, held by the data source.
#[derive(Debug)]
pub(crate) struct AckSender(oneshot::Sender<()>);

impl AckSender {
    pub(crate) fn resolve(self) {
        // The caller may have dropped its acknowledgment.
        let _ = self.0.send(());
    }
}

impl Acknowledgment {
    pub(crate) fn pending() -> (AckSender, Self) {
        let (tx, rx) = oneshot::channel();
        (
            AckSender(tx),
            Self {
                rx,
                resolved: false,
            },
        )
    }

    /// An acknowledgment that is already resolved.
    pub fn resolved() -> Self {
        let (tx, ack) = Self::pending();
        tx.resolve();
        ack
    }

    /// Non-blocking check.
    pub fn is_resolved(&mut self) -> bool {
        if !self.resolved {
            self.resolved = match self.rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => true,
                Err(oneshot::error::TryRecvError::Empty) => false,
            };
        }
        self.resolved
    }
}

impl Future for Acknowledgment {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if this.resolved {
            return Poll::Ready(());
        }
        // A dropped sender also counts as resolution.
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(_) => {
                this.resolved = true;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_resolved() {
        let (tx, mut ack) = Acknowledgment::pending();
        assert!(!ack.is_resolved());
        tx.resolve();
        assert!(ack.is_resolved());
        assert!(ack.is_resolved());
    }

    #[test]
    fn dropped_sender_resolves() {
        let (tx, mut ack) = Acknowledgment::pending();
        drop(tx);
        assert!(ack.is_resolved());
    }

    #[tokio::test]
    async fn awaits_resolution() {
        let (tx, ack) = Acknowledgment::pending();
        tokio::spawn(async move { tx.resolve() });
        ack.await;
    }

    #[tokio::test]
    async fn await_after_is_resolved_does_not_panic() {
        let mut ack = Acknowledgment::resolved();
        assert!(ack.is_resolved());
        ack.await;
    }
}
