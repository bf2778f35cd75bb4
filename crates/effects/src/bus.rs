//! Effect publishing/subscription abstraction (mechanics only).
//!
//! A lightweight pub/sub contract for distributing side-effect messages to
//! consumers after the core transaction has committed. The bus is for
//! distribution, not storage: delivery is best-effort, consumers must
//! tolerate duplicates, and a publish failure never undoes committed work.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an effect stream. Each subscription gets a copy of all
/// messages published to the bus (broadcast semantics); it is meant to be
/// consumed from a single thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Transport-agnostic effect bus (pub/sub abstraction).
///
/// `publish()` can fail; the caller sits on the post-commit path, so the
/// expected handling is to log and move on, not to propagate.
pub trait EffectBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EffectBus<M> for Arc<B>
where
    B: EffectBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
