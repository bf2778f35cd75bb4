//! Background effect worker.
//!
//! Consumes side-effect messages from a bus subscription on its own thread so
//! the caller of a core operation never waits on notification/loyalty/referral
//! delivery.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::bus::{EffectBus, Subscription};

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Generic effect worker loop.
///
/// - Subscribes to an effect bus
/// - Invokes the handler for each message (the handler isolates failures)
/// - Supports graceful shutdown
#[derive(Debug)]
pub struct EffectWorker;

impl EffectWorker {
    /// Spawn a worker thread that processes effects from the bus subscription.
    pub fn spawn<M, B, H>(name: &'static str, bus: B, mut handler: H) -> WorkerHandle
    where
        M: Send + 'static,
        B: EffectBus<M> + Send + Sync + 'static,
        H: FnMut(M) + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub: Subscription<M> = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(sub, shutdown_rx, &mut handler))
            .expect("failed to spawn effect worker thread");

        WorkerHandle {
            shutdown: shutdown_tx,
            join: Some(join),
        }
    }
}

fn worker_loop<M, H>(sub: Subscription<M>, shutdown_rx: mpsc::Receiver<()>, handler: &mut H)
where
    H: FnMut(M),
{
    let tick = Duration::from_millis(250);

    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(msg) => handler(msg),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}
