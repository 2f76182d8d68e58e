//! Readiness handshake: resend `ready` until the host answers with `identity`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use duet_shared::envelope::Command;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::EnvelopeSink;

/// Default resend interval
pub const DEFAULT_HANDSHAKE_INTERVAL: Duration = Duration::from_millis(1000);

enum HandshakeState {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

/// One-shot retry loop around the `ready` envelope.
///
/// Retries without bound until cancelled. Once cancelled it cannot be
/// re-armed; a new connection gets a new coordinator.
pub struct HandshakeCoordinator {
    interval: Duration,
    state: HandshakeState,
    sent: Arc<AtomicU64>,
}

impl HandshakeCoordinator {
    pub fn new(interval: Duration) -> Self {
        Self {
            // tokio rejects a zero period
            interval: interval.max(Duration::from_millis(1)),
            state: HandshakeState::Idle,
            sent: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Send `ready` now and then on every interval tick.
    ///
    /// Returns `false` if the loop is already running or was already stopped.
    pub fn start(&mut self, sink: Arc<dyn EnvelopeSink>) -> bool {
        if !matches!(self.state, HandshakeState::Idle) {
            return false;
        }

        let interval = self.interval;
        let sent = Arc::clone(&self.sent);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match sink.send(Command::Ready).await {
                    Ok(()) => {
                        let count = sent.fetch_add(1, Ordering::SeqCst) + 1;
                        debug!(count, "Sent ready");
                    }
                    Err(e) => warn!("Failed to send ready, retrying on next tick: {}", e),
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "Handshake started");
        self.state = HandshakeState::Running(task);
        true
    }

    /// Stop resending. Calling it again is a no-op.
    pub fn cancel(&mut self) {
        match std::mem::replace(&mut self.state, HandshakeState::Stopped) {
            HandshakeState::Running(task) => {
                task.abort();
                info!(sent = self.sent_count(), "Handshake acknowledged");
            }
            HandshakeState::Idle | HandshakeState::Stopped => {}
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, HandshakeState::Running(_))
    }

    /// Number of `ready` envelopes accepted by the sink so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

impl Drop for HandshakeCoordinator {
    fn drop(&mut self) {
        if let HandshakeState::Running(task) = &self.state {
            task.abort();
        }
    }
}
