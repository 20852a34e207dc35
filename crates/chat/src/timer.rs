use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::message::MessageId;

pub const TICK_INTERVAL_MS: u64 = 15;
pub const POST_COMPLETE_DELAY_MS: u64 = 500;

/// Reveal pacing for one character stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub tick_interval: Duration,
    pub post_complete_delay: Duration,
}

impl RevealTiming {
    pub const fn new(tick_interval: Duration, post_complete_delay: Duration) -> Self {
        Self {
            tick_interval,
            post_complete_delay,
        }
    }
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(TICK_INTERVAL_MS),
            Duration::from_millis(POST_COMPLETE_DELAY_MS),
        )
    }
}

/// Routing key for timer signals.
///
/// The generation changes every time a message is re-keyed so signals from a replaced
/// session can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealKey {
    pub message_id: MessageId,
    pub generation: u64,
}

impl RevealKey {
    pub const fn new(message_id: MessageId, generation: u64) -> Self {
        Self {
            message_id,
            generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealSignalKind {
    /// One more character is due.
    Tick,
    /// The grace delay after the last character has elapsed.
    MediaReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealSignal {
    pub key: RevealKey,
    pub kind: RevealSignalKind,
}

pub type RevealSignalSender = mpsc::UnboundedSender<RevealSignal>;
pub type RevealSignalReceiver = mpsc::UnboundedReceiver<RevealSignal>;

/// Owning handle for one running reveal timer.
///
/// Dropping the handle cancels the timer, so a session can never outlive its owner.
pub struct RevealTimer {
    key: RevealKey,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl RevealTimer {
    /// Spawns a timer emitting `ticks` tick signals followed by one media-ready signal.
    ///
    /// Returns `None` when no tokio runtime is available; callers reveal instantly instead.
    pub fn spawn(
        key: RevealKey,
        ticks: usize,
        timing: RevealTiming,
        signal_tx: RevealSignalSender,
    ) -> Option<Self> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(error) => {
                tracing::warn!(?key, %error, "no runtime for reveal timer; revealing instantly");
                return None;
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = runtime.spawn(run_reveal_timer(key, ticks, timing, signal_tx, cancel_rx));
        tracing::debug!(?key, ticks, "reveal timer started");

        Some(Self {
            key,
            cancel_tx: Some(cancel_tx),
            task,
        })
    }

    /// Cancels the timer. Returns false if it was already cancelled or finished.
    fn cancel(&mut self) -> bool {
        let signalled = self
            .cancel_tx
            .take()
            .map(|tx| tx.send(()).is_ok())
            .unwrap_or(false);
        self.task.abort();
        signalled
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        if self.cancel() {
            tracing::debug!(key = ?self.key, "reveal timer cancelled");
        }
    }
}

async fn run_reveal_timer(
    key: RevealKey,
    ticks: usize,
    timing: RevealTiming,
    signal_tx: RevealSignalSender,
    cancel_rx: oneshot::Receiver<()>,
) {
    let schedule = async {
        for _ in 0..ticks {
            tokio::time::sleep(timing.tick_interval).await;
            let signal = RevealSignal {
                key,
                kind: RevealSignalKind::Tick,
            };
            if signal_tx.send(signal).is_err() {
                return;
            }
        }

        tokio::time::sleep(timing.post_complete_delay).await;
        let _ = signal_tx.send(RevealSignal {
            key,
            kind: RevealSignalKind::MediaReady,
        });
    };

    tokio::select! {
        _ = cancel_rx => {}
        _ = schedule => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn key() -> RevealKey {
        RevealKey::new(MessageId::new(1), 1)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_ticks_then_media_ready_on_schedule() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let started = Instant::now();
        let _timer = RevealTimer::spawn(key(), 3, RevealTiming::default(), tx).unwrap();

        let mut kinds = Vec::new();
        let mut elapsed = Vec::new();
        while let Some(signal) = rx.recv().await {
            kinds.push(signal.kind);
            elapsed.push(started.elapsed());
            if signal.kind == RevealSignalKind::MediaReady {
                break;
            }
        }

        assert_eq!(
            kinds,
            vec![
                RevealSignalKind::Tick,
                RevealSignalKind::Tick,
                RevealSignalKind::Tick,
                RevealSignalKind::MediaReady,
            ]
        );
        assert!(elapsed[0] >= Duration::from_millis(15));
        assert!(elapsed[2] >= Duration::from_millis(45));
        assert!(elapsed[3] - elapsed[2] >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_further_signals() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = RevealTimer::spawn(key(), 100, RevealTiming::default(), tx).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, RevealSignalKind::Tick);

        drop(timer);
        tokio::time::sleep(Duration::from_secs(5)).await;

        // The task owned the only sender, so the channel closes once it is gone.
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn spawning_without_runtime_degrades() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(RevealTimer::spawn(key(), 3, RevealTiming::default(), tx).is_none());
    }
}
