use std::time::Duration;

use snafu::Snafu;
use tokio::time::Instant;

/// How long the copied/failed indicator stays visible.
pub const COPY_FEEDBACK_WINDOW_MS: u64 = 2_000;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClipboardError {
    #[snafu(display("clipboard is unavailable on `{stage}`: {details}"))]
    Unavailable {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("failed to write clipboard text on `{stage}`: {details}"))]
    WriteText {
        stage: &'static str,
        details: String,
    },
}

/// Text clipboard used by the copy action on a message bubble.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Transient feedback shown on the bubble after a copy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyIndicator {
    #[default]
    None,
    Copied,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFeedback {
    window: Duration,
    last: Option<(CopyIndicator, Instant)>,
}

impl CopyFeedback {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Copies `text` and records the outcome. Failures never propagate.
    pub fn copy(
        &mut self,
        clipboard: &mut dyn Clipboard,
        text: &str,
        now: Instant,
    ) -> CopyIndicator {
        let indicator = match clipboard.write_text(text) {
            Ok(()) => CopyIndicator::Copied,
            Err(error) => {
                tracing::warn!(%error, "copying message text failed");
                CopyIndicator::Failed
            }
        };

        self.last = Some((indicator, now));
        indicator
    }

    pub fn indicator(&self, now: Instant) -> CopyIndicator {
        match self.last {
            Some((indicator, at)) if now.saturating_duration_since(at) < self.window => indicator,
            Some(_) | None => CopyIndicator::None,
        }
    }
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new(Duration::from_millis(COPY_FEEDBACK_WINDOW_MS))
    }
}
