//! Character reveal state for one message instance.
//!
//! The session only tracks state. Pacing comes from a [`crate::timer::RevealTimer`] owned by
//! the same message view, whose signals are applied through [`RevealSession::apply_tick`] and
//! [`RevealSession::apply_media_ready`].

use crate::message::{Message, Role};

/// Whether a message animates or renders at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    Instant,
    Animated,
}

impl RevealMode {
    /// Only freshly produced assistant answers animate.
    pub fn for_message(message: &Message) -> Self {
        if message.role == Role::Assistant && message.freshly_produced {
            Self::Animated
        } else {
            Self::Instant
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    Idle,
    Revealing {
        revealed: usize,
    },
    /// All characters are visible. `media_ready` flips after the grace delay.
    Complete {
        media_ready: bool,
    },
}

impl RevealState {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    pub fn is_media_ready(&self) -> bool {
        matches!(self, Self::Complete { media_ready: true })
    }
}

/// Outcome of applying one timer signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Advanced { revealed: usize },
    /// The last character became visible on this tick.
    Finished,
    MediaReady,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSession {
    total: usize,
    state: RevealState,
}

impl RevealSession {
    /// Creates a session in `Idle` for content of `total` characters.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            state: RevealState::Idle,
        }
    }

    /// Leaves `Idle`. Instant sessions complete in the same call.
    pub fn start(&mut self, mode: RevealMode) {
        if self.state != RevealState::Idle {
            return;
        }

        self.state = match mode {
            RevealMode::Instant => RevealState::Complete { media_ready: true },
            RevealMode::Animated if self.total == 0 => RevealState::Complete { media_ready: false },
            RevealMode::Animated => RevealState::Revealing { revealed: 0 },
        };
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn revealed_len(&self) -> usize {
        match self.state {
            RevealState::Idle => 0,
            RevealState::Revealing { revealed } => revealed,
            RevealState::Complete { .. } => self.total,
        }
    }

    /// Reveals one more character.
    pub fn apply_tick(&mut self) -> RevealStep {
        let RevealState::Revealing { revealed } = self.state else {
            return RevealStep::Ignored;
        };

        let revealed = revealed.saturating_add(1).min(self.total);
        if revealed == self.total {
            self.state = RevealState::Complete { media_ready: false };
            RevealStep::Finished
        } else {
            self.state = RevealState::Revealing { revealed };
            RevealStep::Advanced { revealed }
        }
    }

    /// Marks media as ready. Only valid once every character is visible.
    pub fn apply_media_ready(&mut self) -> RevealStep {
        match self.state {
            RevealState::Complete { media_ready: false } => {
                self.state = RevealState::Complete { media_ready: true };
                RevealStep::MediaReady
            }
            RevealState::Idle | RevealState::Revealing { .. } | RevealState::Complete { .. } => {
                RevealStep::Ignored
            }
        }
    }

    /// The visible prefix of `content`, cut on a character boundary.
    pub fn visible_text<'a>(&self, content: &'a str) -> &'a str {
        let revealed = self.revealed_len();
        match content.char_indices().nth(revealed) {
            Some((byte_index, _)) => &content[..byte_index],
            None => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;

    #[test]
    fn instant_mode_completes_without_ticks() {
        let mut session = RevealSession::new(12);
        session.start(RevealMode::Instant);

        assert_eq!(session.state(), RevealState::Complete { media_ready: true });
        assert_eq!(session.revealed_len(), 12);
        assert_eq!(session.apply_tick(), RevealStep::Ignored);
    }

    #[test]
    fn mode_depends_on_role_and_freshness() {
        let id = MessageId::new(1);
        assert_eq!(
            RevealMode::for_message(&Message::assistant_fresh(id, "hi")),
            RevealMode::Animated
        );
        assert_eq!(
            RevealMode::for_message(&Message::assistant(id, "hi")),
            RevealMode::Instant
        );
        assert_eq!(
            RevealMode::for_message(&Message::user(id, "hi").freshly_produced()),
            RevealMode::Instant
        );
    }

    #[test]
    fn ticks_advance_by_one_until_finished() {
        let mut session = RevealSession::new(3);
        session.start(RevealMode::Animated);

        assert_eq!(session.apply_tick(), RevealStep::Advanced { revealed: 1 });
        assert_eq!(session.apply_tick(), RevealStep::Advanced { revealed: 2 });
        assert_eq!(session.apply_media_ready(), RevealStep::Ignored);
        assert_eq!(session.apply_tick(), RevealStep::Finished);
        assert_eq!(session.state(), RevealState::Complete { media_ready: false });
        assert_eq!(session.apply_tick(), RevealStep::Ignored);
        assert_eq!(session.apply_media_ready(), RevealStep::MediaReady);
        assert!(session.state().is_media_ready());
        assert_eq!(session.apply_media_ready(), RevealStep::Ignored);
    }

    #[test]
    fn empty_animated_content_skips_revealing() {
        let mut session = RevealSession::new(0);
        session.start(RevealMode::Animated);

        assert_eq!(session.state(), RevealState::Complete { media_ready: false });
        assert_eq!(session.revealed_len(), 0);
    }

    #[test]
    fn start_is_not_reentrant() {
        let mut session = RevealSession::new(2);
        session.start(RevealMode::Animated);
        session.apply_tick();
        session.start(RevealMode::Instant);

        assert_eq!(session.state(), RevealState::Revealing { revealed: 1 });
    }

    #[test]
    fn visible_text_respects_char_boundaries() {
        let content = "µm fibre";
        let mut session = RevealSession::new(content.chars().count());
        assert_eq!(session.visible_text(content), "");

        session.start(RevealMode::Animated);
        session.apply_tick();
        assert_eq!(session.visible_text(content), "µ");
        session.apply_tick();
        assert_eq!(session.visible_text(content), "µm");
    }
}
