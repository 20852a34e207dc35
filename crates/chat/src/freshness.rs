use std::collections::HashSet;

use crate::message::{Message, MessageIdentity};
use crate::session::RevealMode;

/// Session-scoped record of which message identities have already animated.
///
/// Upstream marks new answers as freshly produced but may keep sending that flag on later
/// renders. The ledger grants the animation once per identity, so a remounted or re-sent
/// message renders instantly the second time.
#[derive(Debug, Default)]
pub struct AnimationLedger {
    animated: HashSet<MessageIdentity>,
}

impl AnimationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides the reveal mode for a message and records the grant.
    pub fn claim(&mut self, message: &Message) -> RevealMode {
        match RevealMode::for_message(message) {
            RevealMode::Animated if self.animated.insert(message.identity()) => {
                RevealMode::Animated
            }
            RevealMode::Animated | RevealMode::Instant => RevealMode::Instant,
        }
    }
}
