use std::collections::HashSet;

use tokio::time::Instant;

use crate::attachments::{AttachmentGroups, GroupKind};
use crate::clipboard::{Clipboard, CopyFeedback, CopyIndicator};
use crate::disclosure::{Consent, Disclosure, DisclosureGate};
use crate::message::{Message, MessageId, MessageIdentity, Role};
use crate::session::{RevealMode, RevealSession, RevealState, RevealStep};
use crate::timer::{
    RevealKey, RevealSignal, RevealSignalKind, RevealSignalSender, RevealTimer, RevealTiming,
};

/// Presentation model for one message on one render.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRender<'a> {
    pub id: MessageId,
    pub role: Role,
    pub text: &'a str,
    pub reveal: RevealState,
    pub disclosure: Disclosure,
    pub copy_indicator: CopyIndicator,
}

/// Rendering unit for one message identity.
///
/// Owns the reveal session, its timer and the disclosure gate. Replacing the message means
/// replacing the view; dropping the view cancels its timer.
pub struct MessageView {
    message: Message,
    identity: MessageIdentity,
    key: RevealKey,
    groups: AttachmentGroups,
    session: RevealSession,
    timer: Option<RevealTimer>,
    gate: DisclosureGate,
    copy_feedback: CopyFeedback,
    failed_images: HashSet<(GroupKind, usize)>,
}

impl MessageView {
    /// Mounts a view and starts its reveal.
    pub fn mount(
        message: Message,
        key: RevealKey,
        mode: RevealMode,
        timing: RevealTiming,
        copy_feedback: CopyFeedback,
        signal_tx: RevealSignalSender,
    ) -> Self {
        let groups = AttachmentGroups::classify(&message.attachments);
        let mut session = RevealSession::new(message.char_len());

        let timer = match mode {
            RevealMode::Animated => RevealTimer::spawn(key, message.char_len(), timing, signal_tx),
            RevealMode::Instant => None,
        };
        let mode = if timer.is_some() {
            RevealMode::Animated
        } else {
            RevealMode::Instant
        };
        session.start(mode);

        Self {
            identity: message.identity(),
            message,
            key,
            groups,
            session,
            timer,
            gate: DisclosureGate::new(),
            copy_feedback,
            failed_images: HashSet::new(),
        }
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn identity(&self) -> MessageIdentity {
        self.identity
    }

    pub fn key(&self) -> RevealKey {
        self.key
    }

    pub fn groups(&self) -> &AttachmentGroups {
        &self.groups
    }

    pub fn reveal_state(&self) -> RevealState {
        self.session.state()
    }

    pub fn revealed_len(&self) -> usize {
        self.session.revealed_len()
    }

    pub fn consent(&self) -> Consent {
        self.gate.consent()
    }

    pub fn has_active_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Applies a timer signal. Returns whether the render changed.
    pub fn apply_signal(&mut self, signal: RevealSignal) -> bool {
        if signal.key != self.key {
            return false;
        }

        let step = match signal.kind {
            RevealSignalKind::Tick => self.session.apply_tick(),
            RevealSignalKind::MediaReady => {
                // The timer has nothing left to emit.
                self.timer = None;
                self.session.apply_media_ready()
            }
        };

        match step {
            RevealStep::Advanced { .. } => true,
            RevealStep::Finished => {
                tracing::debug!(key = ?self.key, "reveal finished; waiting for media grace delay");
                true
            }
            RevealStep::MediaReady => true,
            RevealStep::Ignored => false,
        }
    }

    /// Records the user's disclosure answer.
    pub fn choose(&mut self, consent: Consent) -> bool {
        let changed = self.gate.choose(consent);
        if changed {
            tracing::info!(
                message_id = self.message.id.0,
                ?consent,
                "attachment disclosure answered"
            );
        }
        changed
    }

    /// Copies the full message text to the clipboard.
    pub fn copy_text(&mut self, clipboard: &mut dyn Clipboard, now: Instant) -> CopyIndicator {
        self.copy_feedback.copy(clipboard, &self.message.content, now)
    }

    /// Marks an image in a disclosed section as failed so it renders as a placeholder.
    pub fn report_image_load_failure(&mut self, kind: GroupKind, index: usize) {
        if index < self.groups.len_of(kind) {
            self.failed_images.insert((kind, index));
        }
    }

    pub fn render(&self, now: Instant) -> MessageRender<'_> {
        let mut disclosure = self.gate.decide(self.session.state(), &self.groups);
        if let Disclosure::Sections(sections) = &mut disclosure {
            for section in sections.iter_mut() {
                for (index, item) in section.items.iter_mut().enumerate() {
                    if self.failed_images.contains(&(section.kind, index)) {
                        item.fall_back_to_placeholder();
                    }
                }
            }
        }

        MessageRender {
            id: self.message.id,
            role: self.message.role,
            text: self.session.visible_text(&self.message.content),
            reveal: self.session.state(),
            disclosure,
            copy_indicator: self.copy_feedback.indicator(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::{AttachmentPayload, ImageAttachment, VideoAttachment};
    use crate::disclosure::{DisclosedItem, ImageSource};
    use tokio::sync::mpsc;

    fn payload() -> AttachmentPayload {
        AttachmentPayload {
            structure_images: Some(vec![ImageAttachment {
                image_url: Some("https://cdn.example/viscose.png".to_string()),
                ..Default::default()
            }]),
            related_videos: Some(vec![VideoAttachment {
                video_link: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    fn mount(
        message: Message,
        mode: RevealMode,
    ) -> (MessageView, mpsc::UnboundedReceiver<RevealSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let key = RevealKey::new(message.id, 1);
        let view = MessageView::mount(
            message,
            key,
            mode,
            RevealTiming::default(),
            CopyFeedback::default(),
            tx,
        );
        (view, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn instant_view_shows_prompt_without_timer() {
        let message = Message::assistant(MessageId::new(1), "Viscose is regenerated cellulose.")
            .with_attachments(payload());
        let (mut view, _rx) = mount(message, RevealMode::Instant);

        assert!(!view.has_active_timer());
        let render = view.render(Instant::now());
        assert_eq!(render.text, "Viscose is regenerated cellulose.");
        assert!(matches!(render.disclosure, Disclosure::Prompt(_)));

        assert!(view.choose(Consent::Accepted));
        let Disclosure::Sections(sections) = view.render(Instant::now()).disclosure else {
            panic!("expected sections");
        };
        assert_eq!(sections.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_image_loads_render_placeholders() {
        let message = Message::assistant(MessageId::new(2), "Viscose.").with_attachments(payload());
        let (mut view, _rx) = mount(message, RevealMode::Instant);
        view.choose(Consent::Accepted);

        view.report_image_load_failure(GroupKind::RelatedVideos, 0);
        view.report_image_load_failure(GroupKind::MorphologyImages, 0);

        let Disclosure::Sections(sections) = view.render(Instant::now()).disclosure else {
            panic!("expected sections");
        };
        assert_eq!(
            sections[0].items[0],
            DisclosedItem::Image {
                caption: None,
                source: ImageSource::Remote("https://cdn.example/viscose.png".to_string())
            }
        );
        assert!(matches!(
            sections[1].items[0],
            DisclosedItem::Video {
                thumbnail: ImageSource::Placeholder,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn signals_for_other_keys_are_ignored() {
        let message = Message::assistant_fresh(MessageId::new(3), "Hemp");
        let (mut view, _rx) = mount(message, RevealMode::Animated);

        let stale = RevealSignal {
            key: RevealKey::new(MessageId::new(3), 0),
            kind: RevealSignalKind::Tick,
        };
        assert!(!view.apply_signal(stale));
        assert_eq!(view.revealed_len(), 0);
        assert_eq!(view.render(Instant::now()).text, "");
    }

    #[test]
    fn animated_view_without_runtime_renders_instantly() {
        let message = Message::assistant_fresh(MessageId::new(4), "Ramie");
        let (view, _rx) = mount(message, RevealMode::Animated);

        assert!(!view.has_active_timer());
        assert_eq!(view.reveal_state(), RevealState::Complete { media_ready: true });
    }
}
