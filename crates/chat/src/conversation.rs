use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::clipboard::{Clipboard, CopyFeedback, CopyIndicator};
use crate::disclosure::Consent;
use crate::freshness::AnimationLedger;
use crate::message::{Message, MessageId};
use crate::scroll::ScrollSync;
use crate::timer::{
    RevealKey, RevealSignal, RevealSignalReceiver, RevealSignalSender, RevealTiming,
};
use crate::view::{MessageRender, MessageView};

/// Conversation-level owner of message views.
///
/// Views are keyed by message id and survive re-renders while the message identity is
/// unchanged. Timer signals are routed back to the owning view and stale ones dropped.
pub struct ConversationView<S: ScrollSync> {
    order: Vec<MessageId>,
    views: HashMap<MessageId, MessageView>,
    ledger: AnimationLedger,
    timing: RevealTiming,
    copy_feedback: CopyFeedback,
    scroll_sync: S,
    signal_tx: RevealSignalSender,
    signal_rx: RevealSignalReceiver,
    next_generation: u64,
}

impl<S: ScrollSync> ConversationView<S> {
    pub fn new(timing: RevealTiming, scroll_sync: S) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self {
            order: Vec::new(),
            views: HashMap::new(),
            ledger: AnimationLedger::new(),
            timing,
            copy_feedback: CopyFeedback::default(),
            scroll_sync,
            signal_tx,
            signal_rx,
            next_generation: 1,
        }
    }

    pub fn with_copy_feedback(mut self, copy_feedback: CopyFeedback) -> Self {
        self.copy_feedback = copy_feedback;
        self
    }

    pub fn scroll_sync(&self) -> &S {
        &self.scroll_sync
    }

    pub fn scroll_sync_mut(&mut self) -> &mut S {
        &mut self.scroll_sync
    }

    pub fn message_ids(&self) -> &[MessageId] {
        &self.order
    }

    pub fn view(&self, id: MessageId) -> Option<&MessageView> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: MessageId) -> Option<&mut MessageView> {
        self.views.get_mut(&id)
    }

    /// Replaces the rendered message list.
    ///
    /// Unchanged identities keep their view. Changed identities get a new view after the old
    /// one (and its timer) is dropped. Views for messages no longer present are dropped.
    pub fn set_messages(&mut self, messages: &[Message]) {
        let mut order = Vec::with_capacity(messages.len());
        let mut active_ids = HashSet::with_capacity(messages.len());

        for message in messages {
            let id = message.id;
            if !active_ids.insert(id) {
                tracing::warn!(message_id = id.0, "duplicate message id in render; keeping first");
                continue;
            }
            order.push(id);

            let unchanged = self
                .views
                .get(&id)
                .is_some_and(|view| view.identity() == message.identity());
            if unchanged {
                continue;
            }

            // Drop the previous view first so its timer is cancelled before a new one starts.
            if let Some(previous) = self.views.remove(&id) {
                tracing::debug!(key = ?previous.key(), "message identity changed; re-keying view");
                drop(previous);
            }

            let view = self.mount(message.clone());
            self.views.insert(id, view);
        }

        self.views.retain(|id, _| active_ids.contains(id));
        self.order = order;
    }

    fn mount(&mut self, message: Message) -> MessageView {
        let key = RevealKey::new(message.id, self.next_generation);
        self.next_generation = self.next_generation.saturating_add(1);

        let mode = self.ledger.claim(&message);
        MessageView::mount(
            message,
            key,
            mode,
            self.timing,
            self.copy_feedback,
            self.signal_tx.clone(),
        )
    }

    pub fn has_active_reveals(&self) -> bool {
        self.views.values().any(MessageView::has_active_timer)
    }

    /// Waits for the next timer signal and applies it.
    ///
    /// Returns the id of the message whose render changed, or `None` once no reveal is
    /// running. The scroll collaborator is notified once per applied signal.
    pub async fn pump(&mut self) -> Option<MessageId> {
        loop {
            if !self.has_active_reveals() {
                while let Ok(signal) = self.signal_rx.try_recv() {
                    tracing::debug!(key = ?signal.key, "dropping reveal signal for inactive view");
                }
                return None;
            }

            let signal = self.signal_rx.recv().await?;
            if let Some(id) = self.route(signal) {
                return Some(id);
            }
        }
    }

    /// Pumps until every running reveal has delivered its media-ready signal.
    pub async fn settle(&mut self) {
        while self.pump().await.is_some() {}
    }

    fn route(&mut self, signal: RevealSignal) -> Option<MessageId> {
        let Some(view) = self.views.get_mut(&signal.key.message_id) else {
            tracing::debug!(key = ?signal.key, "dropping reveal signal for removed message");
            return None;
        };

        if view.key() != signal.key {
            tracing::debug!(
                key = ?signal.key,
                current = ?view.key(),
                "dropping stale reveal signal"
            );
            return None;
        }

        if !view.apply_signal(signal) {
            return None;
        }

        self.scroll_sync.notify_rendered_change();
        Some(signal.key.message_id)
    }

    pub fn choose(&mut self, id: MessageId, consent: Consent) -> bool {
        self.views
            .get_mut(&id)
            .is_some_and(|view| view.choose(consent))
    }

    pub fn copy_text(
        &mut self,
        id: MessageId,
        clipboard: &mut dyn Clipboard,
        now: Instant,
    ) -> Option<CopyIndicator> {
        self.views
            .get_mut(&id)
            .map(|view| view.copy_text(clipboard, now))
    }

    /// Renders every message in conversation order.
    pub fn render(&self, now: Instant) -> Vec<MessageRender<'_>> {
        self.order
            .iter()
            .filter_map(|id| self.views.get(id))
            .map(|view| view.render(now))
            .collect()
    }
}
