/// Collaborator that keeps the conversation viewport in step with rendered changes.
///
/// The reveal engine calls [`ScrollSync::notify_rendered_change`] once per revealed character
/// and once when a message's media becomes ready, and at no other time.
pub trait ScrollSync {
    fn notify_rendered_change(&mut self);
}

impl<F> ScrollSync for F
where
    F: FnMut(),
{
    fn notify_rendered_change(&mut self) {
        self()
    }
}

/// Near-bottom distance used to resume follow mode deterministically.
const AUTO_FOLLOW_RESUME_THRESHOLD: f32 = 24.0;
/// Small delta used to ignore floating-point scroll jitter.
const SCROLL_DELTA_EPSILON: f32 = 1.0;

/// Follow-bottom behavior for a conversation viewport.
///
/// Offsets grow downward: `0` is the top and `max_offset` is the tail.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollManager {
    offset: f32,
    max_offset: f32,
    pending_scroll_to_bottom: bool,
    follow_bottom: bool,
    last_scroll_offset: f32,
    last_max_offset: f32,
}

impl ScrollManager {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            max_offset: 0.0,
            pending_scroll_to_bottom: false,
            follow_bottom: true,
            last_scroll_offset: 0.0,
            last_max_offset: 0.0,
        }
    }

    pub fn is_following_bottom(&self) -> bool {
        self.follow_bottom
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_scroll_to_bottom
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn max_offset(&self) -> f32 {
        self.max_offset
    }

    /// Records the viewport geometry reported by the presentation layer.
    pub fn set_viewport(&mut self, offset: f32, max_offset: f32) {
        self.max_offset = max_offset.max(0.0);
        self.offset = offset.clamp(0.0, self.max_offset);
    }

    pub fn request_scroll_to_bottom(&mut self) {
        self.pending_scroll_to_bottom = true;
        self.follow_bottom = true;
    }

    pub fn request_scroll_to_bottom_if_following(&mut self) {
        if self.follow_bottom || self.was_near_bottom() {
            self.pending_scroll_to_bottom = true;
        }
    }

    pub fn reset(&mut self) {
        self.last_scroll_offset = 0.0;
        self.last_max_offset = 0.0;
        self.follow_bottom = true;
        self.pending_scroll_to_bottom = true;
    }

    pub fn update_follow_state(&mut self) {
        let offset_delta = self.offset - self.last_scroll_offset;
        let max_delta = (self.max_offset - self.last_max_offset).abs();
        let content_size_changed = max_delta > SCROLL_DELTA_EPSILON;
        let user_scrolled_up = offset_delta < -SCROLL_DELTA_EPSILON && !content_size_changed;
        let user_scrolled_down = offset_delta > SCROLL_DELTA_EPSILON && !content_size_changed;

        // Keep follow mode enabled while we are fulfilling an explicit follow request.
        if self.pending_scroll_to_bottom || (content_size_changed && self.was_near_bottom()) {
            self.follow_bottom = true;
        } else if self.follow_bottom {
            // Pause follow mode only when the user manually scrolls away from the tail.
            if user_scrolled_up {
                self.follow_bottom = false;
            }
        } else if user_scrolled_down && self.is_near_bottom() {
            self.follow_bottom = true;
        }

        self.last_scroll_offset = self.offset;
        self.last_max_offset = self.max_offset;
    }

    /// Moves to the tail when following or when a scroll was requested.
    pub fn apply_pending_scroll(&mut self) -> bool {
        let should_scroll = self.follow_bottom || self.pending_scroll_to_bottom;

        if should_scroll {
            self.offset = self.max_offset;
        }

        self.pending_scroll_to_bottom = false;
        should_scroll
    }

    fn is_near_bottom(&self) -> bool {
        self.max_offset <= 0.0 || (self.max_offset - self.offset) <= AUTO_FOLLOW_RESUME_THRESHOLD
    }

    fn was_near_bottom(&self) -> bool {
        self.last_max_offset <= 0.0
            || (self.last_max_offset - self.last_scroll_offset) <= AUTO_FOLLOW_RESUME_THRESHOLD
    }
}

impl Default for ScrollManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollSync for ScrollManager {
    fn notify_rendered_change(&mut self) {
        self.request_scroll_to_bottom_if_following();
    }
}
