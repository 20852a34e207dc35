use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};

use crate::attachments::{AttachmentGroups, AttachmentPayload};

/// Stable identifier for one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The backend stores assistant turns as `ai`.
    #[serde(alias = "ai")]
    Assistant,
}

/// Immutable message input for one render cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// True only for an assistant answer generated during this session.
    #[serde(default)]
    pub freshly_produced: bool,
    #[serde(default, rename = "attachmentGroups")]
    pub attachments: AttachmentPayload,
}

impl Message {
    /// Creates a message without attachments.
    pub fn new(id: MessageId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            freshly_produced: false,
            attachments: AttachmentPayload::default(),
        }
    }

    /// Creates a user message.
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::User, content)
    }

    /// Creates an assistant message loaded from history.
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, content)
    }

    /// Creates an assistant message that was just produced and should animate.
    pub fn assistant_fresh(id: MessageId, content: impl Into<String>) -> Self {
        Self::assistant(id, content).freshly_produced()
    }

    pub fn freshly_produced(mut self) -> Self {
        self.freshly_produced = true;
        self
    }

    pub fn with_attachments(mut self, attachments: AttachmentPayload) -> Self {
        self.attachments = attachments;
        self
    }

    /// Number of revealable characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Identity used to decide whether a render can keep its reveal session.
    pub fn identity(&self) -> MessageIdentity {
        let mut hasher = DefaultHasher::new();

        hasher.write_u64(self.id.0);
        let role_tag = match self.role {
            Role::User => 1,
            Role::Assistant => 2,
        };
        hasher.write_u8(role_tag);
        hasher.write(self.content.as_bytes());
        // Attachment records hold floats, so the classified groups are hashed as JSON. Absent and
        // empty arrays classify the same and hash the same.
        match serde_json::to_vec(&AttachmentGroups::classify(&self.attachments)) {
            Ok(encoded) => hasher.write(&encoded),
            Err(error) => {
                tracing::warn!(message_id = self.id.0, %error, "attachments left out of identity")
            }
        }

        MessageIdentity {
            message_id: self.id,
            content_hash: hasher.finish(),
        }
    }
}

/// Message id plus a hash of role, content and attachments.
///
/// Two renders with the same identity share one reveal session; any change re-keys it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageIdentity {
    pub message_id: MessageId,
    pub content_hash: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachments::VideoAttachment;

    #[test]
    fn identity_ignores_freshness_but_tracks_content_and_role() {
        let base = Message::assistant(MessageId::new(7), "Cotton is cellulosic.");
        let same = base.clone().freshly_produced();
        let edited = Message::assistant(MessageId::new(7), "Cotton is a cellulosic fiber.");
        let as_user = Message::user(MessageId::new(7), "Cotton is cellulosic.");

        assert_eq!(base.identity(), same.identity());
        assert_ne!(base.identity(), edited.identity());
        assert_ne!(base.identity(), as_user.identity());
    }

    #[test]
    fn identity_changes_when_attachments_change() {
        let bare = Message::assistant(MessageId::new(7), "Cotton is cellulosic.");
        let with_video = bare.clone().with_attachments(AttachmentPayload {
            related_videos: Some(vec![VideoAttachment {
                video_link: "https://youtu.be/dQw4w9WgXcQ".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        });
        let explicit_empty = bare.clone().with_attachments(AttachmentPayload {
            related_videos: Some(Vec::new()),
            ..Default::default()
        });

        assert_ne!(bare.identity(), with_video.identity());
        assert_eq!(bare.identity(), explicit_empty.identity());
        assert_eq!(with_video.identity(), with_video.clone().identity());
    }

    #[test]
    fn deserializes_backend_payload_with_ai_role() {
        let message: Message = serde_json::from_str(
            r#"{
                "id": 3,
                "role": "ai",
                "content": "Wool is a protein fiber.",
                "freshlyProduced": true,
                "attachmentGroups": { "relatedVideos": [{ "videoLink": "https://youtu.be/dQw4w9WgXcQ" }] }
            }"#,
        )
        .unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert!(message.freshly_produced);
        assert_eq!(message.char_len(), 24);
        assert_eq!(message.attachments.related_videos.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn char_len_counts_unicode_scalars() {
        let message = Message::assistant(MessageId::new(1), "Ramié µm");
        assert_eq!(message.char_len(), 8);
    }
}
