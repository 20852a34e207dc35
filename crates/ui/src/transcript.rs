use std::path::{Path, PathBuf};

use fibra_chat::{AttachmentPayload, Message, MessageId, Role};
use serde::Deserialize;
use snafu::{ResultExt, Snafu};

/// Messages replayed by the console, in conversation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub title: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Messages(Vec<TranscriptEntry>),
    Conversation {
        #[serde(default)]
        title: Option<String>,
        messages: Vec<TranscriptEntry>,
    },
}

/// Stored conversations omit ids; missing ones are numbered after the largest explicit id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptEntry {
    #[serde(default)]
    id: Option<MessageId>,
    role: Role,
    #[serde(default)]
    content: String,
    #[serde(default)]
    freshly_produced: bool,
    #[serde(default, rename = "attachmentGroups")]
    attachments: AttachmentPayload,
}

impl Transcript {
    pub fn load(path: &Path) -> Result<Self, TranscriptError> {
        let content = std::fs::read_to_string(path).context(ReadFileSnafu {
            stage: "read-transcript-file",
            path: path.to_path_buf(),
        })?;
        let transcript = Self::parse(&content).context(ParseJsonSnafu {
            stage: "parse-transcript-json",
            path: path.to_path_buf(),
        })?;

        tracing::debug!(
            path = ?path,
            messages = transcript.messages.len(),
            "loaded transcript"
        );
        Ok(transcript)
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        let (title, entries) = match serde_json::from_str::<TranscriptFile>(content)? {
            TranscriptFile::Messages(entries) => (None, entries),
            TranscriptFile::Conversation { title, messages } => (title, messages),
        };

        let mut next_id = entries
            .iter()
            .filter_map(|entry| entry.id)
            .map(|id| id.0)
            .max()
            .unwrap_or(0);

        let messages = entries
            .into_iter()
            .map(|entry| Message {
                id: entry.id.unwrap_or_else(|| {
                    next_id = next_id.saturating_add(1);
                    MessageId::new(next_id)
                }),
                role: entry.role,
                content: entry.content,
                freshly_produced: entry.freshly_produced,
                attachments: entry.attachments,
            })
            .collect();

        Ok(Self { title, messages })
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranscriptError {
    #[snafu(display("failed to read transcript at {path:?} on `{stage}`: {source}"))]
    ReadFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse transcript at {path:?} on `{stage}`: {source}"))]
    ParseJson {
        stage: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_message_array() {
        let transcript = Transcript::parse(
            r#"[
                { "id": 7, "role": "user", "content": "What is lyocell?" },
                {
                    "id": 8,
                    "role": "assistant",
                    "content": "A regenerated cellulose fiber.",
                    "freshlyProduced": true,
                    "attachmentGroups": {
                        "relatedVideos": [{ "videoLink": "https://youtu.be/dQw4w9WgXcQ" }],
                        "structureImages": null
                    }
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(transcript.title, None);
        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[0].id, MessageId::new(7));
        let answer = &transcript.messages[1];
        assert!(answer.freshly_produced);
        assert_eq!(answer.attachments.structure_images, None);
        assert_eq!(
            answer.attachments.related_videos.as_ref().map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn stored_conversation_gets_sequential_ids() {
        let transcript = Transcript::parse(
            r#"{
                "title": "Bast fibers",
                "messages": [
                    { "role": "user", "content": "Is flax a bast fiber?" },
                    { "role": "ai", "content": "Yes." }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(transcript.title.as_deref(), Some("Bast fibers"));
        assert_eq!(transcript.messages[0].id, MessageId::new(1));
        assert_eq!(transcript.messages[1].id, MessageId::new(2));
        assert_eq!(transcript.messages[1].role, Role::Assistant);
    }

    #[test]
    fn missing_ids_never_collide_with_explicit_ones() {
        let transcript = Transcript::parse(
            r#"[
                { "id": 2, "role": "user", "content": "question" },
                { "role": "ai", "content": "the answer" },
                { "id": 1, "role": "user", "content": "follow-up" },
                { "role": "ai", "content": "second answer" }
            ]"#,
        )
        .unwrap();

        let ids: Vec<MessageId> = transcript.messages.iter().map(|message| message.id).collect();
        assert_eq!(
            ids,
            vec![
                MessageId::new(2),
                MessageId::new(3),
                MessageId::new(1),
                MessageId::new(4)
            ]
        );
        assert_eq!(transcript.messages[1].content, "the answer");
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();

        let missing = Transcript::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, TranscriptError::ReadFile { .. }));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{ "messages": "#).unwrap();
        let broken = Transcript::load(&path).unwrap_err();
        assert!(matches!(broken, TranscriptError::ParseJson { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.json");
        std::fs::write(&path, r#"[{ "id": 1, "role": "user", "content": "hi" }]"#).unwrap();

        let transcript = Transcript::load(&path).unwrap();
        assert_eq!(transcript.messages, vec![Message::user(MessageId::new(1), "hi")]);
    }
}
