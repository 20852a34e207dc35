use std::io::Write;

use fibra_chat::{
    Clipboard, Consent, ConversationView, CopyIndicator, DisclosedItem, DisclosedSection,
    Disclosure, ImageSource, Message, MessageId, MessageRender, Role, ScrollManager,
};
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::Instant;

use crate::settings::{ConsoleSettings, SettingsError};
use crate::transcript::{Transcript, TranscriptError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConsoleError {
    #[snafu(display("failed to load transcript on `{stage}`: {source}"))]
    LoadTranscript {
        stage: &'static str,
        source: TranscriptError,
    },
    #[snafu(display("failed to save settings on `{stage}`: {source}"))]
    SaveSettings {
        stage: &'static str,
        source: SettingsError,
    },
    #[snafu(display("failed to write terminal output on `{stage}`: {source}"))]
    WriteOutput {
        stage: &'static str,
        source: std::io::Error,
    },
    #[snafu(display("failed to read disclosure answer on `{stage}`: {source}"))]
    ReadAnswer {
        stage: &'static str,
        source: std::io::Error,
    },
}

pub fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Fibra",
    }
}

/// Renders one message snapshot as plain terminal lines.
pub fn render_lines(render: &MessageRender<'_>) -> Vec<String> {
    let mut lines = vec![format!("{}: {}", speaker(render.role), render.text)];

    match render.copy_indicator {
        CopyIndicator::None => {}
        CopyIndicator::Copied => lines.push("  (copied)".to_string()),
        CopyIndicator::Failed => lines.push("  (copy failed)".to_string()),
    }

    match &render.disclosure {
        Disclosure::Hidden => {}
        Disclosure::Prompt(prompt) => lines.push(format!("  {} [y/n]", prompt.question)),
        Disclosure::Sections(sections) => lines.extend(section_lines(sections)),
    }

    lines
}

pub fn section_lines(sections: &[DisclosedSection]) -> Vec<String> {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(format!("  == {} ==", section.title));
        lines.extend(section.items.iter().map(item_line));
    }
    lines
}

fn item_line(item: &DisclosedItem) -> String {
    match item {
        DisclosedItem::Image { caption, source } => format!(
            "    - {}: {}",
            caption.as_deref().unwrap_or("image"),
            image_source(source)
        ),
        DisclosedItem::Fiber(card) => {
            let details: Vec<&str> = [card.class_name.as_deref(), card.subtype_name.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if details.is_empty() {
                format!("    - {}", card.name)
            } else {
                format!("    - {} ({})", card.name, details.join(", "))
            }
        }
        DisclosedItem::Video {
            title,
            link,
            thumbnail,
        } => format!(
            "    - {}: {} [thumbnail {}]",
            title.as_deref().unwrap_or("video"),
            link,
            image_source(thumbnail)
        ),
    }
}

fn image_source(source: &ImageSource) -> &str {
    match source {
        ImageSource::Remote(url) => url,
        ImageSource::Placeholder => "unavailable",
    }
}

/// Interactive replay of a transcript on a terminal.
///
/// Messages are appended one at a time; each one reveals in place before the next is shown.
pub struct TerminalReplay<R, W> {
    input: R,
    output: W,
    conversation: ConversationView<ScrollManager>,
    shown: Vec<Message>,
    written: usize,
}

impl<R, W> TerminalReplay<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(settings: &ConsoleSettings, input: R, output: W) -> Self {
        let conversation = ConversationView::new(settings.reveal_timing(), ScrollManager::new())
            .with_copy_feedback(settings.copy_feedback());
        Self {
            input,
            output,
            conversation,
            shown: Vec::new(),
            written: 0,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn play(&mut self, transcript: &Transcript) -> Result<(), ConsoleError> {
        if let Some(title) = &transcript.title {
            self.write(&format!("# {title}\n\n"), "write-transcript-title")?;
        }

        for message in &transcript.messages {
            self.play_message(message.clone()).await?;
        }

        self.flush()
    }

    async fn play_message(&mut self, message: Message) -> Result<(), ConsoleError> {
        let id = message.id;
        self.write(&format!("{}: ", speaker(message.role)), "write-speaker")?;

        self.shown.push(message);
        self.conversation.set_messages(&self.shown);

        let mut printed = 0;
        loop {
            printed = self.write_revealed(id, printed)?;
            self.follow_tail()?;
            if self.conversation.pump().await.is_none() {
                break;
            }
        }
        printed = self.write_revealed(id, printed)?;
        tracing::debug!(message_id = id.0, bytes = printed, "message revealed");
        self.write("\n", "write-message-end")?;

        self.write_media(id).await
    }

    fn write_revealed(&mut self, id: MessageId, printed: usize) -> Result<usize, ConsoleError> {
        let Some(view) = self.conversation.view(id) else {
            return Ok(printed);
        };

        let render = view.render(Instant::now());
        let Some(delta) = render.text.get(printed..) else {
            return Ok(printed);
        };
        let revealed = render.text.len();
        if !delta.is_empty() {
            self.output
                .write_all(delta.as_bytes())
                .context(WriteOutputSnafu {
                    stage: "write-revealed-text",
                })?;
            self.written += delta.len();
        }
        Ok(revealed)
    }

    fn follow_tail(&mut self) -> Result<(), ConsoleError> {
        let written = self.written as f32;
        let scroll = self.conversation.scroll_sync_mut();
        scroll.set_viewport(scroll.offset(), written);
        scroll.update_follow_state();
        if scroll.apply_pending_scroll() {
            self.flush()?;
        }
        Ok(())
    }

    async fn write_media(&mut self, id: MessageId) -> Result<(), ConsoleError> {
        let disclosure = self
            .conversation
            .view(id)
            .map(|view| view.render(Instant::now()).disclosure)
            .unwrap_or_default();

        let disclosure = match disclosure {
            Disclosure::Prompt(prompt) => {
                match self.ask(&prompt.question).await? {
                    Some(consent) => {
                        self.conversation.choose(id, consent);
                    }
                    None => tracing::debug!(message_id = id.0, "input closed before an answer"),
                }
                self.conversation
                    .view(id)
                    .map(|view| view.render(Instant::now()).disclosure)
                    .unwrap_or_default()
            }
            other => other,
        };

        if let Disclosure::Sections(sections) = disclosure {
            for line in section_lines(&sections) {
                self.write(&format!("{line}\n"), "write-attachment-section")?;
            }
        }
        Ok(())
    }

    /// Asks the disclosure question until a yes/no answer arrives. `None` on end of input.
    async fn ask(&mut self, question: &str) -> Result<Option<Consent>, ConsoleError> {
        loop {
            self.write(&format!("  {question} [y/n] "), "write-disclosure-question")?;
            self.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .await
                .context(ReadAnswerSnafu {
                    stage: "read-disclosure-answer",
                })?;
            if read == 0 {
                self.write("\n", "write-disclosure-eof")?;
                return Ok(None);
            }

            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(Consent::Accepted)),
                "n" | "no" => return Ok(Some(Consent::Declined)),
                _ => {}
            }
        }
    }

    /// Copies the last assistant answer and prints the transient indicator.
    pub fn copy_last(
        &mut self,
        clipboard: &mut dyn Clipboard,
    ) -> Result<Option<CopyIndicator>, ConsoleError> {
        let Some(id) = self
            .shown
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
            .map(|message| message.id)
        else {
            self.write("(nothing to copy)\n", "write-copy-indicator")?;
            return Ok(None);
        };

        let indicator = self.conversation.copy_text(id, clipboard, Instant::now());
        match indicator {
            Some(CopyIndicator::Copied) => self.write("(copied)\n", "write-copy-indicator")?,
            Some(CopyIndicator::Failed) => self.write("(copy failed)\n", "write-copy-indicator")?,
            Some(CopyIndicator::None) | None => {}
        }
        self.flush()?;
        Ok(indicator)
    }

    fn write(&mut self, text: &str, stage: &'static str) -> Result<(), ConsoleError> {
        self.output
            .write_all(text.as_bytes())
            .context(WriteOutputSnafu { stage })?;
        self.written += text.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ConsoleError> {
        self.output.flush().context(WriteOutputSnafu {
            stage: "flush-terminal-output",
        })
    }
}
