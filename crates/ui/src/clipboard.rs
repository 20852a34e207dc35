use fibra_chat::Clipboard;
use fibra_chat::clipboard::{ClipboardError, UnavailableSnafu, WriteTextSnafu};

/// Desktop clipboard. The backend is opened per copy so a missing display only fails the copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(error) => {
                return UnavailableSnafu {
                    stage: "open-system-clipboard",
                    details: error.to_string(),
                }
                .fail();
            }
        };

        if let Err(error) = clipboard.set_text(text) {
            return WriteTextSnafu {
                stage: "set-system-clipboard-text",
                details: error.to_string(),
            }
            .fail();
        }

        tracing::debug!(bytes = text.len(), "copied text to system clipboard");
        Ok(())
    }
}
