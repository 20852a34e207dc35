#![deny(unsafe_code)]

//! Terminal front end for the fibra chat panel: replays a saved conversation with the same
//! reveal and attachment disclosure behavior as the desktop panel.

pub mod clipboard;
pub mod settings;
pub mod terminal;
pub mod transcript;

pub use clipboard::SystemClipboard;
pub use settings::{ConsoleSettings, SettingsError, SettingsStore};
pub use terminal::{ConsoleError, TerminalReplay};
pub use transcript::{Transcript, TranscriptError};
