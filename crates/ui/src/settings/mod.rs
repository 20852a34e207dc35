pub mod state;

pub use state::{ConsoleSettings, RevealSettings, SettingsError, SettingsStore};
