use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use fibra_chat::clipboard::COPY_FEEDBACK_WINDOW_MS;
use fibra_chat::timer::{POST_COMPLETE_DELAY_MS, TICK_INTERVAL_MS};
use fibra_chat::{CopyFeedback, RevealTiming};
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "fibra";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Upper bound for any configured delay; larger values are clamped.
pub const MAX_DELAY_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSettings {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_post_complete_delay_ms")]
    pub post_complete_delay_ms: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            post_complete_delay_ms: default_post_complete_delay_ms(),
        }
    }
}

impl RevealSettings {
    fn normalized(mut self) -> Self {
        // A zero tick would flush the whole answer in one burst.
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = default_tick_interval_ms();
        }
        self.tick_interval_ms = self.tick_interval_ms.min(MAX_DELAY_MS);
        self.post_complete_delay_ms = self.post_complete_delay_ms.min(MAX_DELAY_MS);
        self
    }

    pub fn timing(&self) -> RevealTiming {
        RevealTiming::new(
            Duration::from_millis(self.tick_interval_ms),
            Duration::from_millis(self.post_complete_delay_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default = "default_copy_feedback_ms")]
    pub copy_feedback_ms: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            reveal: RevealSettings::default(),
            copy_feedback_ms: default_copy_feedback_ms(),
        }
    }
}

impl ConsoleSettings {
    pub fn normalized(mut self) -> Self {
        self.reveal = self.reveal.normalized();
        if self.copy_feedback_ms == 0 {
            self.copy_feedback_ms = default_copy_feedback_ms();
        }
        self.copy_feedback_ms = self.copy_feedback_ms.min(MAX_DELAY_MS);
        self
    }

    pub fn reveal_timing(&self) -> RevealTiming {
        self.reveal.timing()
    }

    pub fn copy_feedback(&self) -> CopyFeedback {
        CopyFeedback::new(Duration::from_millis(self.copy_feedback_ms))
    }
}

/// Console settings shared by the replay loop and the `settings` command.
pub struct SettingsStore {
    current: ArcSwap<ConsoleSettings>,
    path: PathBuf,
}

impl SettingsStore {
    /// Opens the store at `path`, or at the per-user settings file when none is given.
    pub fn open(path: Option<PathBuf>) -> Self {
        Self::new(path.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join(SETTINGS_DIRECTORY_NAME))
                .unwrap_or_else(|| PathBuf::from(".fibra"))
                .join(SETTINGS_FILE_NAME)
        }))
    }

    pub fn new(path: PathBuf) -> Self {
        Self {
            current: ArcSwap::from_pointee(read_settings(&path)),
            path,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> Arc<ConsoleSettings> {
        self.current.load_full()
    }

    /// Normalizes and saves `settings`; the in-memory copy changes only once the file is written.
    pub fn update(&self, settings: ConsoleSettings) -> Result<(), SettingsError> {
        let settings = settings.normalized();
        write_settings(&self.path, &settings)?;
        tracing::info!(path = ?self.path, ?settings, "console settings saved");
        self.current.store(Arc::new(settings));
        Ok(())
    }
}

fn read_settings(path: &Path) -> ConsoleSettings {
    if !path.exists() {
        tracing::debug!(?path, "no console settings file; using defaults");
        return ConsoleSettings::default();
    }

    Figment::from(Serialized::defaults(ConsoleSettings::default()))
        .merge(Json::file(path))
        .extract::<ConsoleSettings>()
        .map(ConsoleSettings::normalized)
        .unwrap_or_else(|error| {
            tracing::warn!(?path, %error, "unreadable console settings; using defaults");
            ConsoleSettings::default()
        })
}

fn write_settings(path: &Path, settings: &ConsoleSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).context(CreateDirectorySnafu {
            stage: "create-settings-directory",
            path: dir.to_path_buf(),
        })?;
    }

    let encoded = serde_json::to_vec_pretty(settings).context(EncodeSnafu {
        stage: "encode-settings-json",
    })?;

    // Staged beside the target, then renamed over it.
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, encoded).context(WriteStagingSnafu {
        stage: "write-staging-settings-file",
        path: staging.clone(),
    })?;
    std::fs::rename(&staging, path).context(ReplaceSnafu {
        stage: "replace-settings-file",
        path: path.to_path_buf(),
    })
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("cannot create settings directory {path:?} on `{stage}`: {source}"))]
    CreateDirectory {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot encode console settings on `{stage}`: {source}"))]
    Encode {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("cannot write staging settings file {path:?} on `{stage}`: {source}"))]
    WriteStaging {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("cannot replace settings file {path:?} on `{stage}`: {source}"))]
    Replace {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL_MS
}

fn default_post_complete_delay_ms() -> u64 {
    POST_COMPLETE_DELAY_MS
}

fn default_copy_feedback_ms() -> u64 {
    COPY_FEEDBACK_WINDOW_MS
}
