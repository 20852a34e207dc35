use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fibra::terminal::{LoadTranscriptSnafu, SaveSettingsSnafu, WriteOutputSnafu};
use fibra::{ConsoleError, SettingsStore, SystemClipboard, TerminalReplay, Transcript};
use snafu::ResultExt;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fibra", version, about = "Replay fibra chat conversations in the terminal")]
struct Cli {
    /// Settings file to use instead of the per-user one.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a saved conversation, revealing fresh answers character by character.
    Play {
        transcript: PathBuf,
        /// Copy the last assistant answer to the clipboard after the replay.
        #[arg(long)]
        copy_last: bool,
    },
    /// Print the effective settings, optionally updating them first.
    Settings {
        #[arg(long)]
        tick_interval_ms: Option<u64>,
        #[arg(long)]
        post_complete_delay_ms: Option<u64>,
        #[arg(long)]
        copy_feedback_ms: Option<u64>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Reveal output owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "fibra failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ConsoleError> {
    let store = SettingsStore::open(cli.settings);

    match cli.command {
        Command::Play {
            transcript,
            copy_last,
        } => {
            let transcript = Transcript::load(&transcript).context(LoadTranscriptSnafu {
                stage: "load-transcript",
            })?;
            let settings = store.settings();
            let input = BufReader::new(tokio::io::stdin());
            let mut replay = TerminalReplay::new(&settings, input, std::io::stdout().lock());

            replay.play(&transcript).await?;
            if copy_last {
                replay.copy_last(&mut SystemClipboard::new())?;
            }
            Ok(())
        }
        Command::Settings {
            tick_interval_ms,
            post_complete_delay_ms,
            copy_feedback_ms,
        } => {
            let mut settings = (*store.settings()).clone();
            let before = settings.clone();
            if let Some(value) = tick_interval_ms {
                settings.reveal.tick_interval_ms = value;
            }
            if let Some(value) = post_complete_delay_ms {
                settings.reveal.post_complete_delay_ms = value;
            }
            if let Some(value) = copy_feedback_ms {
                settings.copy_feedback_ms = value;
            }
            if settings != before {
                store.update(settings).context(SaveSettingsSnafu {
                    stage: "update-settings",
                })?;
            }

            let rendered = serde_json::to_string_pretty(&*store.settings())
                .map_err(std::io::Error::other)
                .context(WriteOutputSnafu {
                    stage: "render-settings-json",
                })?;
            println!("{}", store.config_path().display());
            println!("{rendered}");
            Ok(())
        }
    }
}
