use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueHint};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use gemini_tts::commands::{generate, key, menu, speak};
use gemini_tts::config::ConfigStore;
use gemini_tts::dialog::{self, DialogController};
use gemini_tts::gemini::{DEFAULT_MODEL, DEFAULT_VOICE};
use gemini_tts::host::TerminalHost;
use gemini_tts::utils::get_data_dir;

#[derive(Parser, Debug)]
#[command(
    name = "gemini-tts",
    version,
    about = "Gemini text generation and text-to-speech for your flashcards.",
    long_about = "Run without a subcommand to open the tools menu.",
    propagate_version = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the Gemini TTS dialog
    Dialog {
        /// Model used for text generation
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        /// Voice used for speech
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,
    },
    /// Manage the stored Google AI API key
    Key {
        /// Store a new API key in the local config file. Prompts when no value is given.
        #[arg(
            long,
            value_name = "KEY",
            num_args = 0..=1,
            default_missing_value = "",
            conflicts_with = "clear"
        )]
        set: Option<String>,
        /// Remove the stored API key from the local config file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key with a minimal generation request
        #[arg(long)]
        test: bool,
    },
    /// Generate text from a prompt
    Generate {
        /// Prompt to send
        #[arg(value_name = "PROMPT")]
        prompt: String,
        /// Model to use
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
    },
    /// Convert text to speech, save it as MP3 and play it
    Speak {
        /// Text to speak (at most 5000 characters)
        #[arg(value_name = "TEXT")]
        text: String,
        /// Voice name
        #[arg(long, default_value = DEFAULT_VOICE)]
        voice: String,
        /// Where to write the MP3. Defaults to the system temp directory.
        #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
        /// Save the audio without opening it
        #[arg(long, default_value_t = false)]
        no_play: bool,
        /// Show the request that would be sent, without sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing()?;
    let store = ConfigStore::open_default()?;

    match cli.command {
        None => menu::run(store).await?,
        Some(Command::Dialog { model, voice }) => {
            let mut host = TerminalHost::new(store);
            let controller = DialogController::new().with_model(model).with_voice(voice);
            dialog::open_with(&mut host, controller).await?;
        }
        Some(Command::Key { set, clear, test }) => key::run(&store, set, clear, test).await?,
        Some(Command::Generate { prompt, model }) => {
            generate::run(&store, &prompt, &model).await?
        }
        Some(Command::Speak {
            text,
            voice,
            output,
            no_play,
            dry_run,
        }) => {
            let options = speak::SpeakOptions {
                voice,
                output,
                play: !no_play,
                dry_run,
            };
            speak::run(&store, &text, options).await?
        }
    }

    Ok(())
}

/// Logs go to a file so the dialog's screen is never written over.
fn setup_tracing() -> Result<()> {
    use tracing_subscriber::fmt;

    let log_file = get_data_dir()?.join("gemini-tts.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}
