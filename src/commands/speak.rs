use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::config::ConfigStore;
use crate::dialog::validate_tts_text;
use crate::gemini::{GeminiClient, tts_request_preview};
use crate::palette::Palette;
use crate::playback::{OsPlayer, Player, default_audio_path, save_audio};

use super::require_api_key;

pub struct SpeakOptions {
    pub voice: String,
    pub output: Option<PathBuf>,
    pub play: bool,
    pub dry_run: bool,
}

pub async fn run(store: &ConfigStore, text: &str, options: SpeakOptions) -> Result<()> {
    let text = validate_tts_text(text).map_err(|message| anyhow!(message))?;
    if options.dry_run {
        println!("{}", tts_request_preview(text));
        return Ok(());
    }
    let (key, _) = require_api_key(store)?;

    let client = GeminiClient::from_api_key(&key);
    let audio = client.generate_tts_audio(text, &options.voice).await?;

    let path = options.output.unwrap_or_else(default_audio_path);
    save_audio(&audio, &path)?;
    println!(
        "Saved speech to {}",
        Palette::paint(Palette::ACCENT, path.display())
    );

    if options.play
        && let Err(err) = OsPlayer.play(&path)
    {
        eprintln!(
            "{} could not launch an audio player: {}",
            Palette::paint(Palette::WARNING, "warning:"),
            err
        );
    }
    Ok(())
}
