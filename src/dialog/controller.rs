use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::config::AddonConfig;
use crate::gemini::{DEFAULT_MODEL, DEFAULT_VOICE, GeminiClient, MAX_TTS_CHARS, Transport};
use crate::host::HostServices;
use crate::palette::Tone;
use crate::playback::{Player, default_audio_path, save_audio};
use crate::tui::TextField;
use crate::utils::{char_count, trim_line};

const NEED_KEY: &str = "Please enter an API key";
const NEED_KEY_FIRST: &str = "Please enter an API key first";
const NEED_PROMPT: &str = "Please enter a prompt";
const NEED_TTS_TEXT: &str = "Please enter text for TTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub tone: Tone,
}

impl Status {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new("Ready", Tone::Neutral)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    SaveKey,
    TestConnection,
    GenerateText,
    GenerateSpeech,
}

impl DialogAction {
    fn busy_text(self) -> &'static str {
        match self {
            DialogAction::SaveKey => "Saving API key...",
            DialogAction::TestConnection => "Testing connection...",
            DialogAction::GenerateText => "Generating text...",
            DialogAction::GenerateSpeech => "Generating speech...",
        }
    }
}

/// Rejects blank text and text over the synthesis limit before any request is made.
pub fn validate_tts_text(text: &str) -> Result<&str, String> {
    let Some(text) = trim_line(text) else {
        return Err(NEED_TTS_TEXT.to_string());
    };
    let len = char_count(text);
    if len > MAX_TTS_CHARS {
        return Err(format!(
            "Text is too long for TTS (maximum {MAX_TTS_CHARS} characters, got {len})"
        ));
    }
    Ok(text)
}

/// Form state and the four user actions. Every failure ends in a status and a notice.
pub struct DialogController {
    pub api_key: TextField,
    pub prompt: TextField,
    pub tts_text: TextField,
    result: String,
    status: Status,
    busy: Option<DialogAction>,
    idle_status: Option<Status>,
    model: String,
    voice: String,
    audio_path: PathBuf,
}

impl DialogController {
    pub fn new() -> Self {
        Self {
            api_key: TextField::single_line().masked(),
            prompt: TextField::multiline(),
            tts_text: TextField::multiline(),
            result: String::new(),
            status: Status::default(),
            busy: None,
            idle_status: None,
            model: DEFAULT_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            audio_path: default_audio_path(),
        }
    }

    pub fn with_audio_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_path = path.into();
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn busy(&self) -> Option<DialogAction> {
        self.busy
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    /// Marks an action as running so the view can redraw before the request blocks it.
    pub fn begin(&mut self, action: DialogAction) {
        if self.busy.is_none() {
            self.idle_status = Some(self.status.clone());
        }
        self.busy = Some(action);
        self.status = Status::new(action.busy_text(), Tone::Busy);
    }

    fn finish(&mut self, status: Status) {
        self.busy = None;
        self.idle_status = None;
        self.status = status;
    }

    /// Validation failures leave the status as it was before the action started.
    fn reject(&mut self, host: &mut impl HostServices, message: &str) {
        self.busy = None;
        if let Some(status) = self.idle_status.take() {
            self.status = status;
        }
        host.show_notice(message);
    }

    pub fn load_config(&mut self, host: &mut impl HostServices) {
        match host.get_config() {
            Ok(config) => {
                if let Some(key) = config.api_key() {
                    self.api_key.set_text(key);
                    self.status = Status::new("API key loaded from config", Tone::Success);
                }
            }
            Err(err) => {
                warn!(error = %err, "could not load config");
                self.status = Status::new("Could not load saved settings", Tone::Failure);
                host.show_notice(&format!("Could not load saved settings:\n{err:#}"));
            }
        }
    }

    pub fn save_key(&mut self, host: &mut impl HostServices) {
        let key = self.api_key.text();
        let Some(key) = trim_line(&key) else {
            self.reject(host, NEED_KEY);
            return;
        };

        match host.write_config(&AddonConfig::with_api_key(key)) {
            Ok(()) => {
                info!("API key saved");
                self.finish(Status::new("API key saved successfully", Tone::Success));
                host.show_notice("API key saved successfully!");
            }
            Err(err) => {
                error!(error = %err, "could not save API key");
                self.finish(Status::new("Could not save API key", Tone::Failure));
                host.show_notice(&format!("Could not save API key:\n{err:#}"));
            }
        }
    }

    pub async fn test_connection<T: Transport>(
        &mut self,
        host: &mut impl HostServices,
        transport: T,
    ) {
        let key = self.api_key.text();
        let Some(key) = trim_line(&key) else {
            self.reject(host, NEED_KEY_FIRST);
            return;
        };

        self.begin(DialogAction::TestConnection);
        let client = GeminiClient::new(key, transport);
        match client.test_connection().await {
            Ok(_) => {
                self.finish(Status::new("Connection successful!", Tone::Success));
                host.show_notice("Connection test successful!");
            }
            Err(err) => {
                self.finish(Status::new(format!("Connection failed: {err}"), Tone::Failure));
                host.show_notice(&format!("Connection test failed:\n{err}"));
            }
        }
    }

    pub async fn generate_text<T: Transport>(
        &mut self,
        host: &mut impl HostServices,
        transport: T,
    ) {
        let key = self.api_key.text();
        let Some(key) = trim_line(&key) else {
            self.reject(host, NEED_KEY_FIRST);
            return;
        };
        let prompt = self.prompt.text();
        let Some(prompt) = trim_line(&prompt) else {
            self.reject(host, NEED_PROMPT);
            return;
        };

        self.begin(DialogAction::GenerateText);
        let client = GeminiClient::new(key, transport);
        match client.generate_text(prompt, &self.model).await {
            Ok(text) => {
                self.result = text;
                self.finish(Status::new("Text generated successfully", Tone::Success));
            }
            Err(err) => {
                self.result = format!("Error: {err}");
                self.finish(Status::new("Text generation failed", Tone::Failure));
                host.show_notice(&format!("Text generation failed:\n{err}"));
            }
        }
    }

    pub async fn generate_speech<T: Transport>(
        &mut self,
        host: &mut impl HostServices,
        transport: T,
        player: &impl Player,
    ) {
        let key = self.api_key.text();
        let Some(key) = trim_line(&key) else {
            self.reject(host, NEED_KEY_FIRST);
            return;
        };
        let text = self.tts_text.text();
        let text = match validate_tts_text(&text) {
            Ok(text) => text,
            Err(message) => {
                self.reject(host, &message);
                return;
            }
        };

        self.begin(DialogAction::GenerateSpeech);
        let client = GeminiClient::new(key, transport);
        let audio = match client.generate_tts_audio(text, &self.voice).await {
            Ok(audio) => audio,
            Err(err) => {
                self.finish(Status::new("TTS generation failed", Tone::Failure));
                host.show_notice(&format!("TTS generation failed:\n{err}"));
                return;
            }
        };

        if let Err(err) = save_audio(&audio, &self.audio_path) {
            error!(error = %err, "could not save audio");
            self.finish(Status::new("Could not save audio", Tone::Failure));
            host.show_notice(&format!("{err:#}"));
            return;
        }

        self.finish(Status::new("Speech generated successfully", Tone::Success));
        if let Err(err) = player.play(&self.audio_path) {
            warn!(error = %err, "could not launch audio player");
            host.show_notice(&format!(
                "Audio saved to {} but could not be played: {}",
                self.audio_path.display(),
                err
            ));
        }
    }
}

impl Default for DialogController {
    fn default() -> Self {
        Self::new()
    }
}
