use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

pub const AUDIO_FILE_NAME: &str = "anki_tts_output.mp3";

/// Fixed output location, overwritten by every synthesis.
pub fn default_audio_path() -> PathBuf {
    std::env::temp_dir().join(AUDIO_FILE_NAME)
}

pub fn save_audio(audio: &[u8], path: &Path) -> Result<()> {
    fs::write(path, audio)
        .with_context(|| format!("Failed to write audio to {}", path.display()))?;
    info!(path = %path.display(), bytes = audio.len(), "saved synthesized audio");
    Ok(())
}

pub trait Player {
    fn play(&self, path: &Path) -> io::Result<()>;
}

/// Hands the file to the OS default handler (`start`, `open` or `xdg-open`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OsPlayer;

impl Player for OsPlayer {
    fn play(&self, path: &Path) -> io::Result<()> {
        debug!(path = %path.display(), "opening audio with the system player");
        open::that_detached(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_path_lives_in_temp_dir() {
        let path = default_audio_path();
        assert_eq!(path.parent(), Some(std::env::temp_dir().as_path()));
        assert_eq!(path.file_name().unwrap(), AUDIO_FILE_NAME);
    }

    #[test]
    fn save_audio_overwrites_previous_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(AUDIO_FILE_NAME);

        save_audio(b"first take, longer", &path).unwrap();
        save_audio(b"second", &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn save_audio_reports_the_path_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join(AUDIO_FILE_NAME);

        let err = save_audio(b"x", &path).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
