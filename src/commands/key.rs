use anyhow::{Result, bail};
use dialoguer::{Password, theme::ColorfulTheme};

use crate::addon::API_KEY_URL;
use crate::config::{ADDON_ID, AddonConfig, ConfigStore};
use crate::gemini::GeminiClient;
use crate::palette::Palette;
use crate::utils::{strip_controls_and_escapes, trim_line};

use super::require_api_key;

/// `set` is `Some("")` when `--set` was passed without a value; the key is then prompted for.
pub async fn run(store: &ConfigStore, set: Option<String>, clear: bool, test: bool) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        let key = if trim_line(&key).is_some() {
            key
        } else {
            prompt_for_api_key()?
        };
        let Some(key) = trim_line(&key) else {
            bail!("Cannot store an empty API key");
        };
        store.save(ADDON_ID, &AddonConfig::with_api_key(key))?;
        println!(
            "Stored Google AI API key in {}.",
            Palette::paint(Palette::ACCENT, store.path().display())
        );
        action_taken = true;
    }

    if clear {
        if store.clear(ADDON_ID)? {
            println!("Removed the stored Google AI API key.");
        } else {
            println!("No Google AI API key found in the config file.");
        }
        action_taken = true;
    }

    if test {
        let (key, source) = require_api_key(store)?;
        let client = GeminiClient::from_api_key(&key);
        let message = client.test_connection().await?;
        println!(
            "{} (key from the {}).",
            Palette::paint(Palette::SUCCESS, message),
            source.description()
        );
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}

fn prompt_for_api_key() -> Result<String> {
    println!(
        "{} ({}). It's stored locally for future use.",
        Palette::paint(Palette::SUCCESS, "Enter your Google AI API key"),
        API_KEY_URL
    );
    let raw = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("API Key")
        .allow_empty_password(true)
        .interact()?;

    Ok(strip_controls_and_escapes(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn set_then_clear() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));

        run(&store, Some("  cli-key ".to_string()), false, false)
            .await
            .unwrap();
        let stored = store.load(ADDON_ID).unwrap().unwrap();
        assert_eq!(stored.api_key(), Some("cli-key"));

        run(&store, None, true, false).await.unwrap();
        assert!(store.load(ADDON_ID).unwrap().is_none());
    }

    #[tokio::test]
    async fn no_action_is_an_error() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));

        let err = run(&store, None, false, false).await.unwrap_err();
        assert!(err.to_string().starts_with("No action provided"));
    }
}
