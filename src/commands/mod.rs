pub mod generate;
pub mod key;
pub mod menu;
pub mod speak;

use anyhow::{Result, anyhow};

use crate::config::{API_KEY_ENV, ApiKeySource, ConfigStore};

fn require_api_key(store: &ConfigStore) -> Result<(String, ApiKeySource)> {
    let lookup = store.lookup_api_key()?;
    match (lookup.api_key, lookup.source) {
        (Some(key), Some(source)) => Ok((key, source)),
        _ => Err(anyhow!(
            "No Google AI API key configured. Set {} or run `gemini-tts key --set`.",
            API_KEY_ENV
        )),
    }
}
