use anyhow::{Result, bail};

use crate::config::ConfigStore;
use crate::gemini::GeminiClient;
use crate::utils::trim_line;

use super::require_api_key;

pub async fn run(store: &ConfigStore, prompt: &str, model: &str) -> Result<()> {
    let Some(prompt) = trim_line(prompt) else {
        bail!("Please enter a prompt");
    };
    let (key, _) = require_api_key(store)?;

    let client = GeminiClient::from_api_key(&key);
    let text = client.generate_text(prompt, model).await?;
    println!("{text}");
    Ok(())
}
