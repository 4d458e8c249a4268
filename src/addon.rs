use anyhow::Result;
use tracing::info;

use crate::host::{HostServices, MenuAction};

pub const MENU_LABEL: &str = "Gemini TTS";
pub const API_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// Adds the dialog entry to the host's tools menu.
pub fn init(host: &mut impl HostServices) {
    host.register_menu_action(MENU_LABEL, MenuAction::OpenDialog);
    info!("add-on initialized");
}

/// Shows the welcome notice when no key is configured. Returns whether it was shown.
pub fn check_first_run(host: &mut impl HostServices) -> Result<bool> {
    let config = host.get_config()?;
    if config.api_key().is_some() {
        return Ok(false);
    }

    host.show_notice(&welcome_message());
    Ok(true)
}

fn welcome_message() -> String {
    format!(
        "Welcome to {MENU_LABEL}!\n\n\
         This is your first time running the add-on.\n\
         You'll need a Google AI API key to use this add-on.\n\n\
         Get your free API key at:\n\
         {API_KEY_URL}\n\n\
         Click 'Tools > {MENU_LABEL}' to configure your API key."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;

    #[test]
    fn init_registers_the_dialog_action() {
        let mut host = MemoryHost::default();
        init(&mut host);
        assert_eq!(
            host.menu,
            vec![("Gemini TTS".to_string(), MenuAction::OpenDialog)]
        );
    }

    #[test]
    fn first_run_shows_welcome_without_key() {
        let mut host = MemoryHost::default();
        assert!(check_first_run(&mut host).unwrap());
        let notice = host.last_notice().unwrap();
        assert!(notice.starts_with("Welcome to Gemini TTS!"));
        assert!(notice.contains(API_KEY_URL));
    }

    #[test]
    fn first_run_is_quiet_with_key() {
        let mut host = MemoryHost::with_key("k");
        assert!(!check_first_run(&mut host).unwrap());
        assert!(host.notices.is_empty());
    }
}
