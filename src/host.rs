use std::collections::VecDeque;

use anyhow::Result;
use dialoguer::{Select, theme::ColorfulTheme};

use crate::config::{ADDON_ID, AddonConfig, ConfigStore};
use crate::palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenDialog,
}

/// What the add-on needs from the application hosting it.
pub trait HostServices {
    fn show_notice(&mut self, message: &str);
    fn get_config(&self) -> Result<AddonConfig>;
    fn write_config(&mut self, config: &AddonConfig) -> Result<()>;
    fn register_menu_action(&mut self, label: &str, action: MenuAction);
}

/// Host backed by the terminal: notices go to stdout, the menu is a select list.
pub struct TerminalHost {
    store: ConfigStore,
    menu: Vec<(String, MenuAction)>,
    pending: Option<VecDeque<String>>,
}

impl TerminalHost {
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            menu: Vec::new(),
            pending: None,
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// While capturing, notices are queued for a full-screen view instead of printed.
    pub fn capture_notices(&mut self, capture: bool) {
        self.pending = capture.then(VecDeque::new);
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.pending.as_mut()?.pop_front()
    }

    pub fn menu_labels(&self) -> impl Iterator<Item = &str> {
        self.menu.iter().map(|(label, _)| label.as_str())
    }

    /// `None` when the user picks quit or cancels.
    pub fn choose_menu_action(&self) -> Result<Option<MenuAction>> {
        let mut labels: Vec<String> = self.menu_labels().map(str::to_string).collect();
        labels.push("Quit".to_string());

        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Tools")
            .items(&labels[..])
            .default(0)
            .interact_opt()?;

        Ok(choice.and_then(|idx| self.menu.get(idx).map(|(_, action)| *action)))
    }
}

impl HostServices for TerminalHost {
    fn show_notice(&mut self, message: &str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.push_back(message.to_string());
            return;
        }
        println!("\n{} {}", Palette::paint(Palette::INFO, "gemini-tts"), message);
    }

    fn get_config(&self) -> Result<AddonConfig> {
        Ok(self.store.load(ADDON_ID)?.unwrap_or_default())
    }

    fn write_config(&mut self, config: &AddonConfig) -> Result<()> {
        self.store.save(ADDON_ID, config)
    }

    fn register_menu_action(&mut self, label: &str, action: MenuAction) {
        self.menu.retain(|(existing, _)| existing != label);
        self.menu.push((label.to_string(), action));
    }
}
