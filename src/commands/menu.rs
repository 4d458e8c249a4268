use anyhow::Result;
use tracing::warn;

use crate::addon;
use crate::config::ConfigStore;
use crate::dialog;
use crate::host::{MenuAction, TerminalHost};

/// Runs the terminal host: registers the add-on, greets first-time users, then serves the menu.
pub async fn run(store: ConfigStore) -> Result<()> {
    let mut host = TerminalHost::new(store);
    addon::init(&mut host);
    if let Err(err) = addon::check_first_run(&mut host) {
        warn!(error = %err, "first-run check failed");
    }

    while let Some(action) = host.choose_menu_action()? {
        match action {
            MenuAction::OpenDialog => dialog::open(&mut host).await?,
        }
    }
    Ok(())
}
