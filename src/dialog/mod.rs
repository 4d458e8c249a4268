pub mod controller;
pub mod view;

use anyhow::Result;

use crate::host::TerminalHost;

pub use controller::{DialogAction, DialogController, Status, validate_tts_text};

/// Opens the full-screen dialog and returns when the user closes it.
pub async fn open(host: &mut TerminalHost) -> Result<()> {
    open_with(host, DialogController::new()).await
}

pub async fn open_with(host: &mut TerminalHost, controller: DialogController) -> Result<()> {
    view::run(host, controller).await
}
