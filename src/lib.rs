pub mod addon;
pub mod commands;
pub mod config;
pub mod dialog;
pub mod gemini;
pub mod host;
pub mod palette;
pub mod playback;
pub mod tui;
pub mod utils;
