//! egui user interface for the DocChat desktop app.

pub mod app;
pub mod markup;
pub mod theme;

pub use app::{DocChatApp, StartupConfig};
