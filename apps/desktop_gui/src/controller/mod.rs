//! Controller layer: backend->UI events, failure presentation, upload
//! progress simulation, and toast notifications.

pub mod events;
pub mod progress;
pub mod toasts;
