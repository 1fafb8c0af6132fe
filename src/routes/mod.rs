pub mod api;
mod entry;
pub mod health;

pub use entry::{API_PREFIX, app, router};
