pub mod api;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod notify;
pub mod redis;
pub mod state;
pub mod store;
pub mod trigger;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
