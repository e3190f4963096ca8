use std::sync::Arc;

use crate::config::Config;
use crate::store::GuestStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub guests: Arc<dyn GuestStore>,
}

impl AppState {
    pub fn new(config: Config, guests: Arc<dyn GuestStore>) -> Self {
        Self {
            config: Arc::new(config),
            guests,
        }
    }
}
