pub mod event_stream;
pub mod guest_repository;

pub use event_stream::GuestEventStream;
pub use guest_repository::GuestRepository;

use deadpool_redis::{Config as RedisConfig, Pool, Runtime};

use crate::config::Config;
use crate::error::{AppError, Result};

/// Stream receiving one entry per created guest
pub const GUEST_CREATED_STREAM: &str = "guests:created";

/// Consumer group used by the invitation notifier
pub const NOTIFIER_GROUP: &str = "invitation-notifier";

pub(crate) fn guest_key(guest_id: &str) -> String {
    format!("guest:{}", guest_id)
}

/// Create a Redis connection pool
pub fn create_pool(config: &Config) -> Result<Pool> {
    let redis_config = RedisConfig::from_url(&config.redis_url);
    let pool = redis_config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| AppError::RedisError(format!("Failed to create Redis pool: {}", e)))?;

    Ok(pool)
}
