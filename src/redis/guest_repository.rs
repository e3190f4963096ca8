use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::{AsyncCommands, Script};

use super::{guest_key, GUEST_CREATED_STREAM};
use crate::error::{AppError, Result};
use crate::models::{Guest, RsvpStatus};
use crate::store::GuestStore;

const FIELD_EMAIL: &str = "email";
const FIELD_EVENT_ID: &str = "eventId";
const FIELD_RSVP_STATUS: &str = "rsvpStatus";

// Returns 1 when the field was written, 0 when the guest does not exist.
const SET_STATUS_IF_EXISTS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
    return 1
end
return 0
"#;

/// Guest repository for Redis operations
#[derive(Clone)]
pub struct GuestRepository {
    pool: Pool,
    set_status: Script,
}

impl GuestRepository {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            set_status: Script::new(SET_STATUS_IF_EXISTS),
        }
    }
}

/// The id lives in the key, the hash only holds the document fields
fn guest_from_hash(guest_id: &str, mut fields: HashMap<String, String>) -> Option<Guest> {
    if fields.is_empty() {
        return None;
    }

    Some(Guest {
        id: guest_id.to_string(),
        email: fields.remove(FIELD_EMAIL).unwrap_or_default(),
        event_id: fields.remove(FIELD_EVENT_ID).unwrap_or_default(),
        rsvp_status: fields
            .get(FIELD_RSVP_STATUS)
            .and_then(|s| RsvpStatus::from_stored(s)),
    })
}

#[async_trait]
impl GuestStore for GuestRepository {
    /// Write the guest hash and append the creation event in one MULTI block
    async fn create_guest(&self, guest: &Guest) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let key = guest_key(&guest.id);

        let data = serde_json::to_string(&serde_json::json!({
            "email": guest.email,
            "eventId": guest.event_id,
        }))?;

        redis::pipe()
            .atomic()
            .hset_multiple(
                &key,
                &[
                    (FIELD_EMAIL, guest.email.as_str()),
                    (FIELD_EVENT_ID, guest.event_id.as_str()),
                ],
            )
            .ignore()
            .xadd(
                GUEST_CREATED_STREAM,
                "*",
                &[("guest_id", guest.id.as_str()), ("data", data.as_str())],
            )
            .ignore()
            .query_async::<()>(&mut *conn)
            .await?;

        tracing::info!(guest_id = %guest.id, event_id = %guest.event_id, "Guest created");
        Ok(())
    }

    async fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>> {
        let mut conn = self.pool.get().await?;

        let fields: HashMap<String, String> = conn.hgetall(guest_key(guest_id)).await?;
        Ok(guest_from_hash(guest_id, fields))
    }

    async fn set_rsvp_status(&self, guest_id: &str, status: RsvpStatus) -> Result<()> {
        let mut conn = self.pool.get().await?;

        let written: i64 = self
            .set_status
            .key(guest_key(guest_id))
            .arg(FIELD_RSVP_STATUS)
            .arg(status.as_stored())
            .invoke_async(&mut *conn)
            .await?;

        if written == 0 {
            return Err(AppError::NotFound(format!("Guest {} not found", guest_id)));
        }

        tracing::debug!(guest_id = %guest_id, status = %status, "RSVP status stored");
        Ok(())
    }

    /// Check Redis connection health
    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.pool.get().await?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| AppError::RedisError(e.to_string()))?;

        Ok(pong == "PONG")
    }
}
