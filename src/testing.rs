//! In-memory doubles for the store, the mail relay and the creation stream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{Config, LogFormat, MailTransport};
use crate::error::{AppError, Result};
use crate::mail::{MailRelay, OutgoingMail};
use crate::models::{Guest, RsvpStatus};
use crate::state::AppState;
use crate::store::GuestStore;
use crate::trigger::{CreatedEvent, CreatedEventSource};

pub fn test_config() -> Config {
    Config {
        server_host: "localhost".to_string(),
        server_port: 4000,
        redis_url: "redis://localhost".to_string(),
        rsvp_base_url: "http://localhost:4000/rsvp".to_string(),
        mail_from: "party@example.com".to_string(),
        mail_transport: MailTransport::Resend {
            api_key: "re_test".to_string(),
        },
        trigger_consumer: "notifier-test".to_string(),
        trigger_block_ms: 10,
        trigger_batch: 16,
        trigger_retry_seconds: 30,
        request_timeout_seconds: 5,
        log_format: LogFormat::Text,
    }
}

/// Pool for tests that need a live Redis; `None` (test skipped) unless
/// `REDIS_URL` is set
pub fn redis_test_pool() -> Option<deadpool_redis::Pool> {
    let url = std::env::var("REDIS_URL").ok()?;
    deadpool_redis::Config::from_url(url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .ok()
}

pub fn test_state(store: Arc<MemoryGuestStore>) -> AppState {
    AppState::new(test_config(), store)
}

#[derive(Default)]
pub struct MemoryGuestStore {
    guests: Mutex<HashMap<String, Guest>>,
    fail: AtomicBool,
    status_writes: Mutex<usize>,
}

impl MemoryGuestStore {
    pub fn with_guest(guest: Guest) -> Self {
        let store = Self::default();
        store
            .guests
            .lock()
            .unwrap()
            .insert(guest.id.clone(), guest);
        store
    }

    /// Make every subsequent call fail with a Redis error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn status_of(&self, guest_id: &str) -> Option<RsvpStatus> {
        self.guests
            .lock()
            .unwrap()
            .get(guest_id)
            .and_then(|g| g.rsvp_status)
    }

    pub fn status_writes(&self) -> usize {
        *self.status_writes.lock().unwrap()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::RedisError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GuestStore for MemoryGuestStore {
    async fn create_guest(&self, guest: &Guest) -> Result<()> {
        self.check()?;
        self.guests
            .lock()
            .unwrap()
            .insert(guest.id.clone(), guest.clone());
        Ok(())
    }

    async fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>> {
        self.check()?;
        Ok(self.guests.lock().unwrap().get(guest_id).cloned())
    }

    async fn set_rsvp_status(&self, guest_id: &str, status: RsvpStatus) -> Result<()> {
        *self.status_writes.lock().unwrap() += 1;
        self.check()?;
        let mut guests = self.guests.lock().unwrap();
        let guest = guests
            .get_mut(guest_id)
            .ok_or_else(|| AppError::NotFound(format!("Guest {} not found", guest_id)))?;
        guest.rsvp_status = Some(status);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!self.fail.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct RecordingRelay {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
    rejected: Mutex<Vec<String>>,
}

impl RecordingRelay {
    pub fn failing() -> Self {
        let relay = Self::default();
        relay.set_failing(true);
        relay
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Fail every send to this recipient, like a malformed address would
    pub fn reject(&self, to: &str) {
        self.rejected.lock().unwrap().push(to.to_string());
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailRelay for RecordingRelay {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Delivery("535 authentication failed".to_string()));
        }
        if self.rejected.lock().unwrap().contains(&mail.to) {
            return Err(AppError::Delivery(format!("Invalid recipient address: {}", mail.to)));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// `<ms>-<seq>` stream ids ordered the way Redis orders them
fn entry_order(entry_id: &str) -> (u64, u64) {
    let (ms, seq) = entry_id.split_once('-').unwrap_or((entry_id, "0"));
    (ms.parse().unwrap_or(0), seq.parse().unwrap_or(0))
}

/// Stream double: entries move from `new` to `pending` when read, and leave
/// `pending` when acknowledged.
#[derive(Default)]
pub struct MemoryEventSource {
    new: Mutex<Vec<CreatedEvent>>,
    pending: Mutex<Vec<CreatedEvent>>,
    acked: Mutex<Vec<String>>,
}

impl MemoryEventSource {
    pub fn push(&self, entry_id: &str, guest_id: &str, data: &str) {
        self.new.lock().unwrap().push(CreatedEvent {
            entry_id: entry_id.to_string(),
            guest_id: guest_id.to_string(),
            data: data.to_string(),
        });
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().unwrap().clone()
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.entry_id.clone())
            .collect()
    }
}

#[async_trait]
impl CreatedEventSource for MemoryEventSource {
    async fn ensure_group(&self) -> Result<()> {
        Ok(())
    }

    async fn read_pending(&self, after: &str, count: usize) -> Result<Vec<CreatedEvent>> {
        let after = entry_order(after);
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .filter(|e| entry_order(&e.entry_id) > after)
            .take(count)
            .cloned()
            .collect())
    }

    async fn read_new(&self, count: usize, block_ms: usize) -> Result<Vec<CreatedEvent>> {
        let batch: Vec<CreatedEvent> = {
            let mut new = self.new.lock().unwrap();
            let take = count.min(new.len());
            new.drain(..take).collect()
        };

        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(block_ms as u64)).await;
            return Ok(batch);
        }

        self.pending.lock().unwrap().extend(batch.iter().cloned());
        Ok(batch)
    }

    async fn ack(&self, entry_id: &str) -> Result<()> {
        self.pending
            .lock()
            .unwrap()
            .retain(|e| e.entry_id != entry_id);
        self.acked.lock().unwrap().push(entry_id.to_string());
        Ok(())
    }
}
