//! Record-created trigger runtime.
//!
//! Reads guest creation events from the store's stream, hands each one to the
//! [`InvitationNotifier`] and acknowledges it once the notifier completes.
//! Events whose notification failed stay pending and are redelivered on the
//! next pending scan. Events that cannot be decoded are acknowledged and
//! dropped, there is nothing a retry could fix.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::Result;
use crate::models::GuestCreated;
use crate::notify::InvitationNotifier;

const ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// One stream entry announcing a created guest
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedEvent {
    pub entry_id: String,
    pub guest_id: String,
    /// JSON snapshot of the created record
    pub data: String,
}

#[async_trait]
pub trait CreatedEventSource: Send + Sync {
    async fn ensure_group(&self) -> Result<()>;

    /// Entries delivered to this consumer but never acknowledged, with ids
    /// strictly greater than `after` (`"0"` starts from the oldest)
    async fn read_pending(&self, after: &str, count: usize) -> Result<Vec<CreatedEvent>>;

    async fn read_new(&self, count: usize, block_ms: usize) -> Result<Vec<CreatedEvent>>;

    async fn ack(&self, entry_id: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Sent,
    Dropped,
    Retry,
}

pub struct TriggerRuntime {
    source: Arc<dyn CreatedEventSource>,
    notifier: InvitationNotifier,
    batch: usize,
    block_ms: usize,
    retry_interval: Duration,
}

impl TriggerRuntime {
    pub fn new(
        source: Arc<dyn CreatedEventSource>,
        notifier: InvitationNotifier,
        config: &Config,
    ) -> Self {
        Self {
            source,
            notifier,
            batch: config.trigger_batch.max(1),
            block_ms: config.trigger_block_ms,
            retry_interval: Duration::from_secs(config.trigger_retry_seconds),
        }
    }

    /// Run one event through the notifier and settle it on the stream
    pub async fn handle(&self, event: &CreatedEvent) -> Result<EventOutcome> {
        let guest = match GuestCreated::decode(&event.guest_id, &event.data) {
            Ok(guest) => guest,
            Err(e) => {
                tracing::error!(
                    entry_id = %event.entry_id,
                    error = %e,
                    "Dropping undecodable guest event"
                );
                self.source.ack(&event.entry_id).await?;
                return Ok(EventOutcome::Dropped);
            }
        };

        match self.notifier.notify(&guest).await {
            Ok(()) => {
                self.source.ack(&event.entry_id).await?;
                Ok(EventOutcome::Sent)
            }
            Err(e) => {
                tracing::warn!(
                    entry_id = %event.entry_id,
                    guest_id = %guest.guest_id,
                    error = %e,
                    "Invitation failed, left pending for redelivery"
                );
                Ok(EventOutcome::Retry)
            }
        }
    }

    async fn handle_all(&self, events: Vec<CreatedEvent>) -> Result<usize> {
        let mut sent = 0;
        for event in &events {
            if self.handle(event).await? == EventOutcome::Sent {
                sent += 1;
            }
        }
        Ok(sent)
    }

    /// Redeliver entries left pending by earlier failures, paging through the
    /// whole pending list on every scan.
    pub async fn retry_pending(&self) -> Result<usize> {
        let mut cursor = "0".to_string();
        let mut sent = 0;

        loop {
            let events = self.source.read_pending(&cursor, self.batch).await?;
            let Some(last) = events.last() else {
                break;
            };
            cursor = last.entry_id.clone();

            tracing::debug!(
                count = events.len(),
                after = %cursor,
                "Redelivering pending guest events"
            );
            sent += self.handle_all(events).await?;
        }

        Ok(sent)
    }

    /// Wait for new creation events and process one batch
    pub async fn poll_new(&self) -> Result<usize> {
        let events = self.source.read_new(self.batch, self.block_ms).await?;
        self.handle_all(events).await
    }

    /// Process events until `shutdown` flips to true or its sender is dropped
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Trigger runtime started");

        let mut group_ready = false;
        let mut next_retry = Instant::now();

        while !*shutdown.borrow() {
            let retry_due = Instant::now() >= next_retry;
            if retry_due {
                next_retry = Instant::now() + self.retry_interval;
            }

            let step = async {
                if !group_ready {
                    self.source.ensure_group().await?;
                    group_ready = true;
                }
                if retry_due {
                    self.retry_pending().await?;
                }
                self.poll_new().await
            };

            tokio::select! {
                _ = shutdown.changed() => break,
                result = step => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Trigger runtime step failed");
                        tokio::time::sleep(ERROR_BACKOFF).await;
                    }
                }
            }
        }

        tracing::info!("Trigger runtime stopped");
    }
}
