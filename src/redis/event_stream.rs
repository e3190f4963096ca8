use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::streams::{StreamId, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;

use super::{GUEST_CREATED_STREAM, NOTIFIER_GROUP};
use crate::error::Result;
use crate::trigger::{CreatedEvent, CreatedEventSource};

/// Consumer-group reader over the guest creation stream
#[derive(Clone)]
pub struct GuestEventStream {
    pool: Pool,
    consumer: String,
}

impl GuestEventStream {
    pub fn new(pool: Pool, consumer: impl Into<String>) -> Self {
        Self {
            pool,
            consumer: consumer.into(),
        }
    }

    async fn read(
        &self,
        start_id: &str,
        count: usize,
        block_ms: Option<usize>,
    ) -> Result<Vec<CreatedEvent>> {
        let mut conn = self.pool.get().await?;

        let mut options = StreamReadOptions::default()
            .group(NOTIFIER_GROUP, &self.consumer)
            .count(count);
        if let Some(ms) = block_ms {
            options = options.block(ms);
        }

        let reply: Option<StreamReadReply> = conn
            .xread_options(&[GUEST_CREATED_STREAM], &[start_id], &options)
            .await?;

        Ok(reply
            .map(|reply| {
                reply
                    .keys
                    .into_iter()
                    .flat_map(|key| key.ids)
                    .map(created_event)
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn created_event(entry: StreamId) -> CreatedEvent {
    CreatedEvent {
        guest_id: entry.get("guest_id").unwrap_or_default(),
        data: entry.get("data").unwrap_or_default(),
        entry_id: entry.id,
    }
}

#[async_trait]
impl CreatedEventSource for GuestEventStream {
    async fn ensure_group(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;

        let created: redis::RedisResult<()> = conn
            .xgroup_create_mkstream(GUEST_CREATED_STREAM, NOTIFIER_GROUP, "0")
            .await;

        match created {
            Ok(()) => {
                tracing::info!(group = NOTIFIER_GROUP, "Consumer group created");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_pending(&self, after: &str, count: usize) -> Result<Vec<CreatedEvent>> {
        self.read(after, count, None).await
    }

    async fn read_new(&self, count: usize, block_ms: usize) -> Result<Vec<CreatedEvent>> {
        self.read(">", count, Some(block_ms)).await
    }

    /// Acknowledge and delete the entry; the stream only keeps unsettled events
    async fn ack(&self, entry_id: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;

        redis::pipe()
            .atomic()
            .xack(GUEST_CREATED_STREAM, NOTIFIER_GROUP, &[entry_id])
            .ignore()
            .xdel(GUEST_CREATED_STREAM, &[entry_id])
            .ignore()
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }
}
