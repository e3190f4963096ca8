use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Guest, RsvpStatus};

/// Keyed guest document store
#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Persist a new guest and publish its creation event.
    async fn create_guest(&self, guest: &Guest) -> Result<()>;

    async fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>>;

    /// Overwrite `rsvpStatus` on an existing guest.
    ///
    /// Fails with `AppError::NotFound` when no guest has this id; the record
    /// is never created implicitly.
    async fn set_rsvp_status(&self, guest_id: &str, status: RsvpStatus) -> Result<()>;

    async fn health_check(&self) -> Result<bool>;
}
