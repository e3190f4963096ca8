pub mod template;

use std::sync::Arc;

use crate::error::Result;
use crate::mail::{MailRelay, OutgoingMail};
use crate::models::GuestCreated;

/// Sends the invitation email for a newly created guest
#[derive(Clone)]
pub struct InvitationNotifier {
    relay: Arc<dyn MailRelay>,
    from: String,
    rsvp_base_url: String,
}

impl InvitationNotifier {
    pub fn new(relay: Arc<dyn MailRelay>, from: String, rsvp_base_url: String) -> Self {
        Self {
            relay,
            from,
            rsvp_base_url,
        }
    }

    pub fn compose(&self, guest: &GuestCreated) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: guest.email.clone(),
            subject: template::subject(&guest.event_id),
            html: template::invitation_html(
                &self.rsvp_base_url,
                &guest.guest_id,
                &guest.event_id,
            ),
        }
    }

    /// Compose and send the invitation. Relay errors are returned untouched
    /// so the trigger runtime can schedule a redelivery.
    pub async fn notify(&self, guest: &GuestCreated) -> Result<()> {
        let mail = self.compose(guest);
        self.relay.send(&mail).await?;

        tracing::info!(guest_id = %guest.guest_id, event_id = %guest.event_id, "Invitation sent");
        Ok(())
    }
}
