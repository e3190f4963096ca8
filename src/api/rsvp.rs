use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};

use crate::models::RsvpStatus;
use crate::state::AppState;

pub const INVALID_STATUS_BODY: &str = "Invalid RSVP status.";
pub const UPDATED_BODY: &str = "RSVP status updated successfully!";
pub const FAILED_BODY: &str = "Error updating RSVP status.";

/// RSVP link routes. Links are followed from mail clients, so every method
/// is accepted.
pub fn rsvp_routes() -> Router<AppState> {
    Router::new()
        .route("/rsvp/{guest_id}/{status}", any(update_rsvp_status))
        .route("/rsvp/{guest_id}", any(missing_status))
        .route("/rsvp/{guest_id}/", any(missing_status))
}

/// The three plain-text answers an RSVP click can get
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpOutcome {
    Updated,
    InvalidStatus,
    Failed,
}

impl IntoResponse for RsvpOutcome {
    fn into_response(self) -> Response {
        match self {
            RsvpOutcome::Updated => (StatusCode::OK, UPDATED_BODY).into_response(),
            RsvpOutcome::InvalidStatus => {
                (StatusCode::BAD_REQUEST, INVALID_STATUS_BODY).into_response()
            }
            RsvpOutcome::Failed => {
                (StatusCode::INTERNAL_SERVER_ERROR, FAILED_BODY).into_response()
            }
        }
    }
}

/// ANY /rsvp/{guest_id}/{status}
async fn update_rsvp_status(
    State(state): State<AppState>,
    Path((guest_id, status)): Path<(String, String)>,
) -> RsvpOutcome {
    let status: RsvpStatus = match status.parse() {
        Ok(status) => status,
        Err(e) => {
            tracing::debug!(guest_id = %guest_id, error = %e, "Rejected RSVP");
            return RsvpOutcome::InvalidStatus;
        }
    };

    match state.guests.set_rsvp_status(&guest_id, status).await {
        Ok(()) => {
            tracing::info!(guest_id = %guest_id, status = %status, "RSVP status updated");
            RsvpOutcome::Updated
        }
        Err(e) => {
            tracing::error!(guest_id = %guest_id, error = %e, "Error updating RSVP status");
            RsvpOutcome::Failed
        }
    }
}

async fn missing_status() -> RsvpOutcome {
    RsvpOutcome::InvalidStatus
}
