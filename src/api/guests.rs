use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::{CreateGuestRequest, Guest};
use crate::state::AppState;

/// Guest routes
pub fn guest_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_guest))
        .route("/{guest_id}", get(get_guest))
}

/// POST /api/v1/guests - Create a guest and queue its invitation
async fn create_guest(
    State(state): State<AppState>,
    Json(request): Json<CreateGuestRequest>,
) -> Result<(StatusCode, Json<Guest>)> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if request.event_id.trim().is_empty() {
        return Err(AppError::BadRequest("eventId is required".to_string()));
    }

    let guest = Guest::new(email.to_string(), request.event_id);
    state.guests.create_guest(&guest).await?;

    Ok((StatusCode::CREATED, Json(guest)))
}

/// GET /api/v1/guests/:guest_id
async fn get_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<String>,
) -> Result<Json<Guest>> {
    let guest = state
        .guests
        .get_guest(&guest_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Guest {} not found", guest_id)))?;

    Ok(Json(guest))
}
