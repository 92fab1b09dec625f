//! HTTP handlers for the Bookings API
//!
//! - POST /bookings      — create a booking
//! - GET  /bookings      — list bookings
//! - GET  /bookings/:id  — booking detail

use crate::bookings::store::BookingStore;
use crate::bookings::types::*;
use crate::catalog::Catalog;
use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for booking handlers
#[derive(Clone)]
pub struct BookingsState {
    pub store: Arc<BookingStore>,
    pub catalog: Arc<Catalog>,
}

/// Create the bookings router
pub fn bookings_router(state: BookingsState) -> Router {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .with_state(state)
}

/// POST /bookings
async fn create_booking(
    State(state): State<BookingsState>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!(ApiError::bad_request(rejection.body_text()))),
            )
        }
    };

    let new = match request.validate(&state.catalog) {
        Ok(new) => new,
        Err(e) => {
            tracing::debug!("Booking rejected: {}", e);
            return (StatusCode::BAD_REQUEST, Json(json!(ApiError::from(&e))));
        }
    };

    let booking = state.store.create(new).await;
    let message = format!("Prenotazione {} creata con successo!", booking.id);
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "booking": booking,
            "message": message,
        })),
    )
}

/// GET /bookings
async fn list_bookings(State(state): State<BookingsState>) -> impl IntoResponse {
    let bookings = state.store.list().await;
    Json(json!({
        "bookings": bookings,
        "count": bookings.len(),
    }))
}

/// GET /bookings/:id
async fn get_booking(
    State(state): State<BookingsState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&id).await {
        Some(booking) => (StatusCode::OK, Json(json!(booking))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!(ApiError::not_found(format!("Booking '{}' not found", id)))),
        ),
    }
}
