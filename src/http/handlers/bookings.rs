//! `/bookings` and `/users` handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::bookings::{Booking, UserStanding};
use crate::http::error::ApiError;
use crate::http::extract::{ApiJson, RecordId};
use crate::http::server::AppState;
use crate::rules::BookingRequest;

const NOT_FOUND: &str = "Booking not found";

#[derive(Serialize)]
pub struct BookingResponse {
    pub msg: &'static str,
    pub booking: Booking,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub msg: &'static str,
    pub booking: Booking,
    pub penalized: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let booking = state.bookings.book(request)?;
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            msg: "Booking created successfully",
            booking,
        }),
    ))
}

pub async fn list_bookings(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<Booking>> {
    Json(state.bookings.list(query.user_id.as_deref()))
}

pub async fn get_booking(State(state): State<AppState>, id: RecordId) -> Result<Json<Booking>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    Ok(Json(state.bookings.get(id)?))
}

pub async fn cancel_booking(State(state): State<AppState>, id: RecordId) -> Result<Json<CancelResponse>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    let cancellation = state.bookings.cancel(id)?;
    Ok(Json(CancelResponse {
        msg: if cancellation.penalized {
            "Booking cancelled late and counted as a missed booking"
        } else {
            "Booking cancelled successfully"
        },
        booking: cancellation.booking,
        penalized: cancellation.penalized,
    }))
}

pub async fn mark_no_show(State(state): State<AppState>, id: RecordId) -> Result<Json<BookingResponse>, ApiError> {
    let id = id.or_not_found(NOT_FOUND)?;
    let booking = state.bookings.mark_missed(id)?;
    Ok(Json(BookingResponse {
        msg: "Booking marked as missed",
        booking,
    }))
}

pub async fn get_standing(State(state): State<AppState>, Path(user_id): Path<String>) -> Json<UserStanding> {
    Json(state.bookings.standing(&user_id))
}
