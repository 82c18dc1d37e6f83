use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::{auth, lifecycle};
use crate::state::AppState;

// POST /api/worker/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let worker = {
        let db = state.db.lock().unwrap();
        queries::get_worker_by_email(&db, &body.email)?
    }
    .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&body.password, &worker.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(json!({
        "success": true,
        "worker": {
            "id": worker.id,
            "name": worker.name,
            "email": worker.email,
            "phone": worker.phone,
            "specialty": worker.specialty,
        },
    })))
}

// GET /api/worker/bookings/:workerId
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::active_bookings_for_worker(&db, &worker_id)?
    };

    Ok(Json(json!({ "success": true, "bookings": bookings })))
}

// POST /api/worker/bookings/:bookingId/verify-otp
#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub otp: String,
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        lifecycle::verify_otp_and_start(&db, &booking_id, &body.otp)?
    };

    tracing::info!(booking_id = %booking.id, "work started after OTP check");

    Ok(Json(json!({ "success": true, "booking": booking })))
}

// POST /api/worker/bookings/:bookingId/complete
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub service_charge: f64,
    #[serde(default)]
    pub used_components: bool,
    pub component_details: Option<String>,
    pub warranty_months: Option<i64>,
    pub completion_image: Option<String>,
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        lifecycle::complete_booking(
            &db,
            &booking_id,
            lifecycle::CompletionDetails {
                service_charge: body.service_charge,
                used_components: body.used_components,
                component_details: body.component_details,
                warranty_months: body.warranty_months,
                completion_image: body.completion_image,
            },
        )?
    };

    tracing::info!(booking_id = %booking.id, amount = booking.amount, "completed booking");

    Ok(Json(json!({
        "success": true,
        "message": "Booking completed successfully",
        "booking": booking,
    })))
}

// GET /api/worker/stats/:workerId
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let stats = {
        let db = state.db.lock().unwrap();
        queries::worker_stats(&db, &worker_id)?
    };

    Ok(Json(json!({
        "success": true,
        "stats": {
            "assigned": stats.assigned,
            "inProgress": stats.in_progress,
            "completed": stats.completed,
        },
    })))
}
