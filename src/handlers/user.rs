use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::{auth, ids, lifecycle};
use crate::state::AppState;

// POST /api/user/register
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<Value>, AppError> {
    for (field, value) in [
        ("name", &body.name),
        ("email", &body.email),
        ("phone", &body.phone),
        ("password", &body.password),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let db = state.db.lock().unwrap();

    if queries::user_email_exists(&db, &body.email)? {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let hash = auth::hash_password(&body.password).map_err(|_| AppError::Hash)?;
    let id = ids::prefixed_id("USR");
    queries::insert_user(&db, &id, &body.name, &body.email, &body.phone, &hash)?;

    tracing::info!(user_id = %id, "registered customer account");

    Ok(Json(json!({
        "success": true,
        "user": { "id": id, "name": body.name, "email": body.email, "phone": body.phone },
    })))
}

// POST /api/user/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let user = {
        let db = state.db.lock().unwrap();
        queries::get_user_by_email(&db, &body.email)?
    }
    .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(json!({
        "success": true,
        "user": { "id": user.id, "name": user.name, "email": user.email, "phone": user.phone },
    })))
}

// POST /api/user/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let db = state.db.lock().unwrap();

    let booking = lifecycle::create_booking(
        &db,
        lifecycle::NewBooking {
            customer_id: body.customer_id,
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            customer_address: body.customer_address,
            service: body.service,
            date: body.date,
            time: body.time,
        },
    )?;

    tracing::info!(booking_id = %booking.id, "created booking");

    Ok(Json(json!({
        "success": true,
        "bookingId": booking.id,
        "otp": booking.otp,
    })))
}

// GET /api/user/bookings/:customerId
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::bookings_for_customer(&db, &customer_id)?
    };

    Ok(Json(json!({ "success": true, "bookings": bookings })))
}

// GET /api/user/booking/:bookingId
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        queries::get_booking(&db, &booking_id)?
    }
    .ok_or(AppError::NotFound("Booking"))?;

    Ok(Json(json!({ "success": true, "booking": booking })))
}

// POST /api/user/bookings/:bookingId/rate
#[derive(Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

pub async fn rate_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<RateRequest>,
) -> Result<Json<Value>, AppError> {
    let db = state.db.lock().unwrap();
    lifecycle::rate_booking(&db, &booking_id, body.rating)?;
    Ok(Json(json!({ "success": true })))
}
