use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{BookingStatus, WorkerStatus};
use crate::services::{assignment, auth, ids, lifecycle, reports};
use crate::state::AppState;

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let admin = {
        let db = state.db.lock().unwrap();
        queries::get_admin_by_email(&db, &body.email)?
    }
    .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&body.password, &admin.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Json(json!({
        "success": true,
        "admin": { "id": admin.id, "name": admin.name, "email": admin.email },
    })))
}

// GET /api/admin/bookings?status=
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Value>, AppError> {
    // "all" (the admin UI's default tab) means no filter
    let filter = match query.status.as_deref() {
        None | Some("all") | Some("") => None,
        Some(s) => Some(
            BookingStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("Unknown status: {s}")))?,
        ),
    };

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::all_bookings(&db, filter)?
    };

    Ok(Json(json!({ "success": true, "bookings": bookings })))
}

// GET /api/admin/workers
pub async fn list_workers(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let workers = {
        let db = state.db.lock().unwrap();
        queries::list_workers(&db)?
    };

    Ok(Json(json!({ "success": true, "workers": workers })))
}

// POST /api/admin/workers
#[derive(Deserialize)]
pub struct CreateWorkerRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub specialty: Option<String>,
}

pub async fn create_worker(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateWorkerRequest>,
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

    if queries::worker_email_exists(&db, &body.email)? {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let hash = auth::hash_password(&body.password).map_err(|_| AppError::Hash)?;
    let id = ids::prefixed_id("WRK");
    let specialty = body
        .specialty
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "Laptop & PC Repair".to_string());

    queries::insert_worker(&db, &id, &body.name, &body.email, &body.phone, &hash, &specialty)?;

    tracing::info!(worker_id = %id, "created worker account");

    Ok(Json(json!({
        "success": true,
        "message": "Worker created successfully",
        "workerId": id,
    })))
}

// PATCH /api/admin/workers/:workerId/status
#[derive(Deserialize)]
pub struct WorkerStatusRequest {
    pub status: String,
}

pub async fn update_worker_status(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
    Json(body): Json<WorkerStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let status = WorkerStatus::parse(&body.status)
        .ok_or_else(|| AppError::Validation(format!("Unknown status: {}", body.status)))?;

    let updated = {
        let db = state.db.lock().unwrap();
        queries::set_worker_status(&db, &worker_id, status)?
    };
    if !updated {
        return Err(AppError::NotFound("Worker"));
    }

    Ok(Json(json!({ "success": true })))
}

// POST /api/admin/bookings/:bookingId/assign
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub worker_id: String,
}

pub async fn assign_worker(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<AssignRequest>,
) -> Result<Json<Value>, AppError> {
    let booking = {
        let db = state.db.lock().unwrap();
        assignment::assign_worker(&db, &booking_id, &body.worker_id)?
    };

    tracing::info!(
        booking_id = %booking.id,
        worker_id = %body.worker_id,
        "assigned worker to booking"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Worker assigned successfully",
        "booking": booking,
    })))
}

// PATCH /api/admin/bookings/:bookingId/status
#[derive(Deserialize)]
pub struct ForceStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(body): Json<ForceStatusRequest>,
) -> Result<Json<Value>, AppError> {
    {
        let db = state.db.lock().unwrap();
        lifecycle::force_status(&db, &booking_id, &body.status)?;
    }

    tracing::info!(booking_id = %booking_id, status = %body.status, "forced booking status");

    Ok(Json(json!({ "success": true })))
}

// GET /api/admin/reports
pub async fn get_reports(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let report = {
        let db = state.db.lock().unwrap();
        reports::build_report(&db)?
    };

    Ok(Json(json!({ "success": true, "report": report })))
}
