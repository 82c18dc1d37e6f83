use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};

/// Bind a worker to a booking, copying the worker's name and phone onto the
/// booking row. Re-assigning an already-assigned booking overwrites the
/// previous binding; no assignment history is kept. Last write wins on
/// concurrent calls.
pub fn assign_worker(
    conn: &Connection,
    booking_id: &str,
    worker_id: &str,
) -> Result<Booking, AppError> {
    let worker = queries::get_worker(conn, worker_id)?.ok_or(AppError::NotFound("Worker"))?;
    // Deactivated workers are invisible to assignment
    if !worker.is_active() {
        return Err(AppError::NotFound("Worker"));
    }

    let booking =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;

    if !booking.status.can_transition_to(BookingStatus::Assigned) {
        return Err(AppError::Conflict(format!(
            "Cannot assign a worker to a {} booking",
            booking.status.as_str()
        )));
    }

    queries::bind_worker(conn, booking_id, &worker)?;

    let updated =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;
    Ok(updated)
}
