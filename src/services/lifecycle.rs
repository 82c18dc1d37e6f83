use chrono::{Months, NaiveDate, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus};
use crate::services::{ids, otp};

pub struct NewBooking {
    pub customer_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub service: String,
    pub date: String,
    pub time: String,
}

pub struct CompletionDetails {
    pub service_charge: f64,
    pub used_components: bool,
    pub component_details: Option<String>,
    pub warranty_months: Option<i64>,
    pub completion_image: Option<String>,
}

/// Create a booking in the pending state with a fresh id and OTP.
pub fn create_booking(conn: &Connection, req: NewBooking) -> Result<Booking, AppError> {
    let required = [
        ("customerId", &req.customer_id),
        ("customerName", &req.customer_name),
        ("customerPhone", &req.customer_phone),
        ("customerAddress", &req.customer_address),
        ("service", &req.service),
        ("date", &req.date),
        ("time", &req.time),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: ids::prefixed_id("BK"),
        customer_id: req.customer_id,
        customer_name: req.customer_name,
        customer_phone: req.customer_phone,
        customer_address: req.customer_address,
        service: req.service,
        date: req.date,
        time: req.time,
        status: BookingStatus::Pending,
        otp: otp::generate_otp(),
        worker_id: None,
        worker_name: None,
        worker_phone: None,
        amount: None,
        used_components: false,
        component_details: None,
        warranty_months: None,
        warranty_expiry: None,
        completion_image: None,
        rating: None,
        created_at: now,
        updated_at: now,
    };

    queries::insert_booking(conn, &booking)?;
    Ok(booking)
}

/// OTP gate: on an exact match the booking moves from assigned to
/// in-progress. Re-verifying a booking that is already in-progress is a
/// harmless no-op so a worker can re-enter the code after a dropped request.
pub fn verify_otp_and_start(
    conn: &Connection,
    booking_id: &str,
    supplied_otp: &str,
) -> Result<Booking, AppError> {
    let booking =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;

    if booking.otp != supplied_otp {
        return Err(AppError::InvalidOtp);
    }

    match booking.status {
        BookingStatus::InProgress => Ok(booking),
        BookingStatus::Assigned => {
            queries::update_booking_status(conn, booking_id, BookingStatus::InProgress)?;
            let updated = queries::get_booking(conn, booking_id)?
                .ok_or(AppError::NotFound("Booking"))?;
            Ok(updated)
        }
        other => Err(AppError::Conflict(format!(
            "Cannot start work on a {} booking",
            other.as_str()
        ))),
    }
}

/// Close out a job: record the charge and component/warranty details and mark
/// the booking completed. Only assigned or in-progress bookings qualify.
pub fn complete_booking(
    conn: &Connection,
    booking_id: &str,
    details: CompletionDetails,
) -> Result<Booking, AppError> {
    let booking =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;

    if !booking.status.can_transition_to(BookingStatus::Completed) {
        return Err(AppError::Conflict(format!(
            "Cannot complete a {} booking",
            booking.status.as_str()
        )));
    }

    // Warranty fields stay null unless new components were fitted with a
    // positive warranty period.
    let months = details.warranty_months.filter(|m| *m > 0);
    let (warranty_months, warranty_expiry) = match (details.used_components, months) {
        (true, Some(m)) => {
            let today = Utc::now().date_naive();
            (Some(m), Some(warranty_expiry_from(today, m)?))
        }
        _ => (None, None),
    };

    queries::record_completion(
        conn,
        booking_id,
        details.service_charge,
        details.used_components,
        details.component_details.as_deref(),
        warranty_months,
        warranty_expiry,
        details.completion_image.as_deref(),
    )?;

    let updated =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;
    Ok(updated)
}

/// Advance a date by a number of calendar months, clamping to the end of a
/// shorter month (Jan 31 + 1 month = Feb 28).
pub fn warranty_expiry_from(start: NaiveDate, months: i64) -> Result<NaiveDate, AppError> {
    u32::try_from(months)
        .ok()
        .and_then(|m| start.checked_add_months(Months::new(m)))
        .ok_or_else(|| AppError::Validation("warrantyMonths is out of range".to_string()))
}

/// Cancellation is reachable from any non-terminal state and is idempotent on
/// an already-cancelled booking. A completed booking stays completed.
pub fn cancel_booking(conn: &Connection, booking_id: &str) -> Result<(), AppError> {
    let booking =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;

    match booking.status {
        BookingStatus::Cancelled => Ok(()),
        BookingStatus::Completed => Err(AppError::Conflict(
            "Cannot cancel a completed booking".to_string(),
        )),
        _ => {
            queries::update_booking_status(conn, booking_id, BookingStatus::Cancelled)?;
            Ok(())
        }
    }
}

/// Store a 1-5 customer rating. Meaningful after completion but accepted in
/// any state.
pub fn rate_booking(conn: &Connection, booking_id: &str, rating: i64) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let updated = queries::set_rating(conn, booking_id, rating)?;
    if !updated {
        return Err(AppError::NotFound("Booking"));
    }
    Ok(())
}

/// Admin override: move a booking to an explicit status. The target must
/// still be a legal transition, and states that imply a worker binding are
/// refused while the booking has none.
pub fn force_status(conn: &Connection, booking_id: &str, status: &str) -> Result<(), AppError> {
    let target = BookingStatus::parse(status)
        .ok_or_else(|| AppError::Validation(format!("Unknown status: {status}")))?;

    if target == BookingStatus::Cancelled {
        return cancel_booking(conn, booking_id);
    }

    let booking =
        queries::get_booking(conn, booking_id)?.ok_or(AppError::NotFound("Booking"))?;

    if booking.status == target {
        return Ok(());
    }
    if !booking.status.can_transition_to(target) {
        return Err(AppError::Conflict(format!(
            "Cannot move a {} booking to {}",
            booking.status.as_str(),
            target.as_str()
        )));
    }

    let needs_worker = matches!(
        target,
        BookingStatus::Assigned | BookingStatus::InProgress | BookingStatus::Completed
    );
    if needs_worker && booking.worker_id.is_none() {
        return Err(AppError::Conflict(
            "Booking has no worker assigned".to_string(),
        ));
    }

    queries::update_booking_status(conn, booking_id, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::assignment;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_worker(conn: &Connection, id: &str) {
        queries::insert_worker(
            conn,
            id,
            "Test Worker",
            &format!("{}@example.com", id.to_lowercase()),
            "+1 555 0100",
            "fake-hash",
            "Laptop & PC Repair",
        )
        .unwrap();
    }

    fn new_booking() -> NewBooking {
        NewBooking {
            customer_id: "USR1".to_string(),
            customer_name: "John Doe".to_string(),
            customer_phone: "+1 555 0101".to_string(),
            customer_address: "123 MG Road".to_string(),
            service: "Laptop - Dell - Screen Repair".to_string(),
            date: "2026-01-12".to_string(),
            time: "10:00".to_string(),
        }
    }

    fn completion(used_components: bool, warranty_months: Option<i64>) -> CompletionDetails {
        CompletionDetails {
            service_charge: 2500.0,
            used_components,
            component_details: used_components.then(|| "Screen".to_string()),
            warranty_months,
            completion_image: None,
        }
    }

    #[test]
    fn test_create_booking_pending_with_otp() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        assert!(booking.id.starts_with("BK"));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.otp.len(), 6);
        assert!(booking.otp.chars().all(|c| c.is_ascii_digit()));
        assert!(booking.worker_id.is_none());
    }

    #[test]
    fn test_create_booking_missing_field() {
        let conn = setup_db();
        let mut req = new_booking();
        req.service = "  ".to_string();

        let err = create_booking(&conn, req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(queries::all_bookings(&conn, None).unwrap().is_empty());
    }

    #[test]
    fn test_full_lifecycle() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        let otp = booking.otp.clone();

        let assigned = assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();
        assert_eq!(assigned.status, BookingStatus::Assigned);
        assert_eq!(assigned.worker_name.as_deref(), Some("Test Worker"));

        let started = verify_otp_and_start(&conn, &booking.id, &otp).unwrap();
        assert_eq!(started.status, BookingStatus::InProgress);

        let completed = complete_booking(&conn, &booking.id, completion(true, Some(6))).unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert_eq!(completed.amount, Some(2500.0));
        assert!(completed.used_components);

        let expected = warranty_expiry_from(Utc::now().date_naive(), 6).unwrap();
        assert_eq!(completed.warranty_expiry, Some(expected));
        assert_eq!(completed.warranty_months, Some(6));
    }

    #[test]
    fn test_wrong_otp_leaves_status_unchanged() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();

        // A stored OTP never matches a value outside the 6-digit range
        let err = verify_otp_and_start(&conn, &booking.id, "000000").unwrap_err();
        assert!(matches!(err, AppError::InvalidOtp));

        let after = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(after.status, BookingStatus::Assigned);
    }

    #[test]
    fn test_verify_otp_is_idempotent_in_progress() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();
        verify_otp_and_start(&conn, &booking.id, &booking.otp).unwrap();

        let again = verify_otp_and_start(&conn, &booking.id, &booking.otp).unwrap();
        assert_eq!(again.status, BookingStatus::InProgress);
    }

    #[test]
    fn test_verify_otp_rejected_while_pending() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        let err = verify_otp_and_start(&conn, &booking.id, &booking.otp).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_complete_without_components_leaves_warranty_null() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();

        let completed =
            complete_booking(&conn, &booking.id, completion(false, Some(12))).unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.warranty_months.is_none());
        assert!(completed.warranty_expiry.is_none());
    }

    #[test]
    fn test_complete_from_assigned_is_allowed() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();

        let completed = complete_booking(&conn, &booking.id, completion(false, None)).unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);
    }

    #[test]
    fn test_complete_pending_rejected() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        let err = complete_booking(&conn, &booking.id, completion(false, None)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        cancel_booking(&conn, &booking.id).unwrap();
        cancel_booking(&conn, &booking.id).unwrap();

        let after = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(after.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_completed_rejected() {
        let conn = setup_db();
        seed_worker(&conn, "WRK1");

        let booking = create_booking(&conn, new_booking()).unwrap();
        assignment::assign_worker(&conn, &booking.id, "WRK1").unwrap();
        complete_booking(&conn, &booking.id, completion(false, None)).unwrap();

        let err = cancel_booking(&conn, &booking.id).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_rate_booking_bounds() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        assert!(matches!(
            rate_booking(&conn, &booking.id, 0).unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            rate_booking(&conn, &booking.id, 6).unwrap_err(),
            AppError::Validation(_)
        ));

        rate_booking(&conn, &booking.id, 5).unwrap();
        let after = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(after.rating, Some(5));
    }

    #[test]
    fn test_rate_unknown_booking() {
        let conn = setup_db();
        let err = rate_booking(&conn, "BKMISSING", 4).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_force_status_validates_value() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        let err = force_status(&conn, &booking.id, "paused").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_force_status_cannot_leave_terminal() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();
        cancel_booking(&conn, &booking.id).unwrap();

        let err = force_status(&conn, &booking.id, "pending").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Same status is a no-op, not an error
        force_status(&conn, &booking.id, "cancelled").unwrap();
    }

    #[test]
    fn test_force_status_requires_worker_binding() {
        let conn = setup_db();
        let booking = create_booking(&conn, new_booking()).unwrap();

        let err = force_status(&conn, &booking.id, "assigned").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        force_status(&conn, &booking.id, "cancelled").unwrap();
        let after = queries::get_booking(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(after.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_warranty_expiry_calendar_months() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let expiry = warranty_expiry_from(start, 12).unwrap();
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2027, 1, 9).unwrap());
    }

    #[test]
    fn test_warranty_expiry_clamps_short_months() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let expiry = warranty_expiry_from(start, 1).unwrap();
        assert_eq!(expiry, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }
}
