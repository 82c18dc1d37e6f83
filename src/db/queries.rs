use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Admin, Booking, BookingStatus, User, Worker, WorkerStatus};

const BOOKING_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, customer_address, \
     service, date, time, status, otp, worker_id, worker_name, worker_phone, amount, \
     used_components, component_details, warranty_months, warranty_expiry, completion_image, \
     rating, created_at, updated_at";

fn now_str() -> String {
    Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let created_at = booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO bookings (id, customer_id, customer_name, customer_phone, customer_address,
             service, date, time, status, otp, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            booking.id,
            booking.customer_id,
            booking.customer_name,
            booking.customer_phone,
            booking.customer_address,
            booking.service,
            booking.date,
            booking.time,
            booking.status.as_str(),
            booking.otp,
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn bookings_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![customer_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn all_bookings(
    conn: &Connection,
    status_filter: Option<BookingStatus>,
) -> anyhow::Result<Vec<Booking>> {
    let mut bookings = vec![];

    match status_filter {
        Some(status) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![status.as_str()], |row| Ok(parse_booking_row(row)))?;
            for row in rows {
                bookings.push(row??);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;
            for row in rows {
                bookings.push(row??);
            }
        }
    }

    Ok(bookings)
}

/// Jobs a worker still has to act on, soonest scheduled first.
pub fn active_bookings_for_worker(
    conn: &Connection,
    worker_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE worker_id = ?1 AND status IN ('assigned', 'in-progress')
         ORDER BY date ASC, time ASC"
    ))?;
    let rows = stmt.query_map(params![worker_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

/// Denormalize the worker onto the booking row and mark it assigned.
pub fn bind_worker(conn: &Connection, booking_id: &str, worker: &Worker) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings
         SET worker_id = ?1, worker_name = ?2, worker_phone = ?3, status = 'assigned',
             updated_at = ?4
         WHERE id = ?5",
        params![worker.id, worker.name, worker.phone, now_str(), booking_id],
    )?;
    Ok(count > 0)
}

#[allow(clippy::too_many_arguments)]
pub fn record_completion(
    conn: &Connection,
    id: &str,
    amount: f64,
    used_components: bool,
    component_details: Option<&str>,
    warranty_months: Option<i64>,
    warranty_expiry: Option<NaiveDate>,
    completion_image: Option<&str>,
) -> anyhow::Result<bool> {
    let expiry = warranty_expiry.map(|d| d.format("%Y-%m-%d").to_string());
    let count = conn.execute(
        "UPDATE bookings
         SET status = 'completed', amount = ?1, used_components = ?2, component_details = ?3,
             warranty_months = ?4, warranty_expiry = ?5, completion_image = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            amount,
            used_components as i32,
            component_details,
            warranty_months,
            expiry,
            completion_image,
            now_str(),
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn set_rating(conn: &Connection, id: &str, rating: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET rating = ?1, updated_at = ?2 WHERE id = ?3",
        params![rating, now_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let status_str: String = row.get(8)?;
    let warranty_expiry_str: Option<String> = row.get(17)?;
    let created_at_str: String = row.get(20)?;
    let updated_at_str: String = row.get(21)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        customer_phone: row.get(3)?,
        customer_address: row.get(4)?,
        service: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        status: BookingStatus::parse(&status_str).unwrap_or(BookingStatus::Pending),
        otp: row.get(9)?,
        worker_id: row.get(10)?,
        worker_name: row.get(11)?,
        worker_phone: row.get(12)?,
        amount: row.get(13)?,
        used_components: row.get::<_, i32>(14)? != 0,
        component_details: row.get(15)?,
        warranty_months: row.get(16)?,
        warranty_expiry: warranty_expiry_str
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        completion_image: row.get(18)?,
        rating: row.get(19)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Workers ──

pub fn insert_worker(
    conn: &Connection,
    id: &str,
    name: &str,
    email: &str,
    phone: &str,
    password_hash: &str,
    specialty: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO workers (id, name, email, phone, password_hash, specialty, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active')",
        params![id, name, email, phone, password_hash, specialty],
    )?;
    Ok(())
}

pub fn get_worker(conn: &Connection, id: &str) -> anyhow::Result<Option<Worker>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, password_hash, specialty, status, created_at
         FROM workers WHERE id = ?1",
        params![id],
        parse_worker_row,
    );

    match result {
        Ok(worker) => Ok(Some(worker)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_worker_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Worker>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, password_hash, specialty, status, created_at
         FROM workers WHERE email = ?1",
        params![email],
        parse_worker_row,
    );

    match result {
        Ok(worker) => Ok(Some(worker)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn worker_email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM workers WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_workers(conn: &Connection) -> anyhow::Result<Vec<Worker>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone, password_hash, specialty, status, created_at
         FROM workers ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt.query_map([], parse_worker_row)?;

    let mut workers = vec![];
    for row in rows {
        workers.push(row?);
    }
    Ok(workers)
}

pub fn set_worker_status(
    conn: &Connection,
    id: &str,
    status: WorkerStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE workers SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_worker_row(row: &rusqlite::Row) -> rusqlite::Result<Worker> {
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    Ok(Worker {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        specialty: row.get(5)?,
        status: WorkerStatus::parse(&status_str).unwrap_or(WorkerStatus::Inactive),
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Users ──

pub fn insert_user(
    conn: &Connection,
    id: &str,
    name: &str,
    email: &str,
    phone: &str,
    password_hash: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, phone, password_hash) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, email, phone, password_hash],
    )?;
    Ok(())
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, name, email, phone, password_hash, created_at FROM users WHERE email = ?1",
        params![email],
        |row| {
            let created_at_str: String = row.get(5)?;
            Ok(User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                phone: row.get(3)?,
                password_hash: row.get(4)?,
                created_at: parse_datetime(&created_at_str),
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn user_email_exists(conn: &Connection, email: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ── Admins ──

pub fn get_admin_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Admin>> {
    let result = conn.query_row(
        "SELECT id, name, email, password_hash, created_at FROM admins WHERE email = ?1",
        params![email],
        |row| {
            let created_at_str: String = row.get(4)?;
            Ok(Admin {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                created_at: parse_datetime(&created_at_str),
            })
        },
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Aggregations ──

#[derive(Debug, Default)]
pub struct StatusTally {
    pub pending: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

pub fn status_tally(conn: &Connection) -> anyhow::Result<StatusTally> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM bookings GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        Ok((status, count))
    })?;

    let mut tally = StatusTally::default();
    for row in rows {
        let (status, count) = row?;
        match BookingStatus::parse(&status) {
            Some(BookingStatus::Pending) => tally.pending = count,
            Some(BookingStatus::Assigned) => tally.assigned = count,
            Some(BookingStatus::InProgress) => tally.in_progress = count,
            Some(BookingStatus::Completed) => tally.completed = count,
            Some(BookingStatus::Cancelled) => tally.cancelled = count,
            None => {}
        }
    }
    Ok(tally)
}

pub fn completed_revenue(conn: &Connection) -> anyhow::Result<f64> {
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM bookings WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )?;
    Ok(total)
}

pub fn completed_with_components(conn: &Connection) -> anyhow::Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE status = 'completed' AND used_components = 1",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[derive(Debug)]
pub struct WorkerAggRow {
    pub worker_id: String,
    pub worker_name: Option<String>,
    pub jobs_completed: i64,
    pub revenue: f64,
    pub avg_rating: Option<f64>,
}

/// Per-worker aggregates over completed bookings only.
pub fn worker_aggregates(conn: &Connection) -> anyhow::Result<Vec<WorkerAggRow>> {
    let mut stmt = conn.prepare(
        "SELECT worker_id, worker_name, COUNT(*), COALESCE(SUM(amount), 0), AVG(rating)
         FROM bookings
         WHERE status = 'completed' AND worker_id IS NOT NULL
         GROUP BY worker_id, worker_name
         ORDER BY COUNT(*) DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(WorkerAggRow {
            worker_id: row.get(0)?,
            worker_name: row.get(1)?,
            jobs_completed: row.get(2)?,
            revenue: row.get(3)?,
            avg_rating: row.get(4)?,
        })
    })?;

    let mut aggregates = vec![];
    for row in rows {
        aggregates.push(row?);
    }
    Ok(aggregates)
}

#[derive(Debug)]
pub struct WorkerStats {
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
}

pub fn worker_stats(conn: &Connection, worker_id: &str) -> anyhow::Result<WorkerStats> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM bookings WHERE worker_id = ?1 GROUP BY status",
    )?;
    let rows = stmt.query_map(params![worker_id], |row| {
        let status: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        Ok((status, count))
    })?;

    let mut stats = WorkerStats {
        assigned: 0,
        in_progress: 0,
        completed: 0,
    };
    for row in rows {
        let (status, count) = row?;
        match BookingStatus::parse(&status) {
            Some(BookingStatus::Assigned) => stats.assigned = count,
            Some(BookingStatus::InProgress) => stats.in_progress = count,
            Some(BookingStatus::Completed) => stats.completed = count,
            _ => {}
        }
    }
    Ok(stats)
}
