use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;

#[derive(Debug, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub assigned: i64,
    #[serde(rename = "inProgress")]
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Serialize)]
pub struct WorkerReport {
    #[serde(rename = "workerId")]
    pub worker_id: String,
    #[serde(rename = "workerName")]
    pub worker_name: Option<String>,
    #[serde(rename = "jobsCompleted")]
    pub jobs_completed: i64,
    pub revenue: f64,
    #[serde(rename = "avgRating")]
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    #[serde(rename = "totalBookings")]
    pub total_bookings: i64,
    pub counts: StatusCounts,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
    #[serde(rename = "completedWithComponents")]
    pub completed_with_components: i64,
    pub workers: Vec<WorkerReport>,
}

/// Assemble the admin report from the booking store. Nothing here is
/// persisted; every request recomputes from the current rows.
pub fn build_report(conn: &Connection) -> Result<ReportSummary, AppError> {
    let tally = queries::status_tally(conn)?;
    let total_bookings =
        tally.pending + tally.assigned + tally.in_progress + tally.completed + tally.cancelled;

    let workers = queries::worker_aggregates(conn)?
        .into_iter()
        .map(|row| WorkerReport {
            worker_id: row.worker_id,
            worker_name: row.worker_name,
            jobs_completed: row.jobs_completed,
            revenue: row.revenue,
            avg_rating: row.avg_rating,
        })
        .collect();

    Ok(ReportSummary {
        total_bookings,
        counts: StatusCounts {
            pending: tally.pending,
            assigned: tally.assigned,
            in_progress: tally.in_progress,
            completed: tally.completed,
            cancelled: tally.cancelled,
        },
        total_revenue: queries::completed_revenue(conn)?,
        completed_with_components: queries::completed_with_components(conn)?,
        workers,
    })
}
