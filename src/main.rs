use std::sync::{Arc, Mutex};

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use repairdesk::config::AppConfig;
use repairdesk::db;
use repairdesk::handlers;
use repairdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    db::seed_admin(&conn, &config)?;

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
    });

    let app = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/user/register", post(handlers::user::register))
        .route("/api/user/login", post(handlers::user::login))
        .route("/api/user/bookings", post(handlers::user::create_booking))
        .route(
            "/api/user/bookings/:id",
            get(handlers::user::list_bookings),
        )
        .route(
            "/api/user/booking/:id",
            get(handlers::user::get_booking),
        )
        .route(
            "/api/user/bookings/:id/rate",
            post(handlers::user::rate_booking),
        )
        .route("/api/admin/login", post(handlers::admin::login))
        .route("/api/admin/bookings", get(handlers::admin::list_bookings))
        .route(
            "/api/admin/workers",
            get(handlers::admin::list_workers).post(handlers::admin::create_worker),
        )
        .route(
            "/api/admin/workers/:id/status",
            patch(handlers::admin::update_worker_status),
        )
        .route(
            "/api/admin/bookings/:id/assign",
            post(handlers::admin::assign_worker),
        )
        .route(
            "/api/admin/bookings/:id/status",
            patch(handlers::admin::update_booking_status),
        )
        .route("/api/admin/reports", get(handlers::admin::get_reports))
        .route("/api/worker/login", post(handlers::worker::login))
        .route(
            "/api/worker/bookings/:id",
            get(handlers::worker::list_bookings),
        )
        .route(
            "/api/worker/bookings/:id/verify-otp",
            post(handlers::worker::verify_otp),
        )
        .route(
            "/api/worker/bookings/:id/complete",
            post(handlers::worker::complete_booking),
        )
        .route("/api/worker/stats/:id", get(handlers::worker::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
