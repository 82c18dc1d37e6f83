pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::{params, Connection};

use crate::config::AppConfig;
use crate::services::auth;
use crate::services::ids;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// Ensure the configured admin account exists. An existing row with the same
/// email is left untouched, stored hash included.
pub fn seed_admin(conn: &Connection, config: &AppConfig) -> anyhow::Result<()> {
    let exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM admins WHERE email = ?1",
            [&config.admin_email],
            |row| row.get(0),
        )
        .context("failed to check for admin account")?;

    if exists {
        return Ok(());
    }

    let hash = auth::hash_password(&config.admin_password)
        .map_err(|_| anyhow::anyhow!("failed to hash admin password"))?;

    conn.execute(
        "INSERT INTO admins (id, name, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![ids::prefixed_id("ADM"), config.admin_name, config.admin_email, hash],
    )
    .context("failed to seed admin account")?;

    tracing::info!(email = %config.admin_email, "seeded default admin account");
    Ok(())
}
