//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_pricing_config", CREATE_PRICING_CONFIG_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

/// Single-row pricing schedule (id is pinned to 1)
const CREATE_PRICING_CONFIG_TABLE: &str = r#"
CREATE TABLE pricing_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    lt1ct_multiplier REAL NOT NULL,
    lt1ct_flat_addition REAL NOT NULL,
    gt1ct_multiplier REAL NOT NULL,
    gt1ct_flat_addition REAL NOT NULL,
    base_fee1 REAL NOT NULL,
    base_fee2 REAL NOT NULL,
    making_lt2g_rate REAL NOT NULL,
    making_gt2g_rate REAL NOT NULL,
    making_multiplier REAL NOT NULL,
    gst_rate REAL NOT NULL,
    last_updated TEXT NOT NULL,
    updated_by TEXT NOT NULL DEFAULT 'system'
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }
}
