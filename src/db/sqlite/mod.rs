//! SQLite database module

mod migrations;
mod pricing_config;

use crate::error::Result;
use crate::pricing::PricingConfig;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Open (or create) the database file and bring its schema up to date
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn)
    }

    /// Ephemeral database, used by tests and one-shot CLI runs
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Pricing Config Methods ==========

    /// Read the stored pricing schedule
    pub fn get_pricing_config(&self) -> Result<Option<PricingConfig>> {
        let conn = self.conn.lock();
        pricing_config::get_pricing_config(&conn)
    }

    /// Replace the stored pricing schedule
    pub fn save_pricing_config(&self, config: &PricingConfig) -> Result<PricingConfig> {
        let conn = self.conn.lock();
        pricing_config::save_pricing_config(&conn, config)
    }

    /// Store a default schedule unless one already exists
    pub fn init_pricing_config(&self, default: &PricingConfig) -> Result<PricingConfig> {
        let conn = self.conn.lock();
        pricing_config::init_pricing_config(&conn, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::MarginPreset;
    use chrono::{TimeZone, Utc};

    fn stamp() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 4, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_database_has_no_config() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(db.get_pricing_config().unwrap().is_none());
    }

    #[test]
    fn test_save_and_read_back() {
        let db = SqliteDb::open_in_memory().unwrap();
        let mut config = MarginPreset::Standard.config(stamp());
        config.gst_rate = 0.05;
        config.updated_by = "admin".to_string();

        let saved = db.save_pricing_config(&config).unwrap();
        assert_eq!(saved, config);
        assert_eq!(db.get_pricing_config().unwrap(), Some(config));
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let db = SqliteDb::open_in_memory().unwrap();
        let mut edited = MarginPreset::Standard.config(stamp());
        edited.making_charges.multiplier = 2.0;
        db.save_pricing_config(&edited).unwrap();

        let live = db
            .init_pricing_config(&MarginPreset::HighMargin.config(stamp()))
            .unwrap();
        assert_eq!(live.making_charges.multiplier, 2.0);
        assert_eq!(live.diamond_margins.less_than_1ct.multiplier, 2.2);
    }

    #[test]
    fn test_init_on_empty_stores_default() {
        let db = SqliteDb::open_in_memory().unwrap();
        let default = MarginPreset::HighMargin.config(stamp());
        assert_eq!(db.init_pricing_config(&default).unwrap(), default);
        assert_eq!(db.get_pricing_config().unwrap(), Some(default));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("pricing.db");
        let config = MarginPreset::Standard.config(stamp());

        {
            let db = SqliteDb::new(&path).unwrap();
            db.save_pricing_config(&config).unwrap();
        }

        let db = SqliteDb::new(&path).unwrap();
        assert_eq!(db.get_pricing_config().unwrap(), Some(config));
    }
}
