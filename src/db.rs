//! # Database Module
//!
//! SQLite storage for everything Sonic keeps between runs:
//!
//! - `settings` - key/value pairs (API key, theme, onboarding flag, languages)
//! - `queue` - user-curated ordered song list
//! - `history` - append-only log of recommended songs with mood and timestamp
//!
//! One connection per process; there is no concurrent writer, so the last
//! write simply wins.

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS settings (
        key     TEXT PRIMARY KEY,
        value   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS queue (
        song_id  TEXT PRIMARY KEY,
        position INTEGER NOT NULL,
        title    TEXT NOT NULL,
        artist   TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS history (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        song_id   TEXT    NOT NULL,
        title     TEXT    NOT NULL,
        artist    TEXT    NOT NULL,
        mood      TEXT    NOT NULL,
        timestamp INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_history_mood ON history(mood);
    CREATE INDEX IF NOT EXISTS idx_queue_position ON queue(position);
";

/// Open (or create) the database at `path` and make sure the schema exists.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the schema cannot be
/// created.
pub fn open(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    init_schema(&conn)?;
    debug!("Opened database at {}", path.display());
    Ok(conn)
}

/// In-memory database with the full schema. Used by tests and benches.
///
/// # Errors
///
/// Returns an error if SQLite cannot allocate the database.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Failed to create database schema")
}

/// Read one setting.
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        [key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("Failed to read setting '{key}'"))
}

/// Write one setting, replacing any previous value.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .with_context(|| format!("Failed to write setting '{key}'"))?;
    Ok(())
}

/// Remove one setting. Returns whether it existed.
pub fn delete_setting(conn: &Connection, key: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM settings WHERE key = ?1", [key])
        .with_context(|| format!("Failed to delete setting '{key}'"))?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_last_write_wins() {
        let conn = open_in_memory().expect("db");
        assert_eq!(get_setting(&conn, "theme").unwrap(), None);

        set_setting(&conn, "theme", "dark").unwrap();
        set_setting(&conn, "theme", "light").unwrap();
        assert_eq!(get_setting(&conn, "theme").unwrap().as_deref(), Some("light"));

        assert!(delete_setting(&conn, "theme").unwrap());
        assert!(!delete_setting(&conn, "theme").unwrap());
        assert_eq!(get_setting(&conn, "theme").unwrap(), None);
    }

    #[test]
    fn test_open_creates_file_and_persists() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("sonic.db");

        {
            let conn = open(&path).expect("open new db");
            set_setting(&conn, "onboarding_complete", "true").unwrap();
        }
        assert!(path.exists());

        let conn = open(&path).expect("reopen db");
        assert_eq!(
            get_setting(&conn, "onboarding_complete").unwrap().as_deref(),
            Some("true")
        );
    }
}
