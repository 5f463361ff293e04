use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the game database and make sure both tables exist
pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    setup_database(&conn)?;
    Ok(conn)
}

/// Create tables if absent. There are no migrations beyond this.
pub fn setup_database(conn: &Connection) -> Result<()> {
    // ==========================================================================
    // Entries Table (the catalog - immutable once inserted)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            -- Unicode lowercase of name; SQLite NOCASE only folds ASCII
            name_key TEXT NOT NULL UNIQUE,
            type1 TEXT NOT NULL,
            type2 TEXT,
            evolution_stage INTEGER NOT NULL CHECK (evolution_stage >= 1),
            total_evolutions INTEGER NOT NULL CHECK (total_evolutions >= 1),
            color TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Outcomes Table (append-only guess log)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS outcomes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            outcome_id TEXT UNIQUE NOT NULL,
            submitted_name TEXT NOT NULL,
            matched INTEGER NOT NULL,
            secret_name TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_outcomes_created_at ON outcomes(created_at)",
        [],
    )?;

    Ok(())
}
