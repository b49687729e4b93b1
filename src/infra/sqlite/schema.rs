use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::domain::columns::Column;

pub const RECORDS_TABLE: &str = "school_rolls";

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

fn year_column_defs() -> String {
    Column::all()
        .filter(|column| column.is_numeric())
        .map(|column| format!("{} INTEGER", column.storage_name()))
        .collect::<Vec<_>>()
        .join(",\n            ")
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {RECORDS_TABLE} (
            ObjectId    TEXT PRIMARY KEY NOT NULL,
            Code        TEXT,
            Name        TEXT NOT NULL DEFAULT '',
            LA_Code     TEXT,
            LA_Name     TEXT,
            Sector      TEXT,
            School_Type TEXT,
            {years}
        );

        CREATE TABLE IF NOT EXISTS import_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            source_path TEXT NOT NULL,
            row_count   INTEGER NOT NULL,
            imported_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_name ON {RECORDS_TABLE}(Name);
        CREATE INDEX IF NOT EXISTS idx_sector ON {RECORDS_TABLE}(Sector);
        CREATE INDEX IF NOT EXISTS idx_school_type ON {RECORDS_TABLE}(School_Type);
        ",
        years = year_column_defs(),
    ))
    .context("failed to initialize schema")?;

    Ok(())
}
