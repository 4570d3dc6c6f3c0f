use rusqlite::Connection;

use super::SqliteResultExt;
use crate::DbError;

/// Create the schema on first open. There are no versioned migrations;
/// an existing table is left as it is.
pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS submissions (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL DEFAULT '',
            email           TEXT NOT NULL DEFAULT '',
            phone           TEXT NOT NULL DEFAULT '',
            plateThickness  TEXT NOT NULL DEFAULT '',
            comment         TEXT NOT NULL DEFAULT '',
            file_path       TEXT NOT NULL DEFAULT ''
        );
        ",
    )
    .to_db()
}
