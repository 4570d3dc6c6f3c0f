use rusqlite::{params, Row};

use intake_core::{NewSubmission, Submission};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_submission(row: &Row) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        plate_thickness: row.get("plateThickness")?,
        comment: row.get("comment")?,
        file_path: row.get("file_path")?,
    })
}

impl SqliteDatabase {
    pub fn insert_submission_sync(&self, input: &NewSubmission) -> Result<Submission, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO submissions (name, email, phone, plateThickness, comment, file_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    input.name,
                    input.email,
                    input.phone,
                    input.plate_thickness,
                    input.comment,
                    input.file_path,
                ],
            )
            .to_db()?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT * FROM submissions WHERE id = ?1",
                params![id],
                row_to_submission,
            )
            .to_db()
        })
    }

    pub fn get_submission_sync(&self, id: i64) -> Result<Submission, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM submissions WHERE id = ?1",
                params![id],
                row_to_submission,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("submission {id}"))
                }
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn list_submissions_sync(&self) -> Result<Vec<Submission>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM submissions ORDER BY id ASC")
                .to_db()?;
            let submissions = stmt
                .query_map([], row_to_submission)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(submissions)
        })
    }
}
