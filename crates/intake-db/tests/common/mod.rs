// Backend-agnostic checks for the Database trait. Each function takes
// `&dyn Database` so the assertions are not tied to one backend.

use intake_core::NewSubmission;
use intake_db::{Database, DbError};

fn make_submission(name: &str) -> NewSubmission {
    NewSubmission {
        name: name.to_string(),
        email: format!("{}@example.no", name.to_lowercase()),
        phone: "+47 400 00 000".into(),
        plate_thickness: "3 mm".into(),
        comment: String::new(),
        file_path: String::new(),
    }
}

/// A submission without a file is stored with an empty file path.
pub async fn test_insert_without_file(db: &dyn Database) {
    let row = db.insert_submission(&make_submission("Kari")).await.unwrap();
    assert!(row.id > 0);
    assert_eq!(row.file_path, "");
    assert_eq!(row.comment, "");

    let all = db.list_submissions().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], row);
}

/// Ids grow monotonically with each insert.
pub async fn test_ids_increase(db: &dyn Database) {
    let mut last = 0;
    for name in ["A", "B", "C", "D"] {
        let row = db.insert_submission(&make_submission(name)).await.unwrap();
        assert!(row.id > last, "id {} should exceed {last}", row.id);
        last = row.id;
    }
}

/// Listing returns rows in insertion order.
pub async fn test_list_insertion_order(db: &dyn Database) {
    for name in ["A", "B", "C"] {
        db.insert_submission(&make_submission(name)).await.unwrap();
    }
    let names: Vec<String> = db
        .list_submissions()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

/// Get by id returns the inserted row; unknown ids are NotFound.
pub async fn test_get_by_id(db: &dyn Database) {
    let mut input = make_submission("Ola");
    input.comment = "Trenger levering før fredag".into();
    input.file_path = "/srv/uploads/tegning.pdf".into();
    let row = db.insert_submission(&input).await.unwrap();

    let fetched = db.get_submission(row.id).await.unwrap();
    assert_eq!(fetched, row);
    assert_eq!(fetched.comment, "Trenger levering før fredag");
    assert_eq!(fetched.file_path, "/srv/uploads/tegning.pdf");

    let err = db.get_submission(row.id + 100).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}

/// An empty store lists nothing.
pub async fn test_empty_list(db: &dyn Database) {
    assert!(db.list_submissions().await.unwrap().is_empty());
}
