use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use url::Url;

use intake_core::form::base_name;
use intake_core::{Capability, FormValues, Principal, Submission, SubmissionForm, UploadedFile};
use intake_db::Database;
use intake_store::{ObjectStore, StoredObject};

use crate::html::{self, Notice};
use crate::ServiceError;

pub const DEFAULT_STYLESHEET_HREF: &str = "/assets/form-styles.css";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Public URL the upload directory is served under.
    pub public_upload_url: Url,
    /// Stylesheet linked from every rendered page.
    pub stylesheet_href: String,
}

impl ServiceConfig {
    pub fn new(public_upload_url: Url) -> Result<Self, ServiceError> {
        if public_upload_url.cannot_be_a_base() {
            return Err(ServiceError::Internal(format!(
                "public upload URL cannot have path segments: {public_upload_url}"
            )));
        }
        Ok(Self {
            public_upload_url,
            stylesheet_href: DEFAULT_STYLESHEET_HREF.to_string(),
        })
    }
}

/// Result of `handle_submission`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The request carried no submit marker; nothing was stored.
    NotSubmitted,
    Accepted(Submission),
}

/// Renders the form, stores submissions, and lists them for administrators.
pub struct SubmissionService {
    db: Arc<dyn Database>,
    store: Arc<dyn ObjectStore>,
    config: ServiceConfig,
}

impl SubmissionService {
    pub fn new(db: Arc<dyn Database>, store: Arc<dyn ObjectStore>, config: ServiceConfig) -> Self {
        Self { db, store, config }
    }

    /// Full form page posting back to `action`, with an optional notice above it.
    pub fn render_form(&self, action: &str, values: &FormValues, notice: Option<&Notice>) -> String {
        let mut body = String::new();
        if let Some(notice) = notice {
            body.push_str(&html::notice(notice));
        }
        body.push_str(&html::form(action, values));
        html::page("Skjema", &self.config.stylesheet_href, &body)
    }

    /// Store one submission if the submit marker is present.
    ///
    /// A missing or empty required field rejects the whole submission. A
    /// file that cannot be stored is dropped and the row is written with an
    /// empty file path.
    pub async fn handle_submission(
        &self,
        form: SubmissionForm,
    ) -> Result<SubmissionOutcome, ServiceError> {
        if !form.submitted {
            return Ok(SubmissionOutcome::NotSubmitted);
        }

        let mut fields = form.sanitized();
        if let Err(e) = fields.validate() {
            info!(missing = %e, "rejected submission");
            return Err(e.into());
        }

        let stored = match form.upload() {
            Some(file) => self.store_upload(file).await,
            None => None,
        };
        if let Some(obj) = &stored {
            fields.file_path = obj.location.clone();
        }

        match self.db.insert_submission(&fields).await {
            Ok(submission) => {
                info!(
                    id = submission.id,
                    has_file = submission.has_file(),
                    "stored submission"
                );
                Ok(SubmissionOutcome::Accepted(submission))
            }
            Err(e) => {
                if let Some(obj) = stored {
                    if let Err(del) = self.store.delete(&obj.key).await {
                        warn!(key = %obj.key, error = %del, "could not remove upload after failed insert");
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn store_upload(&self, file: &UploadedFile) -> Option<StoredObject> {
        let Some(name) = base_name(&file.file_name) else {
            warn!(file_name = %file.file_name, "upload has no usable file name");
            return None;
        };
        match self.store.put_new(name, file.data.clone()).await {
            Ok(obj) => Some(obj),
            Err(e) => {
                warn!(file_name = %name, error = %e, "could not store upload");
                None
            }
        }
    }

    /// Admin page listing every submission in insertion order.
    pub async fn render_admin_listing(&self, principal: &Principal) -> Result<String, ServiceError> {
        let submissions = self.list_submissions(principal).await?;
        let body = html::admin_listing(&submissions, &self.config.public_upload_url);
        Ok(html::page("Form Submissions", &self.config.stylesheet_href, &body))
    }

    pub async fn list_submissions(&self, principal: &Principal) -> Result<Vec<Submission>, ServiceError> {
        authorize(principal, Capability::ManageSubmissions)?;
        Ok(self.db.list_submissions().await?)
    }

    pub async fn get_submission(&self, principal: &Principal, id: i64) -> Result<Submission, ServiceError> {
        authorize(principal, Capability::ManageSubmissions)?;
        Ok(self.db.get_submission(id).await?)
    }

    /// Contents of a stored upload, addressed by base name.
    pub async fn read_upload(&self, name: &str) -> Result<Bytes, ServiceError> {
        Ok(self.store.get(name).await?)
    }
}

fn authorize(principal: &Principal, capability: Capability) -> Result<(), ServiceError> {
    if principal.can(capability) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(format!(
            "requires {}",
            capability.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use intake_core::{NewSubmission, SUBMIT_MARKER};
    use intake_db::{DbError, SqliteDatabase};
    use intake_store::{LocalStore, StoreConfig, StoreError};

    struct Fixture {
        service: SubmissionService,
        upload_dir: tempfile::TempDir,
    }

    fn config() -> ServiceConfig {
        ServiceConfig::new(Url::parse("http://localhost:3720/uploads/").unwrap()).unwrap()
    }

    fn local_store(dir: &std::path::Path) -> Arc<dyn ObjectStore> {
        Arc::new(LocalStore::new(&StoreConfig {
            upload_dir: dir.to_path_buf(),
        }))
    }

    fn fixture() -> Fixture {
        let upload_dir = tempfile::tempdir().unwrap();
        let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
        let service = SubmissionService::new(db, local_store(upload_dir.path()), config());
        Fixture {
            service,
            upload_dir,
        }
    }

    fn form(name: &str) -> SubmissionForm {
        let mut form = SubmissionForm::default();
        form.set_text(SUBMIT_MARKER, "Send".into());
        form.set_text("name", name.into());
        form.set_text("email", "kari@example.no".into());
        form.set_text("phone", "12345678".into());
        form.set_text("plateThickness", "5 mm".into());
        form
    }

    fn with_file(mut form: SubmissionForm, file_name: &str, data: &'static [u8]) -> SubmissionForm {
        form.file = Some(UploadedFile {
            file_name: file_name.into(),
            data: Bytes::from_static(data),
        });
        form
    }

    fn accepted(outcome: SubmissionOutcome) -> Submission {
        match outcome {
            SubmissionOutcome::Accepted(s) => s,
            other => panic!("expected Accepted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submission_without_file_stores_one_row() {
        let fx = fixture();
        let first = accepted(fx.service.handle_submission(form("Kari")).await.unwrap());
        assert_eq!(first.file_path, "");
        assert_eq!(first.comment, "");

        let second = accepted(fx.service.handle_submission(form("Ola")).await.unwrap());
        assert!(second.id > first.id);

        let rows = fx.service.list_submissions(&Principal::admin()).await.unwrap();
        assert_eq!(rows, vec![first, second]);
    }

    #[tokio::test]
    async fn submission_with_file_records_written_path() {
        let fx = fixture();
        let row = accepted(
            fx.service
                .handle_submission(with_file(form("Kari"), "C:\\tegninger\\plate.dxf", b"0\nSECTION"))
                .await
                .unwrap(),
        );
        let expected = fx.upload_dir.path().join("plate.dxf");
        assert_eq!(row.file_path, expected.to_string_lossy());
        assert_eq!(std::fs::read(&expected).unwrap(), b"0\nSECTION");
    }

    #[tokio::test]
    async fn same_file_name_twice_keeps_both_files() {
        let fx = fixture();
        let a = accepted(
            fx.service
                .handle_submission(with_file(form("A"), "plate.pdf", b"first"))
                .await
                .unwrap(),
        );
        let b = accepted(
            fx.service
                .handle_submission(with_file(form("B"), "plate.pdf", b"second"))
                .await
                .unwrap(),
        );
        assert_ne!(a.file_path, b.file_path);
        assert_eq!(std::fs::read(&a.file_path).unwrap(), b"first");
        assert_eq!(std::fs::read(&b.file_path).unwrap(), b"second");
        assert_eq!(b.file_name(), Some("plate-1.pdf"));
    }

    #[tokio::test]
    async fn missing_marker_stores_nothing() {
        let fx = fixture();
        let mut f = with_file(form("Kari"), "plate.pdf", b"x");
        f.submitted = false;
        let outcome = fx.service.handle_submission(f).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::NotSubmitted);
        assert!(fx.service.list_submissions(&Principal::admin()).await.unwrap().is_empty());
        assert!(!fx.upload_dir.path().join("plate.pdf").exists());
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected() {
        let fx = fixture();
        let mut f = with_file(form("Kari"), "plate.pdf", b"x");
        f.plate_thickness = None;
        let err = fx.service.handle_submission(f).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(fx.service.list_submissions(&Principal::admin()).await.unwrap().is_empty());
        assert!(!fx.upload_dir.path().join("plate.pdf").exists());
    }

    #[tokio::test]
    async fn unusable_file_name_keeps_submission() {
        let fx = fixture();
        let row = accepted(
            fx.service
                .handle_submission(with_file(form("Kari"), "uploads/..", b"x"))
                .await
                .unwrap(),
        );
        assert_eq!(row.file_path, "");
    }

    #[tokio::test]
    async fn failed_file_store_keeps_submission_with_empty_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
        let service = SubmissionService::new(db, local_store(&blocker.join("uploads")), config());

        let row = accepted(
            service
                .handle_submission(with_file(form("Kari"), "plate.pdf", b"x"))
                .await
                .unwrap(),
        );
        assert_eq!(row.file_path, "");
        assert_eq!(service.list_submissions(&Principal::admin()).await.unwrap().len(), 1);
    }

    struct FailingDb;

    #[async_trait]
    impl Database for FailingDb {
        async fn insert_submission(&self, _input: &NewSubmission) -> Result<Submission, DbError> {
            Err(DbError::Internal("database is locked".into()))
        }
        async fn get_submission(&self, id: i64) -> Result<Submission, DbError> {
            Err(DbError::NotFound(format!("submission {id}")))
        }
        async fn list_submissions(&self) -> Result<Vec<Submission>, DbError> {
            Err(DbError::Internal("database is locked".into()))
        }
    }

    #[tokio::test]
    async fn failed_insert_is_internal_and_removes_upload() {
        let upload_dir = tempfile::tempdir().unwrap();
        let service =
            SubmissionService::new(Arc::new(FailingDb), local_store(upload_dir.path()), config());

        let err = service
            .handle_submission(with_file(form("Kari"), "plate.pdf", b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(!upload_dir.path().join("plate.pdf").exists());
    }

    struct ReadOnlyStore;

    #[async_trait]
    impl ObjectStore for ReadOnlyStore {
        async fn put_new(&self, _key: &str, _data: Bytes) -> Result<StoredObject, StoreError> {
            Err(StoreError::Internal("read-only file system".into()))
        }
        async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
            Err(StoreError::NotFound(key.to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn store_error_is_not_fatal() {
        let db = Arc::new(SqliteDatabase::open_in_memory().unwrap());
        let service = SubmissionService::new(db, Arc::new(ReadOnlyStore), config());
        let row = accepted(
            service
                .handle_submission(with_file(form("Kari"), "plate.pdf", b"x"))
                .await
                .unwrap(),
        );
        assert!(!row.has_file());
    }

    #[tokio::test]
    async fn admin_listing_requires_capability() {
        let fx = fixture();
        fx.service.handle_submission(form("Secret Name")).await.unwrap();

        let err = fx
            .service
            .render_admin_listing(&Principal::anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(!err.to_string().contains("Secret Name"));

        let err = fx.service.get_submission(&Principal::anonymous(), 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_listing_shows_rows_in_insertion_order() {
        let fx = fixture();
        for name in ["Alpha", "Bravo", "Charlie"] {
            fx.service.handle_submission(form(name)).await.unwrap();
        }
        let html = fx.service.render_admin_listing(&Principal::admin()).await.unwrap();
        let a = html.find("Alpha").unwrap();
        let b = html.find("Bravo").unwrap();
        let c = html.find("Charlie").unwrap();
        assert!(a < b && b < c);
        assert_eq!(html.matches("No File").count(), 3);
    }

    #[tokio::test]
    async fn listing_shows_sanitized_lt_once() {
        let fx = fixture();
        let mut f = form("Kari");
        f.set_text("plateThickness", "3 < 4 mm".into());
        let row = accepted(fx.service.handle_submission(f).await.unwrap());
        assert_eq!(row.plate_thickness, "3 &lt; 4 mm");

        let html = fx.service.render_admin_listing(&Principal::admin()).await.unwrap();
        assert!(html.contains("<td>3 &lt; 4 mm</td>"), "{html}");
        assert!(!html.contains("&amp;lt;"));
    }

    #[tokio::test]
    async fn admin_listing_surfaces_store_failure() {
        let upload_dir = tempfile::tempdir().unwrap();
        let service =
            SubmissionService::new(Arc::new(FailingDb), local_store(upload_dir.path()), config());
        let err = service.render_admin_listing(&Principal::admin()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[tokio::test]
    async fn listing_links_uploaded_file() {
        let fx = fixture();
        fx.service
            .handle_submission(with_file(form("Kari"), "plate 4mm.pdf", b"%PDF"))
            .await
            .unwrap();
        let html = fx.service.render_admin_listing(&Principal::admin()).await.unwrap();
        assert!(html.contains("plate%204mm.pdf\" download>Download File</a>"));

        let data = fx.service.read_upload("plate 4mm.pdf").await.unwrap();
        assert_eq!(data.as_ref(), b"%PDF");
    }

    #[tokio::test]
    async fn render_form_shows_notice_and_refill() {
        let fx = fixture();
        let values = FormValues {
            name: "<Kari>".into(),
            ..Default::default()
        };
        let html = fx.service.render_form(
            "/",
            &values,
            Some(&Notice::Errors(vec!["missing required fields: E-Mail".into()])),
        );
        assert!(html.contains("missing required fields: E-Mail"));
        assert!(html.contains("value=\"&lt;Kari&gt;\""));
        assert!(html.contains("form-styles.css"));

        let html = fx.service.render_form("/", &FormValues::default(), Some(&Notice::Confirmation));
        assert!(html.contains(html::CONFIRMATION_TEXT));
    }

    #[test]
    fn config_rejects_non_hierarchical_url() {
        let err = ServiceConfig::new(Url::parse("mailto:uploads@example.no").unwrap()).unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
