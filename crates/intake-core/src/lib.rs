pub mod error;
pub mod form;
pub mod principal;
pub mod sanitize;
pub mod submission;

pub use error::ValidationError;
pub use form::{Field, FormValues, SubmissionForm, UploadedFile, SUBMIT_MARKER};
pub use principal::{Capability, Principal};
pub use submission::{NewSubmission, Submission};
