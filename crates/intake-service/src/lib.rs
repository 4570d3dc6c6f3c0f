mod error;
pub mod html;
mod service;

pub use error::ServiceError;
pub use html::Notice;
pub use service::{ServiceConfig, SubmissionOutcome, SubmissionService};
