use bytes::Bytes;

use crate::error::ValidationError;
use crate::sanitize::{sanitize_email, sanitize_text_field};
use crate::submission::NewSubmission;

/// Name of the submit button. Its presence marks a POST as a submission.
pub const SUBMIT_MARKER: &str = "submit_form";

/// Required form fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
    PlateThickness,
}

impl Field {
    pub const REQUIRED: [Field; 4] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::PlateThickness,
    ];

    /// The `name` attribute used in the HTML form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::PlateThickness => "plateThickness",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Navn",
            Field::Email => "E-Mail",
            Field::Phone => "Telefon",
            Field::PlateThickness => "Platetykkelse",
        }
    }
}

/// A file received with the form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client, possibly including a path.
    pub file_name: String,
    pub data: Bytes,
}

/// Raw, unsanitized form input.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    /// Whether the submit marker was present.
    pub submitted: bool,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plate_thickness: Option<String>,
    pub comment: Option<String>,
    pub file: Option<UploadedFile>,
}

impl SubmissionForm {
    /// Assign a text field by its form name. Unknown names are ignored.
    pub fn set_text(&mut self, field: &str, value: String) {
        match field {
            SUBMIT_MARKER => self.submitted = true,
            "name" => self.name = Some(value),
            "email" => self.email = Some(value),
            "phone" => self.phone = Some(value),
            "plateThickness" => self.plate_thickness = Some(value),
            "comment" => self.comment = Some(value),
            _ => {}
        }
    }

    /// Sanitized field values. The file path is left empty.
    pub fn sanitized(&self) -> NewSubmission {
        let text = |v: &Option<String>| v.as_deref().map(sanitize_text_field).unwrap_or_default();
        NewSubmission {
            name: text(&self.name),
            email: self.email.as_deref().map(sanitize_email).unwrap_or_default(),
            phone: text(&self.phone),
            plate_thickness: text(&self.plate_thickness),
            comment: text(&self.comment),
            file_path: String::new(),
        }
    }

    /// The uploaded file, if one with a non-empty name was sent.
    pub fn upload(&self) -> Option<&UploadedFile> {
        self.file.as_ref().filter(|f| !f.file_name.is_empty())
    }

    /// What the user typed, for refilling the form.
    pub fn values(&self) -> FormValues {
        let raw = |v: &Option<String>| v.clone().unwrap_or_default();
        FormValues {
            name: raw(&self.name),
            email: raw(&self.email),
            phone: raw(&self.phone),
            plate_thickness: raw(&self.plate_thickness),
            comment: raw(&self.comment),
        }
    }
}

/// Values prefilled into the rendered form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plate_thickness: String,
    pub comment: String,
}

impl NewSubmission {
    /// Reject the submission if a required field is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing: Vec<Field> = Field::REQUIRED
            .into_iter()
            .filter(|field| self.required_value(*field).is_empty())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    fn required_value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::PlateThickness => &self.plate_thickness,
        }
    }
}

/// Last component of a client or server path, split on `/` and `\`.
/// `None` for names that cannot address a file.
pub fn base_name(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        n => Some(n),
    }
}
