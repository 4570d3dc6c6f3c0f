//! HTML rendering for the form page and the admin listing.
//!
//! Every value that reaches the markup goes through [`escape`].

use std::borrow::Cow;

use intake_core::{Field, FormValues, Submission, SUBMIT_MARKER};
use url::Url;

/// Message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Confirmation,
    Errors(Vec<String>),
}

pub const CONFIRMATION_TEXT: &str = "Thank you for your submission!";

/// Escape `& < > " ' /` for element content and quoted attributes.
///
/// Entities already present in `s` are kept as they are, so text the
/// sanitizer stored as `&lt;` renders as `<` rather than `&lt;`.
pub fn escape(s: &str) -> Cow<'_, str> {
    match html_escape::decode_html_entities(s) {
        Cow::Borrowed(raw) => html_escape::encode_safe(raw),
        Cow::Owned(decoded) => Cow::Owned(html_escape::encode_safe(&decoded).into_owned()),
    }
}

/// Wrap `body` in a complete document that links the stylesheet.
pub fn page(title: &str, stylesheet_href: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        escape(stylesheet_href),
        body
    )
}

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Confirmation => format!("<p class=\"notice success\">{CONFIRMATION_TEXT}</p>\n"),
        Notice::Errors(messages) => {
            let mut out = String::from("<div class=\"notice error\">\n<ul>\n");
            for message in messages {
                out.push_str(&format!("<li>{}</li>\n", escape(message)));
            }
            out.push_str("</ul>\n</div>\n");
            out
        }
    }
}

fn input(kind: &str, id: &str, label: &str, value: &str) -> String {
    format!(
        "    <label for=\"{id}\">{label}: </label>\n    <input type=\"{kind}\" id=\"{id}\" name=\"{id}\" value=\"{}\" required><br><br>\n",
        escape(value)
    )
}

/// The intake form, posting back to `action`.
pub fn form(action: &str, values: &FormValues) -> String {
    let mut out = format!(
        "<form action=\"{}\" method=\"post\" enctype=\"multipart/form-data\">\n",
        escape(action)
    );
    for field in Field::REQUIRED {
        let (kind, value) = match field {
            Field::Name => ("text", &values.name),
            Field::Email => ("email", &values.email),
            Field::Phone => ("tel", &values.phone),
            Field::PlateThickness => ("text", &values.plate_thickness),
        };
        out.push_str(&input(kind, field.as_str(), field.label(), value));
    }
    out.push_str(&format!(
        "    <label for=\"comment\">Kommentar (valgfritt): </label>\n    <textarea id=\"comment\" name=\"comment\">{}</textarea><br><br>\n",
        escape(&values.comment)
    ));
    out.push_str(
        "    <label for=\"file\">Fil(er): </label>\n    <input type=\"file\" id=\"file\" name=\"file\"><br><br>\n",
    );
    out.push_str(&format!(
        "    <input type=\"submit\" name=\"{SUBMIT_MARKER}\" value=\"Send\">\n</form>\n"
    ));
    out
}

/// Download URL for a stored upload: `base` with `file_name` appended as
/// one percent-encoded path segment.
pub fn upload_url(base: &Url, file_name: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(file_name);
    }
    url.to_string()
}

fn file_cell(submission: &Submission, upload_base: &Url) -> String {
    match submission.file_name() {
        Some(name) => format!(
            "<a href=\"{}\" download>Download File</a>",
            escape(&upload_url(upload_base, name))
        ),
        None => "No File".to_string(),
    }
}

/// The admin table of submissions, or a placeholder when there are none.
pub fn submissions_table(submissions: &[Submission], upload_base: &Url) -> String {
    if submissions.is_empty() {
        return "<p>No submissions found.</p>\n".to_string();
    }

    let mut out = String::from(
        "<table class=\"widefat fixed\" cellspacing=\"0\">\n<thead>\n<tr>\n\
         <th>ID</th>\n<th>Name</th>\n<th>Email</th>\n<th>Phone</th>\n\
         <th>Platetykkelse</th>\n<th>Comment</th>\n<th>File</th>\n\
         </tr>\n</thead>\n<tbody>\n",
    );
    for s in submissions {
        let id = s.id.to_string();
        out.push_str("<tr>");
        for cell in [
            id.as_str(),
            s.name.as_str(),
            s.email.as_str(),
            s.phone.as_str(),
            s.plate_thickness.as_str(),
            s.comment.as_str(),
        ] {
            out.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        out.push_str(&format!("<td>{}</td></tr>\n", file_cell(s, upload_base)));
    }
    out.push_str("</tbody>\n</table>\n");
    out
}

pub fn admin_listing(submissions: &[Submission], upload_base: &Url) -> String {
    format!(
        "<div class=\"wrap\">\n<h1>Form Submissions</h1>\n{}</div>\n",
        submissions_table(submissions, upload_base)
    )
}
