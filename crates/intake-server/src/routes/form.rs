use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        OriginalUri, State,
    },
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use intake_core::{FormValues, SubmissionForm, UploadedFile};
use intake_service::{Notice, ServiceError, SubmissionOutcome};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(show_form).post(submit_form))
}

/// The form posts back to the URL it was rendered on, query included.
fn form_action(uri: &OriginalUri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

async fn show_form(State(state): State<AppState>, uri: OriginalUri) -> Html<String> {
    Html(
        state
            .service
            .render_form(form_action(&uri), &FormValues::default(), None),
    )
}

async fn submit_form(
    State(state): State<AppState>,
    uri: OriginalUri,
    multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let action = form_action(&uri);
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::info!(error = %e, "unreadable form body");
            let notice = Notice::Errors(vec![e.body_text()]);
            let page = state
                .service
                .render_form(action, &FormValues::default(), Some(&notice));
            return (e.status(), Html(page));
        }
    };
    let values = form.values();

    match state.service.handle_submission(form).await {
        Ok(SubmissionOutcome::NotSubmitted) => (
            StatusCode::OK,
            Html(state.service.render_form(action, &FormValues::default(), None)),
        ),
        Ok(SubmissionOutcome::Accepted(_)) => (
            StatusCode::OK,
            Html(state.service.render_form(
                action,
                &FormValues::default(),
                Some(&Notice::Confirmation),
            )),
        ),
        Err(e) => {
            let (status, message) = to_error(e);
            let notice = Notice::Errors(vec![message]);
            (
                status,
                Html(state.service.render_form(action, &values, Some(&notice))),
            )
        }
    }
}

/// Collect the multipart fields into a form. Unknown text fields are
/// dropped; the part named `file` is the upload.
async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, MultipartError> {
    let mut form = SubmissionForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let data = field.bytes().await?;
            form.file = Some(UploadedFile { file_name, data });
        } else {
            let value = field.text().await?;
            form.set_text(&name, value);
        }
    }
    Ok(form)
}

fn to_error(e: ServiceError) -> (StatusCode, String) {
    match e {
        ServiceError::InvalidInput(v) => (StatusCode::BAD_REQUEST, v.to_string()),
        other => {
            tracing::error!(error = %other, "submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Your submission could not be saved. Please try again.".to_string(),
            )
        }
    }
}
