use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Local;
use serde_json::json;
use tracing::error;

use super::domain::{ApplicantFormData, W4FormData};
use super::envelope::ApiEnvelope;
use super::i9::map_i9;
use super::notify::OnboardingNotifier;
use super::service::{FormError, FormGenerator, GeneratedForm};
use super::template::TemplateSource;
use super::w4::map_w4;

pub const SKIPPED_FIELDS_HEADER: &str = "x-skipped-fields";

/// Router builder exposing form generation and mapping preview endpoints.
pub fn onboarding_router<S, N>(generator: Arc<FormGenerator<S, N>>) -> Router
where
    S: TemplateSource + 'static,
    N: OnboardingNotifier + 'static,
{
    Router::new()
        .route("/api/v1/onboarding/i9", post(i9_pdf_handler::<S, N>))
        .route("/api/v1/onboarding/i9/fields", post(i9_fields_handler))
        .route("/api/v1/onboarding/w4", post(w4_pdf_handler::<S, N>))
        .route("/api/v1/onboarding/w4/fields", post(w4_fields_handler))
        .with_state(generator)
}

pub(crate) async fn i9_pdf_handler<S, N>(
    State(generator): State<Arc<FormGenerator<S, N>>>,
    Json(body): Json<ApiEnvelope<ApplicantFormData>>,
) -> Response
where
    S: TemplateSource + 'static,
    N: OnboardingNotifier + 'static,
{
    let data = body.into_inner();
    generate_blocking(move || generator.generate_i9(&data)).await
}

pub(crate) async fn w4_pdf_handler<S, N>(
    State(generator): State<Arc<FormGenerator<S, N>>>,
    Json(body): Json<ApiEnvelope<W4FormData>>,
) -> Response
where
    S: TemplateSource + 'static,
    N: OnboardingNotifier + 'static,
{
    let data = body.into_inner();
    generate_blocking(move || generator.generate_w4(&data)).await
}

pub(crate) async fn i9_fields_handler(
    Json(body): Json<ApiEnvelope<ApplicantFormData>>,
) -> Response {
    let assignments = map_i9(&body.into_inner(), Local::now().date_naive());
    (StatusCode::OK, Json(ApiEnvelope::wrap(assignments))).into_response()
}

pub(crate) async fn w4_fields_handler(Json(body): Json<ApiEnvelope<W4FormData>>) -> Response {
    let assignments = map_w4(&body.into_inner());
    (StatusCode::OK, Json(ApiEnvelope::wrap(assignments))).into_response()
}

/// Template reads and lopdf parsing block, so generation runs on the blocking pool.
async fn generate_blocking<F>(job: F) -> Response
where
    F: FnOnce() -> Result<GeneratedForm, FormError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => pdf_response(result),
        Err(err) => {
            error!(error = %err, "form generation task failed");
            let payload = json!({ "error": "form generation task failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn pdf_response(result: Result<GeneratedForm, FormError>) -> Response {
    match result {
        Ok(form) => {
            let headers = [
                (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", form.file_name),
                ),
                (
                    HeaderName::from_static(SKIPPED_FIELDS_HEADER),
                    form.report.skipped.len().to_string(),
                ),
            ];
            (StatusCode::OK, headers, form.bytes).into_response()
        }
        Err(FormError::Template(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
