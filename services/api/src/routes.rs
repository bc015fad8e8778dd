use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use hotel_onboard::forms::{onboarding_router, FormGenerator, OnboardingNotifier, TemplateSource};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_onboarding_routes<S, N>(generator: Arc<FormGenerator<S, N>>) -> axum::Router
where
    S: TemplateSource + 'static,
    N: OnboardingNotifier + 'static,
{
    onboarding_router(generator)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::BroadcastNotifier;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use hotel_onboard::forms::{RenderOptions, StaticTemplateSource};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, BroadcastNotifier) {
        let notifier = BroadcastNotifier::default();
        let generator = Arc::new(FormGenerator::new(
            Arc::new(StaticTemplateSource::default()),
            Arc::new(notifier.clone()),
            RenderOptions::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        (
            with_onboarding_routes(generator).layer(Extension(state)),
            notifier,
        )
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let (starting, _) = app(false);
        let response = starting
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");

        let (ready, _) = app(true);
        let response = ready
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_metrics_are_served_alongside_form_routes() {
        let (router, _) = app(true);
        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(json_body(response).await["status"], "ok");

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn missing_templates_surface_as_unavailable_without_notices() {
        let (router, notifier) = app(true);
        let mut notices = notifier.subscribe();
        let request = Request::post("/api/v1/onboarding/w4")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{ "data": { "first_name": "Jane" } }"#))
            .expect("request");

        let response = router.oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(json_body(response).await["error"]
            .as_str()
            .is_some_and(|message| message.contains("W-4")));
        assert!(notices.try_recv().is_err());
    }
}
