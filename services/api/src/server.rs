use crate::cli::ServeArgs;
use crate::infra::{relay_notices, AppState, BroadcastNotifier};
use crate::routes::with_onboarding_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hotel_onboard::config::AppConfig;
use hotel_onboard::error::AppError;
use hotel_onboard::forms::{FormGenerator, FormKind};
use hotel_onboard::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let templates = config.forms.template_source();
    for kind in [FormKind::I9, FormKind::W4] {
        let path = templates.path_for(kind);
        if !path.is_file() {
            warn!(
                form = kind.label(),
                path = %path.display(),
                "template missing; requests for this form will fail"
            );
        }
    }

    let notifier = BroadcastNotifier::default();
    tokio::spawn(relay_notices(notifier.subscribe()));

    let generator = Arc::new(FormGenerator::new(
        Arc::new(templates),
        Arc::new(notifier),
        config.forms.render_options(),
    ));

    let app = with_onboarding_routes(generator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        template_dir = %config.forms.template_dir.display(),
        lock_fields = config.forms.lock_fields,
        "onboarding forms service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
