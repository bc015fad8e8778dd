use chrono::NaiveDate;
use hotel_onboard::forms::{FormNotice, NotifyError, OnboardingNotifier};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Notices buffered per subscriber before the slowest one starts losing the oldest.
pub(crate) const NOTICE_CAPACITY: usize = 64;

/// Fans notices out to whoever is listening (the live-badge bridge). With nobody subscribed
/// a notice is dropped, so nothing accumulates between connections.
#[derive(Clone)]
pub(crate) struct BroadcastNotifier {
    sender: broadcast::Sender<FormNotice>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(NOTICE_CAPACITY)
    }
}

impl BroadcastNotifier {
    pub(crate) fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<FormNotice> {
        self.sender.subscribe()
    }
}

impl OnboardingNotifier for BroadcastNotifier {
    fn publish(&self, notice: FormNotice) -> Result<(), NotifyError> {
        let template = notice.template.clone();
        match self.sender.send(notice) {
            Ok(listeners) => debug!(%template, listeners, "onboarding notice sent"),
            Err(_) => debug!(%template, "no listeners; onboarding notice dropped"),
        }
        Ok(())
    }
}

/// Drains a subscription into the log until the notifier goes away.
pub(crate) async fn relay_notices(mut receiver: broadcast::Receiver<FormNotice>) {
    loop {
        match receiver.recv().await {
            Ok(notice) => info!(
                template = %notice.template,
                form = notice.form.label(),
                subject = %notice.subject,
                "onboarding notice"
            ),
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "notice relay fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
