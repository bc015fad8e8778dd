use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::FormKind;

/// Outbound hook the live-badge layer subscribes to (WebSocket fan-out lives outside this crate).
pub trait OnboardingNotifier: Send + Sync {
    fn publish(&self, notice: FormNotice) -> Result<(), NotifyError>;
}

/// Payload announcing that an onboarding document was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormNotice {
    pub template: String,
    pub form: FormKind,
    pub subject: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Notifier for deployments without a live channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl OnboardingNotifier for SilentNotifier {
    fn publish(&self, _notice: FormNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}
