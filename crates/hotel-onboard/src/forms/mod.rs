//! Onboarding form generation: field mapping for the I-9 and W-4 templates, the PDF renderer
//! that writes those fields, and the service/HTTP layers that tie them together.

pub mod domain;
pub mod envelope;
pub mod format;
pub mod i9;
pub mod notify;
pub mod render;
pub mod router;
pub mod service;
pub mod template;
pub mod w4;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantFormData, CitizenshipStatus, FieldOperation, FilingStatus, FormKind,
    PdfFieldAssignment, W4FormData,
};
pub use envelope::ApiEnvelope;
pub use i9::map_i9;
pub use notify::{FormNotice, NotifyError, OnboardingNotifier, SilentNotifier};
pub use render::{FieldError, PdfTemplate, RenderError, RenderOptions, RenderReport, SkippedField};
pub use router::onboarding_router;
pub use service::{FormError, FormGenerator, GeneratedForm};
pub use template::{DirectoryTemplateSource, StaticTemplateSource, TemplateError, TemplateSource};
pub use w4::map_w4;
