use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::domain::{ApplicantFormData, FormKind, PdfFieldAssignment, W4FormData};
use super::i9::map_i9;
use super::notify::{FormNotice, OnboardingNotifier};
use super::render::{PdfTemplate, RenderError, RenderOptions, RenderReport};
use super::template::{TemplateError, TemplateSource};
use super::w4::map_w4;

/// A filled form ready for download.
#[derive(Debug, Clone)]
pub struct GeneratedForm {
    pub kind: FormKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

/// Runs the load template, map, fill, serialize chain for onboarding forms.
///
/// Everything the pipeline needs is handed in at construction; nothing is cached between calls.
pub struct FormGenerator<S, N> {
    templates: Arc<S>,
    notifier: Arc<N>,
    options: RenderOptions,
}

impl<S, N> FormGenerator<S, N>
where
    S: TemplateSource + 'static,
    N: OnboardingNotifier + 'static,
{
    pub fn new(templates: Arc<S>, notifier: Arc<N>, options: RenderOptions) -> Self {
        Self {
            templates,
            notifier,
            options,
        }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Fill the I-9 dated today.
    pub fn generate_i9(&self, data: &ApplicantFormData) -> Result<GeneratedForm, FormError> {
        self.generate_i9_on(data, Local::now().date_naive())
    }

    pub fn generate_i9_on(
        &self,
        data: &ApplicantFormData,
        today: NaiveDate,
    ) -> Result<GeneratedForm, FormError> {
        let assignments = map_i9(data, today);
        let subject = data.display_name();
        self.generate(
            FormKind::I9,
            &assignments,
            &subject,
            file_name(FormKind::I9, &data.last_name),
        )
    }

    pub fn generate_w4(&self, data: &W4FormData) -> Result<GeneratedForm, FormError> {
        let assignments = map_w4(data);
        let subject = data.display_name();
        self.generate(
            FormKind::W4,
            &assignments,
            &subject,
            file_name(FormKind::W4, &data.last_name),
        )
    }

    fn generate(
        &self,
        kind: FormKind,
        assignments: &[PdfFieldAssignment],
        subject: &str,
        file_name: String,
    ) -> Result<GeneratedForm, FormError> {
        let bytes = self.templates.fetch(kind)?;
        let mut template = PdfTemplate::load(&bytes)?;
        let report = template.apply(assignments, &self.options);
        let bytes = template.save()?;

        info!(
            form = kind.label(),
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "generated onboarding form"
        );

        let mut details = BTreeMap::new();
        details.insert("file_name".to_string(), file_name.clone());
        details.insert("skipped_fields".to_string(), report.skipped.len().to_string());
        if let Err(err) = self.notifier.publish(FormNotice {
            template: format!("{}_generated", kind.slug()),
            form: kind,
            subject: subject.to_string(),
            details,
        }) {
            warn!(form = kind.label(), error = %err, "form notice not delivered");
        }

        Ok(GeneratedForm {
            kind,
            file_name,
            bytes,
            report,
        })
    }
}

fn file_name(kind: FormKind, last_name: &str) -> String {
    let slug: String = last_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase();
    if slug.is_empty() {
        format!("{}-form.pdf", kind.slug())
    } else {
        format!("{}-{slug}.pdf", kind.slug())
    }
}

/// Error raised when a form cannot be produced at all.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Render(#[from] RenderError),
}
