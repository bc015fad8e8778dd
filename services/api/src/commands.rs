use crate::infra::parse_date;
use chrono::{Local, NaiveDate};
use clap::Args;
use hotel_onboard::config::AppConfig;
use hotel_onboard::error::AppError;
use hotel_onboard::forms::{
    map_i9, map_w4, ApiEnvelope, ApplicantFormData, FormError, FormGenerator, FormKind,
    GeneratedForm, PdfFieldAssignment, PdfTemplate, RenderOptions, SilentNotifier,
    StaticTemplateSource, TemplateSource, W4FormData,
};
use hotel_onboard::telemetry;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct FillArgs {
    /// JSON file holding the employee's form data (bare or wrapped in "data")
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the filled PDF
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Blank template to fill (defaults to the configured template directory)
    #[arg(long)]
    pub(crate) template: Option<PathBuf>,
    /// Signature date written on the I-9 (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Mark filled fields read-only
    #[arg(long)]
    pub(crate) lock: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FieldsArgs {
    /// JSON file holding the employee's form data (bare or wrapped in "data")
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Signature date written on the I-9 (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Blank template to inspect
    #[arg(long)]
    pub(crate) template: PathBuf,
}

pub(crate) fn run_i9_fill(args: FillArgs) -> Result<(), AppError> {
    telemetry::init_cli()?;
    let data: ApplicantFormData = read_record(&args.input)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    let generator = cli_generator(FormKind::I9, args.template.as_deref(), args.lock)?;
    let form = generator.generate_i9_on(&data, today)?;
    write_form(&form, &args.output)
}

pub(crate) fn run_w4_fill(args: FillArgs) -> Result<(), AppError> {
    telemetry::init_cli()?;
    let data: W4FormData = read_record(&args.input)?;

    let generator = cli_generator(FormKind::W4, args.template.as_deref(), args.lock)?;
    let form = generator.generate_w4(&data)?;
    write_form(&form, &args.output)
}

pub(crate) fn run_i9_fields(args: FieldsArgs) -> Result<(), AppError> {
    let data: ApplicantFormData = read_record(&args.input)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    print_assignments(&map_i9(&data, today))
}

pub(crate) fn run_w4_fields(args: FieldsArgs) -> Result<(), AppError> {
    let data: W4FormData = read_record(&args.input)?;
    print_assignments(&map_w4(&data))
}

pub(crate) fn inspect_template(args: InspectArgs) -> Result<(), AppError> {
    let bytes = std::fs::read(&args.template)?;
    let template = PdfTemplate::load(&bytes)?;
    let names = template.field_names();

    println!("{} ({} fields)", args.template.display(), names.len());
    for name in names {
        println!("- {name}");
    }
    Ok(())
}

pub(crate) fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read(path)?;
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&raw)?;
    Ok(envelope.into_inner())
}

fn cli_generator(
    kind: FormKind,
    template: Option<&Path>,
    lock: bool,
) -> Result<FormGenerator<StaticTemplateSource, SilentNotifier>, AppError> {
    let config = AppConfig::load()?;
    let bytes = match template {
        Some(path) => std::fs::read(path)?,
        None => config
            .forms
            .template_source()
            .fetch(kind)
            .map_err(FormError::from)?,
    };

    let options = RenderOptions {
        lock_fields: lock || config.forms.lock_fields,
    };
    Ok(FormGenerator::new(
        Arc::new(StaticTemplateSource::default().with_template(kind, bytes)),
        Arc::new(SilentNotifier),
        options,
    ))
}

fn write_form(form: &GeneratedForm, output: &Path) -> Result<(), AppError> {
    std::fs::write(output, &form.bytes)?;

    println!(
        "Wrote {} {} ({} fields filled, {} skipped)",
        form.kind.label(),
        output.display(),
        form.report.applied.len(),
        form.report.skipped.len()
    );
    for skipped in &form.report.skipped {
        println!("- skipped {}: {}", skipped.field, skipped.reason);
    }
    Ok(())
}

fn print_assignments(assignments: &[PdfFieldAssignment]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(assignments)?;
    println!("{json}");
    Ok(())
}
