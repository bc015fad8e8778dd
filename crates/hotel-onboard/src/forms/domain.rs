use serde::{Deserialize, Serialize};

/// Government onboarding forms the service knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    I9,
    W4,
}

impl FormKind {
    pub fn label(&self) -> &'static str {
        match self {
            FormKind::I9 => "I-9",
            FormKind::W4 => "W-4",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            FormKind::I9 => "i9",
            FormKind::W4 => "w4",
        }
    }

    pub fn default_template_file(&self) -> &'static str {
        match self {
            FormKind::I9 => "i9-form-template.pdf",
            FormKind::W4 => "w4-form-template.pdf",
        }
    }
}

/// Attestation an employee selects in I-9 Section 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenshipStatus {
    Citizen,
    National,
    PermanentResident,
    AuthorizedAlien,
}

impl CitizenshipStatus {
    /// Name of the I-9 checkbox that carries this attestation.
    pub fn checkbox(&self) -> &'static str {
        match self {
            CitizenshipStatus::Citizen => "CB_1",
            CitizenshipStatus::National => "CB_2",
            CitizenshipStatus::PermanentResident => "CB_3",
            CitizenshipStatus::AuthorizedAlien => "CB_4",
        }
    }
}

/// Employee input collected by the onboarding I-9 screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantFormData {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub middle_initial: String,
    #[serde(default)]
    pub other_last_names: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apt_number: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub ssn: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub citizenship_status: CitizenshipStatus,
    /// USCIS number or Alien Registration Number.
    #[serde(default)]
    pub alien_number: Option<String>,
    #[serde(default)]
    pub i94_admission_number: Option<String>,
    #[serde(default)]
    pub foreign_passport_number: Option<String>,
    #[serde(default)]
    pub country_of_issuance: Option<String>,
    /// Date work authorization expires, for authorized aliens.
    #[serde(default)]
    pub expiration_date: Option<String>,
}

impl ApplicantFormData {
    pub fn new(citizenship_status: CitizenshipStatus) -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            middle_initial: String::new(),
            other_last_names: String::new(),
            address: String::new(),
            apt_number: String::new(),
            city: String::new(),
            state: None,
            zip_code: String::new(),
            date_of_birth: None,
            ssn: None,
            email: None,
            phone: None,
            citizenship_status,
            alien_number: None,
            i94_admission_number: None,
            foreign_passport_number: None,
            country_of_issuance: None,
            expiration_date: None,
        }
    }

    /// Human readable subject for notices and download names.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

/// Federal filing status from W-4 Step 1(c).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedFilingJointly,
    HeadOfHousehold,
}

/// Employee withholding elections collected by the onboarding W-4 screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct W4FormData {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub address: String,
    pub apt_number: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub ssn: Option<String>,
    pub filing_status: FilingStatus,
    pub multiple_jobs: bool,
    pub qualifying_children: u32,
    pub other_dependents: u32,
    pub other_income: Option<u32>,
    pub deductions: Option<u32>,
    pub extra_withholding: Option<u32>,
    pub exempt: bool,
    pub employer_name_address: Option<String>,
    pub first_date_of_employment: Option<String>,
    pub employer_ein: Option<String>,
}

impl W4FormData {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name)
    }
}

fn display_name(first: &str, last: &str) -> String {
    match (first.trim(), last.trim()) {
        ("", "") => "unnamed employee".to_string(),
        (first, "") => first.to_string(),
        ("", last) => last.to_string(),
        (first, last) => format!("{first} {last}"),
    }
}

/// Write operation a renderer performs on a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOperation {
    SetText,
    Select,
    Check,
}

/// One instruction for a named field of a fillable PDF template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfFieldAssignment {
    pub field: String,
    pub operation: FieldOperation,
    pub value: String,
}

impl PdfFieldAssignment {
    pub fn text(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: FieldOperation::SetText,
            value: value.into(),
        }
    }

    pub fn select(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: FieldOperation::Select,
            value: value.into(),
        }
    }

    pub fn check(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operation: FieldOperation::Check,
            value: String::new(),
        }
    }
}

/// Returns the value only when the applicant actually supplied one.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}
