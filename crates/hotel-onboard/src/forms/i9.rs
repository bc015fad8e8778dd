use chrono::NaiveDate;

use super::domain::{present, ApplicantFormData, CitizenshipStatus, PdfFieldAssignment};
use super::format::{format_mmddyyyy, mmddyyyy, normalize_phone, normalize_ssn, upper_name};

/// AcroForm field names of the I-9 (Section 1) template. These must match the template
/// revision byte for byte.
pub mod fields {
    pub const LAST_NAME: &str = "Last Name (Family Name)";
    pub const FIRST_NAME: &str = "First Name Given Name";
    pub const MIDDLE_INITIAL: &str = "Employee Middle Initial (if any)";
    pub const OTHER_LAST_NAMES: &str = "Employee Other Last Names Used (if any)";
    pub const ADDRESS: &str = "Address Street Number and Name";
    pub const APT_NUMBER: &str = "Apt Number (if any)";
    pub const CITY: &str = "City or Town";
    pub const STATE: &str = "State";
    pub const ZIP_CODE: &str = "ZIP Code";
    pub const DATE_OF_BIRTH: &str = "Date of Birth mmddyyyy";
    pub const SSN: &str = "US Social Security Number";
    pub const EMAIL: &str = "Employees E-mail Address";
    pub const PHONE: &str = "Telephone Number";
    pub const TODAY: &str = "Today's Date mmddyyyy";
    pub const PERMANENT_RESIDENT_NUMBER: &str =
        "3 A lawful permanent resident Enter USCIS or ANumber";
    pub const ALIEN_NUMBER: &str = "USCIS ANumber";
    pub const EXPIRATION_DATE: &str = "Exp Date mmddyyyy";
    pub const I94_ADMISSION_NUMBER: &str = "Form I94 Admission Number";
    pub const FOREIGN_PASSPORT: &str = "Foreign Passport Number and Country of IssuanceRow1";
}

/// Maps I-9 Section 1 input onto the template's fields.
///
/// Never fails: absent optional values are omitted, name and address parts are always written
/// (possibly as empty strings) and exactly one citizenship checkbox is checked.
pub fn map_i9(data: &ApplicantFormData, today: NaiveDate) -> Vec<PdfFieldAssignment> {
    let mut assignments = vec![
        PdfFieldAssignment::text(fields::LAST_NAME, upper_name(&data.last_name)),
        PdfFieldAssignment::text(fields::FIRST_NAME, upper_name(&data.first_name)),
        PdfFieldAssignment::text(fields::MIDDLE_INITIAL, upper_name(&data.middle_initial)),
        PdfFieldAssignment::text(fields::OTHER_LAST_NAMES, upper_name(&data.other_last_names)),
        PdfFieldAssignment::text(fields::ADDRESS, data.address.as_str()),
        PdfFieldAssignment::text(fields::APT_NUMBER, data.apt_number.as_str()),
        PdfFieldAssignment::text(fields::CITY, data.city.as_str()),
    ];

    if let Some(state) = present(&data.state) {
        assignments.push(PdfFieldAssignment::select(fields::STATE, state));
    }
    assignments.push(PdfFieldAssignment::text(fields::ZIP_CODE, data.zip_code.as_str()));

    if let Some(dob) = present(&data.date_of_birth) {
        assignments.push(PdfFieldAssignment::text(fields::DATE_OF_BIRTH, format_mmddyyyy(dob)));
    }
    if let Some(ssn) = present(&data.ssn) {
        assignments.push(PdfFieldAssignment::text(fields::SSN, normalize_ssn(ssn)));
    }
    if let Some(email) = present(&data.email) {
        assignments.push(PdfFieldAssignment::text(fields::EMAIL, email));
    }
    if let Some(phone) = present(&data.phone) {
        assignments.push(PdfFieldAssignment::text(fields::PHONE, normalize_phone(phone)));
    }

    assignments.push(PdfFieldAssignment::check(data.citizenship_status.checkbox()));
    assignments.extend(attestation_details(data));

    assignments.push(PdfFieldAssignment::text(fields::TODAY, mmddyyyy(today)));
    assignments
}

fn attestation_details(data: &ApplicantFormData) -> Vec<PdfFieldAssignment> {
    let mut details = Vec::new();

    match data.citizenship_status {
        CitizenshipStatus::Citizen | CitizenshipStatus::National => {}
        CitizenshipStatus::PermanentResident => {
            if let Some(number) = present(&data.alien_number) {
                details.push(PdfFieldAssignment::text(fields::PERMANENT_RESIDENT_NUMBER, number));
            }
        }
        CitizenshipStatus::AuthorizedAlien => {
            if let Some(expires) = present(&data.expiration_date) {
                details.push(PdfFieldAssignment::text(
                    fields::EXPIRATION_DATE,
                    format_mmddyyyy(expires),
                ));
            }
            if let Some(number) = present(&data.alien_number) {
                details.push(PdfFieldAssignment::text(fields::ALIEN_NUMBER, number));
            }
            if let Some(admission) = present(&data.i94_admission_number) {
                details.push(PdfFieldAssignment::text(fields::I94_ADMISSION_NUMBER, admission));
            }
            if let (Some(passport), Some(country)) = (
                present(&data.foreign_passport_number),
                present(&data.country_of_issuance),
            ) {
                details.push(PdfFieldAssignment::text(
                    fields::FOREIGN_PASSPORT,
                    format!("{passport} {country}"),
                ));
            }
        }
    }

    details
}
