use super::domain::{present, FilingStatus, PdfFieldAssignment, W4FormData};
use super::format::{format_slashed, normalize_ssn, upper_name};

/// Step 3 credit per qualifying child under 17.
pub const CHILD_CREDIT: u32 = 2000;
/// Step 3 credit per other dependent.
pub const OTHER_DEPENDENT_CREDIT: u32 = 500;

/// AcroForm field names of the 2024 IRS W-4 fillable template.
pub mod fields {
    pub const FIRST_NAME: &str = "topmostSubform[0].Page1[0].Step1a[0].f1_01[0]";
    pub const LAST_NAME: &str = "topmostSubform[0].Page1[0].Step1a[0].f1_02[0]";
    pub const ADDRESS: &str = "topmostSubform[0].Page1[0].Step1a[0].f1_03[0]";
    pub const CITY_STATE_ZIP: &str = "topmostSubform[0].Page1[0].Step1a[0].f1_04[0]";
    pub const SSN: &str = "topmostSubform[0].Page1[0].f1_05[0]";
    pub const SINGLE: &str = "topmostSubform[0].Page1[0].c1_1[0]";
    pub const MARRIED_FILING_JOINTLY: &str = "topmostSubform[0].Page1[0].c1_1[1]";
    pub const HEAD_OF_HOUSEHOLD: &str = "topmostSubform[0].Page1[0].c1_1[2]";
    pub const MULTIPLE_JOBS: &str = "topmostSubform[0].Page1[0].c1_2[0]";
    pub const CHILDREN_AMOUNT: &str = "topmostSubform[0].Page1[0].Step3_ReadOrder[0].f1_06[0]";
    pub const OTHER_DEPENDENTS_AMOUNT: &str =
        "topmostSubform[0].Page1[0].Step3_ReadOrder[0].f1_07[0]";
    pub const DEPENDENTS_TOTAL: &str = "topmostSubform[0].Page1[0].f1_08[0]";
    pub const OTHER_INCOME: &str = "topmostSubform[0].Page1[0].f1_09[0]";
    pub const DEDUCTIONS: &str = "topmostSubform[0].Page1[0].f1_10[0]";
    pub const EXTRA_WITHHOLDING: &str = "topmostSubform[0].Page1[0].f1_11[0]";
    pub const EXEMPT: &str = "topmostSubform[0].Page1[0].f1_11a[0]";
    pub const EMPLOYER_NAME_ADDRESS: &str = "topmostSubform[0].Page1[0].f1_12[0]";
    pub const FIRST_DATE_OF_EMPLOYMENT: &str = "topmostSubform[0].Page1[0].f1_13[0]";
    pub const EMPLOYER_EIN: &str = "topmostSubform[0].Page1[0].f1_14[0]";
}

impl FilingStatus {
    pub fn checkbox(&self) -> &'static str {
        match self {
            FilingStatus::Single => fields::SINGLE,
            FilingStatus::MarriedFilingJointly => fields::MARRIED_FILING_JOINTLY,
            FilingStatus::HeadOfHousehold => fields::HEAD_OF_HOUSEHOLD,
        }
    }
}

/// Maps W-4 elections onto the IRS template. Like the I-9 mapper it is total and pure.
pub fn map_w4(data: &W4FormData) -> Vec<PdfFieldAssignment> {
    let mut assignments = vec![
        PdfFieldAssignment::text(fields::FIRST_NAME, given_names(data)),
        PdfFieldAssignment::text(fields::LAST_NAME, upper_name(&data.last_name)),
        PdfFieldAssignment::text(fields::ADDRESS, street_line(data)),
        PdfFieldAssignment::text(fields::CITY_STATE_ZIP, locality_line(data)),
    ];

    if let Some(ssn) = present(&data.ssn) {
        assignments.push(PdfFieldAssignment::text(fields::SSN, normalize_ssn(ssn)));
    }

    assignments.push(PdfFieldAssignment::check(data.filing_status.checkbox()));
    if data.multiple_jobs {
        assignments.push(PdfFieldAssignment::check(fields::MULTIPLE_JOBS));
    }

    let children = data.qualifying_children.saturating_mul(CHILD_CREDIT);
    let others = data.other_dependents.saturating_mul(OTHER_DEPENDENT_CREDIT);
    push_amount(&mut assignments, fields::CHILDREN_AMOUNT, Some(children));
    push_amount(&mut assignments, fields::OTHER_DEPENDENTS_AMOUNT, Some(others));
    push_amount(
        &mut assignments,
        fields::DEPENDENTS_TOTAL,
        Some(children.saturating_add(others)),
    );

    push_amount(&mut assignments, fields::OTHER_INCOME, data.other_income);
    push_amount(&mut assignments, fields::DEDUCTIONS, data.deductions);
    push_amount(
        &mut assignments,
        fields::EXTRA_WITHHOLDING,
        data.extra_withholding,
    );
    if data.exempt {
        assignments.push(PdfFieldAssignment::text(fields::EXEMPT, "Exempt"));
    }

    if let Some(employer) = present(&data.employer_name_address) {
        assignments.push(PdfFieldAssignment::text(
            fields::EMPLOYER_NAME_ADDRESS,
            employer,
        ));
    }
    if let Some(started) = present(&data.first_date_of_employment) {
        assignments.push(PdfFieldAssignment::text(
            fields::FIRST_DATE_OF_EMPLOYMENT,
            format_slashed(started),
        ));
    }
    if let Some(ein) = present(&data.employer_ein) {
        assignments.push(PdfFieldAssignment::text(fields::EMPLOYER_EIN, ein));
    }

    assignments
}

fn given_names(data: &W4FormData) -> String {
    let first = upper_name(&data.first_name);
    let middle = upper_name(&data.middle_initial);
    if middle.is_empty() {
        first
    } else {
        format!("{first} {middle}")
    }
}

fn street_line(data: &W4FormData) -> String {
    if data.apt_number.is_empty() {
        data.address.clone()
    } else {
        format!("{} Apt {}", data.address, data.apt_number)
    }
}

fn locality_line(data: &W4FormData) -> String {
    let mut line = data.city.clone();
    if !data.state.is_empty() {
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(&data.state);
    }
    if !data.zip_code.is_empty() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&data.zip_code);
    }
    line
}

fn push_amount(assignments: &mut Vec<PdfFieldAssignment>, field: &str, amount: Option<u32>) {
    if let Some(amount) = amount.filter(|amount| *amount > 0) {
        assignments.push(PdfFieldAssignment::text(field, amount.to_string()));
    }
}
