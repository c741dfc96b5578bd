//! Structural schemas shared by the wizard steps and the submission route.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;

use super::domain::{
    is_known_nationality, Application, ApplicationType, ContactInfo, DocumentInfo,
    EmergencyContact, Gender, MaritalStatus, PersonalInfo,
};
use super::draft::{
    ApplicationPayload, ContactInfoDraft, DocumentInfoDraft, EmergencyContactDraft,
    PersonalInfoDraft,
};

const MIN_PHONE_LENGTH: usize = 8;

/// Field name -> message, for annotating every offending input at once.
pub type FieldErrors = BTreeMap<String, String>;

/// One failing field, addressed by its path within the validated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn field(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// Every issue found while validating a value, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", summarize(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path.join("."), issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Collapse issues to one message per field; the first issue for a field wins.
    ///
    /// Keys are bare field names, which is only unambiguous for a single section.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for issue in &self.issues {
            errors
                .entry(issue.field().to_string())
                .or_insert_with(|| issue.message.clone());
        }
        errors
    }

    /// Like [`Self::field_errors`], keyed by the dotted path (`contactInfo.phone`)
    /// so same-named fields from different sections stay apart.
    pub fn path_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for issue in &self.issues {
            errors
                .entry(issue.path.join("."))
                .or_insert_with(|| issue.message.clone());
        }
        errors
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field() == field)
    }
}

struct Collector {
    section: Option<&'static str>,
    issues: Vec<ValidationIssue>,
}

impl Collector {
    fn new(section: Option<&'static str>) -> Self {
        Self {
            section,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        let mut path = Vec::with_capacity(2);
        if let Some(section) = self.section {
            path.push(section.to_string());
        }
        path.push(field.to_string());
        self.issues.push(ValidationIssue {
            path,
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str, value: &Option<String>, message: &str) -> String {
        match present(value) {
            Some(value) => value,
            None => {
                self.push(field, message);
                String::new()
            }
        }
    }

    fn phone(&mut self, field: &str, value: &Option<String>) -> String {
        let phone = present(value).unwrap_or_default();
        if phone.chars().count() < MIN_PHONE_LENGTH {
            self.push(
                field,
                format!("Phone number must be at least {MIN_PHONE_LENGTH} characters"),
            );
        }
        phone
    }

    fn optional_email(&mut self, field: &str, value: &Option<String>) -> Option<String> {
        let email = present(value)?;
        if !is_valid_email(&email) {
            self.push(field, "Invalid email address");
        }
        Some(email)
    }

    fn conclude<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationErrors {
                issues: self.issues,
            }),
        }
    }
}

/// Trimmed value, with blank strings treated as absent.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

pub fn validate_personal_info(draft: &PersonalInfoDraft) -> Result<PersonalInfo, ValidationErrors> {
    let mut collector = Collector::new(None);
    let info = collect_personal_info(&mut collector, draft);
    collector.conclude(info)
}

pub fn validate_contact_info(draft: &ContactInfoDraft) -> Result<ContactInfo, ValidationErrors> {
    let mut collector = Collector::new(None);
    let info = collect_contact_info(&mut collector, draft);
    collector.conclude(Some(info))
}

pub fn validate_emergency_contact(
    draft: &EmergencyContactDraft,
) -> Result<EmergencyContact, ValidationErrors> {
    let mut collector = Collector::new(None);
    let contact = collect_emergency_contact(&mut collector, draft);
    collector.conclude(Some(contact))
}

pub fn validate_document_info(draft: &DocumentInfoDraft) -> Result<DocumentInfo, ValidationErrors> {
    let mut collector = Collector::new(None);
    let info = collect_document_info(&mut collector, draft);
    collector.conclude(info)
}

/// Terms must be explicitly accepted before an application can be submitted.
pub fn validate_terms(accepted: bool) -> Result<(), ValidationErrors> {
    let mut collector = Collector::new(None);
    check_terms(&mut collector, Some(accepted));
    collector.conclude(Some(()))
}

/// Validate a whole application, including the cross-section document rules that
/// the individual steps do not enforce.
pub fn validate_application(payload: &ApplicationPayload) -> Result<Application, ValidationErrors> {
    let mut root = Collector::new(None);
    let application_type = match payload.application_type.as_deref().map(str::trim) {
        Some("passport") => Some(ApplicationType::Passport),
        Some("id_card") => Some(ApplicationType::IdCard),
        Some(_) => {
            root.push("applicationType", "Application type must be passport or id_card");
            None
        }
        None => {
            root.push("applicationType", "Application type is required");
            None
        }
    };

    let mut personal = Collector::new(Some("personalInfo"));
    let personal_info = collect_personal_info(&mut personal, &payload.personal_info);

    let mut contact = Collector::new(Some("contactInfo"));
    let contact_info = collect_contact_info(&mut contact, &payload.contact_info);

    let mut emergency = Collector::new(Some("emergencyContact"));
    let emergency_contact = collect_emergency_contact(&mut emergency, &payload.emergency_contact);

    let mut documents = Collector::new(Some("documentInfo"));
    let document_info = collect_document_info(&mut documents, &payload.document_info);
    if let Some(info) = &document_info {
        check_document_consistency(&mut documents, info);
    }

    let mut terms = Collector::new(None);
    check_terms(&mut terms, payload.terms_accepted);

    let issues: Vec<ValidationIssue> = [root, personal, contact, emergency, documents, terms]
        .into_iter()
        .flat_map(|collector| collector.issues)
        .collect();

    match (application_type, personal_info, document_info) {
        (Some(application_type), Some(personal_info), Some(document_info)) if issues.is_empty() => {
            Ok(Application {
                application_type,
                personal_info,
                contact_info,
                emergency_contact,
                document_info,
                terms_accepted: true,
            })
        }
        _ => Err(ValidationErrors { issues }),
    }
}

fn collect_personal_info(
    collector: &mut Collector,
    draft: &PersonalInfoDraft,
) -> Option<PersonalInfo> {
    let first_name = collector.required("firstName", &draft.first_name, "First name is required");
    let last_name = collector.required("lastName", &draft.last_name, "Last name is required");
    let date_of_birth = collector.required(
        "dateOfBirth",
        &draft.date_of_birth,
        "Date of birth is required",
    );

    let gender = match present(&draft.gender) {
        Some(raw) => match Gender::from_str(&raw) {
            Ok(gender) => Some(gender),
            Err(()) => {
                collector.push("gender", "Gender must be male, female or other");
                None
            }
        },
        None => None,
    };

    let nationality = present(&draft.nationality).unwrap_or_default();
    if !is_known_nationality(&nationality) {
        collector.push("nationality", "Nationality is required");
    }

    let marital_status = match present(&draft.marital_status)
        .as_deref()
        .map(MaritalStatus::from_str)
    {
        Some(Ok(status)) => Some(status),
        _ => {
            collector.push(
                "maritalStatus",
                "Marital status must be single, married, divorced or widowed",
            );
            None
        }
    };

    Some(PersonalInfo {
        first_name,
        middle_name: present(&draft.middle_name),
        last_name,
        date_of_birth,
        id_number: present(&draft.id_number),
        place_of_birth: present(&draft.place_of_birth),
        gender,
        nationality,
        marital_status: marital_status?,
    })
}

fn collect_contact_info(collector: &mut Collector, draft: &ContactInfoDraft) -> ContactInfo {
    let email = collector.optional_email("email", &draft.email);
    let phone = collector.phone("phone", &draft.phone);
    let current_address = collector.required(
        "currentAddress",
        &draft.current_address,
        "Current address is required",
    );
    let city = collector.required("city", &draft.city, "City is required");

    ContactInfo {
        email,
        phone,
        alternate_phone: present(&draft.alternate_phone),
        current_address,
        city,
        state: present(&draft.state),
        postal_code: present(&draft.postal_code),
        country: present(&draft.country),
    }
}

fn collect_emergency_contact(
    collector: &mut Collector,
    draft: &EmergencyContactDraft,
) -> EmergencyContact {
    let name = collector.required("name", &draft.name, "Emergency contact name is required");
    let relationship = collector.required(
        "relationship",
        &draft.relationship,
        "Relationship is required",
    );
    let phone = collector.phone("phone", &draft.phone);
    let email = collector.optional_email("email", &draft.email);

    EmergencyContact {
        name,
        relationship,
        phone,
        email,
    }
}

fn collect_document_info(
    collector: &mut Collector,
    draft: &DocumentInfoDraft,
) -> Option<DocumentInfo> {
    if draft.has_existing_passport.is_none() {
        collector.push("hasExistingPassport", "Required");
    }
    if draft.has_national_id.is_none() {
        collector.push("hasNationalId", "Required");
    }

    Some(DocumentInfo {
        has_existing_passport: draft.has_existing_passport?,
        existing_passport_number: present(&draft.existing_passport_number),
        existing_passport_expiry: present(&draft.existing_passport_expiry),
        has_national_id: draft.has_national_id?,
        id_type: present(&draft.id_type),
        id_number: present(&draft.id_number),
    })
}

fn check_document_consistency(collector: &mut Collector, info: &DocumentInfo) {
    if info.has_existing_passport && info.existing_passport_number.is_none() {
        collector.push(
            "existingPassportNumber",
            "Existing passport number is required when a passport is held",
        );
    }
    if info.has_national_id && info.id_number.is_none() {
        collector.push(
            "idNumber",
            "National ID number is required when an ID is held",
        );
    }
}

fn check_terms(collector: &mut Collector, accepted: Option<bool>) {
    if accepted != Some(true) {
        collector.push("termsAccepted", "You must accept the terms and conditions");
    }
}
