use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nationality codes accepted on the personal information step.
pub const NATIONALITIES: &[&str] = &[
    "saudi",
    "emirati",
    "kuwaiti",
    "qatari",
    "bahraini",
    "omani",
    "egyptian",
    "jordanian",
    "palestinian",
    "iraqi",
    "syrian",
    "lebanese",
    "yemeni",
    "sudanese",
    "libyan",
    "moroccan",
    "tunisian",
    "algerian",
    "mauritanian",
    "somali",
    "djiboutian",
    "comorian",
    "nigerian",
    "ghanaian",
    "ethiopian",
    "kenyan",
    "tanzanian",
    "ugandan",
    "south_african",
    "zimbabwean",
    "british",
    "french",
    "german",
    "italian",
    "spanish",
    "portuguese",
    "dutch",
    "belgian",
    "swiss",
    "austrian",
    "swedish",
    "norwegian",
    "danish",
    "finnish",
    "polish",
    "ukrainian",
    "russian",
    "greek",
    "turkish",
    "indian",
    "pakistani",
    "bangladeshi",
    "afghan",
    "iranian",
    "chinese",
    "japanese",
    "korean",
    "thai",
    "malaysian",
    "indonesian",
    "philippine",
    "nepali",
    "sri_lankan",
    "american",
    "canadian",
    "mexican",
    "brazilian",
    "argentinian",
    "chilean",
    "colombian",
    "peruvian",
    "australian",
    "new_zealander",
];

pub fn is_known_nationality(code: &str) -> bool {
    NATIONALITIES.contains(&code)
}

/// Document the applicant is requesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    #[default]
    Passport,
    IdCard,
}

impl ApplicationType {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationType::Passport => "passport",
            ApplicationType::IdCard => "id_card",
        }
    }
}

/// Whether the applicant wants a first issue or a renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    #[default]
    New,
    Renew,
}

/// Choices made on the type-selection step alongside the document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOptions {
    pub request_mode: RequestMode,
    pub express_delivery: bool,
}

pub const FEE_CURRENCY: &str = "QAR";
const PASSPORT_NEW_FEE: u32 = 150;
const PASSPORT_RENEWAL_FEE: u32 = 100;
const ID_CARD_FEE: u32 = 50;
const EXPRESS_DELIVERY_FEE: u32 = 100;

/// Informational price for the selected service. Payment itself happens out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeQuote {
    pub base_amount: u32,
    pub express_fee: u32,
    pub total: u32,
    pub currency: &'static str,
}

impl FeeQuote {
    pub fn for_selection(application_type: ApplicationType, options: ServiceOptions) -> Self {
        let base_amount = match (application_type, options.request_mode) {
            (ApplicationType::Passport, RequestMode::New) => PASSPORT_NEW_FEE,
            (ApplicationType::Passport, RequestMode::Renew) => PASSPORT_RENEWAL_FEE,
            (ApplicationType::IdCard, _) => ID_CARD_FEE,
        };
        let express_fee = if options.express_delivery {
            EXPRESS_DELIVERY_FEE
        } else {
            0
        };

        Self {
            base_amount,
            express_fee,
            total: base_amount + express_fee,
            currency: FEE_CURRENCY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl FromStr for MaritalStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "single" => Ok(Self::Single),
            "married" => Ok(Self::Married),
            "divorced" => Ok(Self::Divorced),
            "widowed" => Ok(Self::Widowed),
            _ => Err(()),
        }
    }
}

/// Validated personal details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub nationality: String,
    pub marital_status: MaritalStatus,
}

/// Validated contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
    pub current_address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Existing travel and identity documents held by the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub has_existing_passport: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_passport_expiry: Option<String>,
    pub has_national_id: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

/// A complete application that passed every schema, including the terms check.
///
/// Only produced by [`super::validation::validate_application`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_type: ApplicationType,
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    pub emergency_contact: EmergencyContact,
    pub document_info: DocumentInfo,
    pub terms_accepted: bool,
}

/// Public tracking handle issued on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceNumber(pub String);

impl ReferenceNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal identifier of a stored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing status of a stored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Processing,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Draft,
        ApplicationStatus::Submitted,
        ApplicationStatus::Processing,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Processing => "processing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|status| status.label()).collect()
    }
}

impl FromStr for ApplicationStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or(())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}
