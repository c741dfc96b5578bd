//! Partially-filled application sections.
//!
//! Every field is optional so a section can be filled field by field; the same
//! shapes double as patches (`merge` copies only the fields a patch sets) and
//! as the lenient wire payload accepted by the submission route, which lets
//! schema validation report missing fields instead of failing deserialization.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationType, ServiceOptions};

macro_rules! merge_fields {
    ($target:expr, $patch:expr, $($field:ident),+ $(,)?) => {
        $(
            if $patch.$field.is_some() {
                $target.$field = $patch.$field;
            }
        )+
    };
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
}

impl PersonalInfoDraft {
    pub fn merge(&mut self, patch: PersonalInfoDraft) {
        merge_fields!(
            self,
            patch,
            first_name,
            middle_name,
            last_name,
            date_of_birth,
            id_number,
            place_of_birth,
            gender,
            nationality,
            marital_status,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ContactInfoDraft {
    pub fn merge(&mut self, patch: ContactInfoDraft) {
        merge_fields!(
            self,
            patch,
            email,
            phone,
            alternate_phone,
            current_address,
            city,
            state,
            postal_code,
            country,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmergencyContactDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl EmergencyContactDraft {
    pub fn merge(&mut self, patch: EmergencyContactDraft) {
        merge_fields!(self, patch, name, relationship, phone, email);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentInfoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_existing_passport: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_passport_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_passport_expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_national_id: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_number: Option<String>,
}

impl DocumentInfoDraft {
    /// Section state of a fresh wizard: both document toggles start switched off.
    pub fn unset_toggles() -> Self {
        Self {
            has_existing_passport: Some(false),
            has_national_id: Some(false),
            ..Self::default()
        }
    }

    pub fn merge(&mut self, patch: DocumentInfoDraft) {
        merge_fields!(
            self,
            patch,
            has_existing_passport,
            existing_passport_number,
            existing_passport_expiry,
            has_national_id,
            id_type,
            id_number,
        );
    }
}

/// Opaque signature image captured on the review step (typically a data URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureBlob(pub String);

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub application_type: ApplicationType,
    pub service_options: ServiceOptions,
    pub personal_info: PersonalInfoDraft,
    pub contact_info: ContactInfoDraft,
    pub emergency_contact: EmergencyContactDraft,
    pub document_info: DocumentInfoDraft,
    pub terms_accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureBlob>,
}

impl Default for ApplicationDraft {
    fn default() -> Self {
        Self {
            application_type: ApplicationType::default(),
            service_options: ServiceOptions::default(),
            personal_info: PersonalInfoDraft::default(),
            contact_info: ContactInfoDraft::default(),
            emergency_contact: EmergencyContactDraft::default(),
            document_info: DocumentInfoDraft::unset_toggles(),
            terms_accepted: false,
            signature: None,
        }
    }
}

impl ApplicationDraft {
    /// The payload sent on final submission. The signature stays with the draft.
    pub fn to_payload(&self) -> ApplicationPayload {
        ApplicationPayload {
            application_type: Some(self.application_type.label().to_string()),
            personal_info: self.personal_info.clone(),
            contact_info: self.contact_info.clone(),
            emergency_contact: self.emergency_contact.clone(),
            document_info: self.document_info.clone(),
            terms_accepted: Some(self.terms_accepted),
        }
    }
}

/// Full application body as received over the wire, prior to schema validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_type: Option<String>,
    pub personal_info: PersonalInfoDraft,
    pub contact_info: ContactInfoDraft,
    pub emergency_contact: EmergencyContactDraft,
    pub document_info: DocumentInfoDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_accepted: Option<bool>,
}
