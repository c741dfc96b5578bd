use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::IntakeConfig;
use crate::workflows::intake::domain::{ApplicationStatus, ReferenceNumber};
use crate::workflows::intake::draft::{
    ApplicationPayload, ContactInfoDraft, DocumentInfoDraft, EmergencyContactDraft,
    PersonalInfoDraft,
};
use crate::workflows::intake::gateway::{GatewayError, SubmissionGateway};
use crate::workflows::intake::reference::ReferenceIssuer;
use crate::workflows::intake::repository::{
    ApplicationRepository, InMemoryApplicationRepository, RepositoryError, StoredApplication,
    SubmissionReceipt,
};
use crate::workflows::intake::service::ApplicationService;
use crate::workflows::intake::wizard::{ReviewPatch, StepUpdate, WizardController};

pub(super) fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub(super) fn personal_info() -> PersonalInfoDraft {
    PersonalInfoDraft {
        first_name: text("Mariam"),
        middle_name: text("Khalid"),
        last_name: text("Al-Sulaiti"),
        date_of_birth: text("1990-04-12"),
        place_of_birth: text("Doha"),
        gender: text("female"),
        nationality: text("qatari"),
        marital_status: text("single"),
        ..PersonalInfoDraft::default()
    }
}

pub(super) fn contact_info() -> ContactInfoDraft {
    ContactInfoDraft {
        email: text("mariam@example.qa"),
        phone: text("55512345"),
        current_address: text("Building 12, Street 340"),
        city: text("doha"),
        country: text("Qatar"),
        ..ContactInfoDraft::default()
    }
}

pub(super) fn emergency_contact() -> EmergencyContactDraft {
    EmergencyContactDraft {
        name: text("Khalid Al-Sulaiti"),
        relationship: text("parent"),
        phone: text("55598765"),
        email: None,
    }
}

pub(super) fn no_documents() -> DocumentInfoDraft {
    DocumentInfoDraft {
        has_existing_passport: Some(false),
        has_national_id: Some(false),
        ..DocumentInfoDraft::default()
    }
}

pub(super) fn payload() -> ApplicationPayload {
    ApplicationPayload {
        application_type: text("passport"),
        personal_info: personal_info(),
        contact_info: contact_info(),
        emergency_contact: emergency_contact(),
        document_info: no_documents(),
        terms_accepted: Some(true),
    }
}

/// Wizard holding a complete draft, positioned on the first step.
pub(super) fn filled_wizard(terms_accepted: bool) -> WizardController {
    let mut wizard = WizardController::new();
    for update in [
        StepUpdate::PersonalInfo(personal_info()),
        StepUpdate::ContactInfo(contact_info()),
        StepUpdate::EmergencyContact(emergency_contact()),
        StepUpdate::Documents(no_documents()),
        StepUpdate::Review(ReviewPatch {
            terms_accepted: Some(terms_accepted),
            signature: None,
        }),
    ] {
        wizard.update_step_data(update).expect("draft accepts updates");
    }
    wizard
}

pub(super) fn build_service() -> (
    ApplicationService<InMemoryApplicationRepository>,
    Arc<InMemoryApplicationRepository>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = ApplicationService::new(repository.clone(), &IntakeConfig::default());
    (service, repository)
}

/// Issues the same reference every time, to force collisions.
pub(super) struct FixedIssuer(pub(super) &'static str);

impl ReferenceIssuer for FixedIssuer {
    fn issue(&self, _issued_at: DateTime<Utc>) -> ReferenceNumber {
        ReferenceNumber(self.0.to_string())
    }
}

/// Issues the queued references in order, then repeats the last one.
pub(super) struct SequenceIssuer {
    references: Mutex<Vec<&'static str>>,
}

impl SequenceIssuer {
    pub(super) fn new(references: &[&'static str]) -> Self {
        let mut references = references.to_vec();
        references.reverse();
        Self {
            references: Mutex::new(references),
        }
    }
}

impl ReferenceIssuer for SequenceIssuer {
    fn issue(&self, _issued_at: DateTime<Utc>) -> ReferenceNumber {
        let mut guard = self.references.lock().expect("issuer mutex poisoned");
        let next = if guard.len() > 1 {
            guard.pop()
        } else {
            guard.last().copied()
        };
        ReferenceNumber(next.unwrap_or("APP-EMPTY").to_string())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _reference: &ReferenceNumber,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_status(
        &self,
        _reference: &ReferenceNumber,
        _status: ApplicationStatus,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Records every payload and answers with a fixed receipt.
#[derive(Default)]
pub(super) struct RecordingGateway {
    pub(super) payloads: Mutex<Vec<ApplicationPayload>>,
}

impl RecordingGateway {
    pub(super) fn calls(&self) -> usize {
        self.payloads.lock().expect("gateway mutex poisoned").len()
    }
}

#[async_trait]
impl SubmissionGateway for RecordingGateway {
    async fn submit(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        self.payloads
            .lock()
            .expect("gateway mutex poisoned")
            .push(payload.clone());
        Ok(SubmissionReceipt {
            reference_number: ReferenceNumber("APP-RECORDED1".to_string()),
            status: ApplicationStatus::Submitted,
        })
    }
}

pub(super) struct OfflineGateway;

#[async_trait]
impl SubmissionGateway for OfflineGateway {
    async fn submit(
        &self,
        _payload: &ApplicationPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        Err(GatewayError::Transport("connection reset".to_string()))
    }
}

/// Never answers, standing in for a request the applicant navigates away from.
pub(super) struct StalledGateway;

#[async_trait]
impl SubmissionGateway for StalledGateway {
    async fn submit(
        &self,
        _payload: &ApplicationPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        std::future::pending().await
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
