//! Step-by-step authoring of an application.
//!
//! The controller owns the draft for the whole authoring session. Field updates
//! are merged without validation; each step's schema runs only when the applicant
//! moves forward. Submission is split into [`WizardController::begin_submission`]
//! and [`WizardController::finish_submission`] so that the presentation layer
//! keeps handling events while the request is outstanding, and
//! [`WizardController::submit`] composes the two for callers that just await.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{ApplicationType, FeeQuote, ReferenceNumber, RequestMode};
use super::draft::{
    ApplicationDraft, ApplicationPayload, ContactInfoDraft, DocumentInfoDraft,
    EmergencyContactDraft, PersonalInfoDraft, SignatureBlob,
};
use super::gateway::{GatewayError, SubmissionGateway};
use super::repository::SubmissionReceipt;
use super::validation::{
    validate_contact_info, validate_emergency_contact, validate_personal_info, validate_terms,
    FieldErrors, ValidationErrors,
};

/// The fixed sequence of wizard steps, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    ApplicationType,
    PersonalInfo,
    ContactInfo,
    EmergencyContact,
    Documents,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::ApplicationType,
        WizardStep::PersonalInfo,
        WizardStep::ContactInfo,
        WizardStep::EmergencyContact,
        WizardStep::Documents,
        WizardStep::Review,
    ];

    pub const FIRST: WizardStep = WizardStep::ApplicationType;
    pub const LAST: WizardStep = WizardStep::Review;

    pub const fn number(self) -> u8 {
        match self {
            WizardStep::ApplicationType => 1,
            WizardStep::PersonalInfo => 2,
            WizardStep::ContactInfo => 3,
            WizardStep::EmergencyContact => 4,
            WizardStep::Documents => 5,
            WizardStep::Review => 6,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            WizardStep::ApplicationType => "Application type",
            WizardStep::PersonalInfo => "Personal information",
            WizardStep::ContactInfo => "Contact information",
            WizardStep::EmergencyContact => "Emergency contact",
            WizardStep::Documents => "Documents",
            WizardStep::Review => "Review and submit",
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::FIRST)
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = WizardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(WizardError::UnknownStep(value))
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.title())
    }
}

/// Choices on the type-selection step; unset fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    pub application_type: Option<ApplicationType>,
    pub request_mode: Option<RequestMode>,
    pub express_delivery: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub terms_accepted: Option<bool>,
    pub signature: Option<SignatureBlob>,
}

/// Partial data for exactly one step's slice of the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepUpdate {
    Selection(SelectionPatch),
    PersonalInfo(PersonalInfoDraft),
    ContactInfo(ContactInfoDraft),
    EmergencyContact(EmergencyContactDraft),
    Documents(DocumentInfoDraft),
    Review(ReviewPatch),
}

impl StepUpdate {
    pub fn step(&self) -> WizardStep {
        match self {
            StepUpdate::Selection(_) => WizardStep::ApplicationType,
            StepUpdate::PersonalInfo(_) => WizardStep::PersonalInfo,
            StepUpdate::ContactInfo(_) => WizardStep::ContactInfo,
            StepUpdate::EmergencyContact(_) => WizardStep::EmergencyContact,
            StepUpdate::Documents(_) => WizardStep::Documents,
            StepUpdate::Review(_) => WizardStep::Review,
        }
    }
}

/// Snapshot for rendering a progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardProgress {
    pub current_step: u8,
    pub completed_steps: Vec<u8>,
    pub total_steps: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("step {0} does not exist")]
    UnknownStep(u8),
    #[error("application was already submitted as {0}; the draft is read-only")]
    Submitted(ReferenceNumber),
    #[error("the draft cannot change while a submission is in flight")]
    SubmissionInFlight,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("application was already submitted as {0}")]
    AlreadySubmitted(ReferenceNumber),
    #[error("a submission is already in flight")]
    InFlight,
    #[error("application is incomplete: {0:?}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Rejected(ValidationErrors),
    #[error("submission failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Editing,
    Submitted(ReferenceNumber),
}

/// Clears the shared in-flight flag when dropped, including on cancellation.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An accepted submit request. Dropping it abandons the attempt and re-enables submission.
#[derive(Debug)]
pub struct PendingSubmission {
    payload: ApplicationPayload,
    _guard: InFlightGuard,
}

impl PendingSubmission {
    pub fn payload(&self) -> &ApplicationPayload {
        &self.payload
    }
}

/// Multi-step form state machine with per-step validation.
#[derive(Debug)]
pub struct WizardController {
    current_step: WizardStep,
    completed_steps: BTreeSet<WizardStep>,
    draft: ApplicationDraft,
    field_errors: FieldErrors,
    dirty: bool,
    phase: Phase,
    in_flight: Arc<AtomicBool>,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::FIRST,
            completed_steps: BTreeSet::new(),
            draft: ApplicationDraft::default(),
            field_errors: FieldErrors::new(),
            dirty: false,
            phase: Phase::Editing,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn completed_steps(&self) -> &BTreeSet<WizardStep> {
        &self.completed_steps
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    /// Errors from the most recent failed transition on the active step.
    ///
    /// Step checks key by field name. A rejected submission spans every section,
    /// so its errors key by dotted path (`emergencyContact.phone`).
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn reference_number(&self) -> Option<&ReferenceNumber> {
        match &self.phase {
            Phase::Submitted(reference) => Some(reference),
            Phase::Editing => None,
        }
    }

    pub fn fee_quote(&self) -> FeeQuote {
        FeeQuote::for_selection(self.draft.application_type, self.draft.service_options)
    }

    pub fn progress(&self) -> WizardProgress {
        WizardProgress {
            current_step: self.current_step.number(),
            completed_steps: self.completed_steps.iter().map(|step| step.number()).collect(),
            total_steps: WizardStep::LAST.number(),
        }
    }

    /// Merge partial data into the step's slice of the draft. Nothing is validated here.
    pub fn update_step_data(&mut self, update: StepUpdate) -> Result<(), WizardError> {
        if let Phase::Submitted(reference) = &self.phase {
            return Err(WizardError::Submitted(reference.clone()));
        }
        if self.is_submitting() {
            return Err(WizardError::SubmissionInFlight);
        }

        match update {
            StepUpdate::Selection(patch) => {
                if let Some(application_type) = patch.application_type {
                    self.draft.application_type = application_type;
                }
                if let Some(request_mode) = patch.request_mode {
                    self.draft.service_options.request_mode = request_mode;
                }
                if let Some(express_delivery) = patch.express_delivery {
                    self.draft.service_options.express_delivery = express_delivery;
                }
            }
            StepUpdate::PersonalInfo(patch) => self.draft.personal_info.merge(patch),
            StepUpdate::ContactInfo(patch) => self.draft.contact_info.merge(patch),
            StepUpdate::EmergencyContact(patch) => self.draft.emergency_contact.merge(patch),
            StepUpdate::Documents(patch) => self.draft.document_info.merge(patch),
            StepUpdate::Review(patch) => {
                if let Some(accepted) = patch.terms_accepted {
                    self.draft.terms_accepted = accepted;
                }
                if patch.signature.is_some() {
                    self.draft.signature = patch.signature;
                }
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Run the step's schema against the current draft. Reports every failing field.
    pub fn validate_step(&self, step: WizardStep) -> Result<(), FieldErrors> {
        let outcome = match step {
            WizardStep::PersonalInfo => validate_personal_info(&self.draft.personal_info).map(drop),
            WizardStep::ContactInfo => validate_contact_info(&self.draft.contact_info).map(drop),
            WizardStep::EmergencyContact => {
                validate_emergency_contact(&self.draft.emergency_contact).map(drop)
            }
            WizardStep::Review => validate_terms(self.draft.terms_accepted),
            WizardStep::ApplicationType | WizardStep::Documents => Ok(()),
        };
        outcome.map_err(|errors| errors.field_errors())
    }

    /// Validate the active step and move forward one step, stopping at the last one.
    pub fn advance(&mut self) -> Result<WizardStep, FieldErrors> {
        let step = self.current_step;
        match self.validate_step(step) {
            Ok(()) => {
                self.field_errors.clear();
                self.completed_steps.insert(step);
                self.current_step = step.next();
                debug!(from = step.number(), to = self.current_step.number(), "wizard advanced");
                Ok(self.current_step)
            }
            Err(errors) => {
                debug!(step = step.number(), failing = errors.len(), "wizard step invalid");
                self.field_errors = errors.clone();
                Err(errors)
            }
        }
    }

    pub fn retreat(&mut self) -> WizardStep {
        self.current_step = self.current_step.previous();
        self.field_errors.clear();
        self.current_step
    }

    /// Go straight to any step, e.g. from an "edit" link on the review summary.
    pub fn jump_to_step(&mut self, step: WizardStep) {
        self.current_step = step;
        self.field_errors.clear();
    }

    /// Check the terms and hand out the payload to send. At most one can be outstanding.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitError> {
        if let Phase::Submitted(reference) = &self.phase {
            return Err(SubmitError::AlreadySubmitted(reference.clone()));
        }
        let guard = InFlightGuard::acquire(&self.in_flight).ok_or(SubmitError::InFlight)?;

        if let Err(errors) = self.validate_step(WizardStep::LAST) {
            self.field_errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }
        self.field_errors.clear();

        Ok(PendingSubmission {
            payload: self.draft.to_payload(),
            _guard: guard,
        })
    }

    /// Record the gateway's answer. The draft is kept on every failure.
    pub fn finish_submission(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<SubmissionReceipt, GatewayError>,
    ) -> Result<ReferenceNumber, SubmitError> {
        drop(pending);

        match outcome {
            Ok(receipt) => {
                info!(reference = %receipt.reference_number, "wizard submission accepted");
                self.completed_steps.insert(WizardStep::LAST);
                self.phase = Phase::Submitted(receipt.reference_number.clone());
                self.dirty = false;
                Ok(receipt.reference_number)
            }
            Err(GatewayError::Rejected(errors)) => {
                warn!(issues = errors.issues.len(), "wizard submission rejected");
                self.field_errors = errors.path_errors();
                Err(SubmitError::Rejected(errors))
            }
            Err(GatewayError::Transport(message)) => {
                warn!(%message, "wizard submission failed");
                Err(SubmitError::Transport(message))
            }
        }
    }

    /// Submit the draft through `gateway` and return the issued reference number.
    ///
    /// Dropping the returned future before it resolves leaves the draft untouched
    /// and allows a later retry.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<ReferenceNumber, SubmitError>
    where
        G: SubmissionGateway + ?Sized,
    {
        let pending = self.begin_submission()?;
        let outcome = gateway.submit(pending.payload()).await;
        self.finish_submission(pending, outcome)
    }
}
