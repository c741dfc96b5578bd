//! Document application intake: the authoring wizard, shared schemas, and the
//! reference-keyed application store with its HTTP surface.

pub mod domain;
pub mod draft;
pub mod gateway;
pub mod reference;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationType, ContactInfo, DocumentInfo,
    EmergencyContact, FeeQuote, Gender, MaritalStatus, PaymentStatus, PersonalInfo,
    ReferenceNumber, RequestMode, ServiceOptions,
};
pub use draft::{
    ApplicationDraft, ApplicationPayload, ContactInfoDraft, DocumentInfoDraft,
    EmergencyContactDraft, PersonalInfoDraft, SignatureBlob,
};
pub use gateway::{GatewayError, InProcessGateway, SubmissionGateway};
pub use reference::{ReferenceIssuer, ReferenceNumberGenerator};
pub use repository::{
    ApplicationRepository, InMemoryApplicationRepository, RepositoryError, StoredApplication,
    SubmissionReceipt,
};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
pub use validation::{FieldErrors, ValidationErrors, ValidationIssue};
pub use wizard::{
    PendingSubmission, ReviewPatch, SelectionPatch, StepUpdate, SubmitError, WizardController,
    WizardError, WizardProgress, WizardStep,
};
