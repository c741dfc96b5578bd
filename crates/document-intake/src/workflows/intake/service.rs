use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{Application, ApplicationStatus, ReferenceNumber};
use super::draft::ApplicationPayload;
use super::reference::{ReferenceIssuer, ReferenceNumberGenerator};
use super::repository::{ApplicationRepository, RepositoryError, StoredApplication};
use super::validation::{validate_application, ValidationErrors};
use crate::config::IntakeConfig;

/// Service composing schema validation, reference allocation and the repository.
pub struct ApplicationService<R> {
    repository: Arc<R>,
    issuer: Arc<dyn ReferenceIssuer>,
    reference_attempts: u8,
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &IntakeConfig) -> Self {
        let issuer = Arc::new(ReferenceNumberGenerator::new(
            config.reference_prefix.clone(),
        ));
        Self::with_issuer(repository, issuer, config.reference_attempts)
    }

    pub fn with_issuer(
        repository: Arc<R>,
        issuer: Arc<dyn ReferenceIssuer>,
        reference_attempts: u8,
    ) -> Self {
        Self {
            repository,
            issuer,
            reference_attempts: reference_attempts.max(1),
        }
    }

    /// Validate a raw payload end to end and store it.
    pub fn submit(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<StoredApplication, ApplicationServiceError> {
        let application = validate_application(payload).map_err(|errors| {
            warn!(
                issues = errors.issues.len(),
                "application payload failed validation"
            );
            errors
        })?;
        self.create(application)
    }

    /// Store an already-validated application under a freshly allocated reference number.
    ///
    /// A reference collision is retried with a new candidate; nothing is stored
    /// when every attempt collides.
    pub fn create(
        &self,
        application: Application,
    ) -> Result<StoredApplication, ApplicationServiceError> {
        for attempt in 1..=self.reference_attempts {
            let submitted_at = Utc::now();
            let reference = self.issuer.issue(submitted_at);
            let record =
                StoredApplication::submitted(application.clone(), reference, submitted_at);

            match self.repository.insert(record) {
                Ok(stored) => {
                    info!(
                        reference = %stored.reference_number,
                        application_type = stored.application_type.label(),
                        "application submitted"
                    );
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(attempt, "reference number collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ApplicationServiceError::ReferenceExhausted {
            attempts: self.reference_attempts,
        })
    }

    pub fn get(
        &self,
        reference: &ReferenceNumber,
    ) -> Result<StoredApplication, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(reference)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Move an application to any status. No transition graph is enforced.
    pub fn update_status(
        &self,
        reference: &ReferenceNumber,
        status: ApplicationStatus,
    ) -> Result<StoredApplication, ApplicationServiceError> {
        let record = self
            .repository
            .update_status(reference, status)?
            .ok_or(RepositoryError::NotFound)?;
        info!(reference = %record.reference_number, %status, "application status updated");
        Ok(record)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("could not allocate a unique reference number after {attempts} attempts")]
    ReferenceExhausted { attempts: u8 },
}
