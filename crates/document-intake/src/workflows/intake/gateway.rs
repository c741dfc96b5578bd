use std::sync::Arc;

use async_trait::async_trait;

use super::draft::ApplicationPayload;
use super::repository::{ApplicationRepository, SubmissionReceipt};
use super::service::{ApplicationService, ApplicationServiceError};
use super::validation::ValidationErrors;

/// Seam between the wizard and whatever stores the final application.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: &ApplicationPayload)
        -> Result<SubmissionReceipt, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The store refused the payload on schema grounds.
    #[error("application rejected: {0}")]
    Rejected(ValidationErrors),
    #[error("submission failed: {0}")]
    Transport(String),
}

impl From<ApplicationServiceError> for GatewayError {
    fn from(value: ApplicationServiceError) -> Self {
        match value {
            ApplicationServiceError::Validation(errors) => Self::Rejected(errors),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Gateway that calls the application service directly, for single-process deployments.
pub struct InProcessGateway<R> {
    service: Arc<ApplicationService<R>>,
}

impl<R> InProcessGateway<R> {
    pub fn new(service: Arc<ApplicationService<R>>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<R> SubmissionGateway for InProcessGateway<R>
where
    R: ApplicationRepository + 'static,
{
    async fn submit(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<SubmissionReceipt, GatewayError> {
        let record = self.service.submit(payload)?;
        Ok(record.receipt())
    }
}
