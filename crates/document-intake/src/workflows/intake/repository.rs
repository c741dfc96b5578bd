use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationType, ContactInfo, DocumentInfo,
    EmergencyContact, PaymentStatus, PersonalInfo, ReferenceNumber,
};

/// Persisted application: identity and applicant data are frozen, status fields move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredApplication {
    pub id: ApplicationId,
    pub reference_number: ReferenceNumber,
    pub application_type: ApplicationType,
    pub personal_info: PersonalInfo,
    pub contact_info: ContactInfo,
    pub emergency_contact: EmergencyContact,
    pub document_info: DocumentInfo,
    pub terms_accepted: bool,
    pub status: ApplicationStatus,
    pub payment_status: PaymentStatus,
    pub submitted_at: DateTime<Utc>,
}

impl StoredApplication {
    /// Freeze a validated application into a freshly submitted record.
    pub fn submitted(
        application: Application,
        reference_number: ReferenceNumber,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ApplicationId::new(),
            reference_number,
            application_type: application.application_type,
            personal_info: application.personal_info,
            contact_info: application.contact_info,
            emergency_contact: application.emergency_contact,
            document_info: application.document_info,
            terms_accepted: application.terms_accepted,
            status: ApplicationStatus::Submitted,
            payment_status: PaymentStatus::Pending,
            submitted_at,
        }
    }

    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            reference_number: self.reference_number.clone(),
            status: self.status,
        }
    }
}

/// What the applicant gets back from a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub reference_number: ReferenceNumber,
    pub status: ApplicationStatus,
}

/// Storage abstraction keyed by reference number.
///
/// `insert` must reject a record whose reference number or id is already taken,
/// atomically with respect to concurrent inserts.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError>;
    fn fetch(
        &self,
        reference: &ReferenceNumber,
    ) -> Result<Option<StoredApplication>, RepositoryError>;
    /// Replace only the status; `Ok(None)` when the reference is unknown.
    fn update_status(
        &self,
        reference: &ReferenceNumber,
        status: ApplicationStatus,
    ) -> Result<Option<StoredApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct Records {
    by_reference: HashMap<ReferenceNumber, StoredApplication>,
    ids: HashSet<ApplicationId>,
}

/// Process-lifetime store backing the service when no durable database is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<Records>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.by_reference.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.by_reference.contains_key(&record.reference_number)
            || guard.ids.contains(&record.id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.ids.insert(record.id);
        guard
            .by_reference
            .insert(record.reference_number.clone(), record.clone());
        Ok(record)
    }

    fn fetch(
        &self,
        reference: &ReferenceNumber,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.by_reference.get(reference).cloned())
    }

    fn update_status(
        &self,
        reference: &ReferenceNumber,
        status: ApplicationStatus,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        let mut guard = self.lock()?;
        Ok(guard.by_reference.get_mut(reference).map(|record| {
            record.status = status;
            record.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::{Gender, MaritalStatus};
    use chrono::Utc;
    use std::thread;

    fn record(reference: &str) -> StoredApplication {
        let application = Application {
            application_type: ApplicationType::IdCard,
            personal_info: PersonalInfo {
                first_name: "Aisha".to_string(),
                middle_name: None,
                last_name: "Al-Thani".to_string(),
                date_of_birth: "1988-02-20".to_string(),
                id_number: None,
                place_of_birth: None,
                gender: Some(Gender::Female),
                nationality: "qatari".to_string(),
                marital_status: MaritalStatus::Married,
            },
            contact_info: ContactInfo {
                email: None,
                phone: "55501111".to_string(),
                alternate_phone: None,
                current_address: "Zone 66".to_string(),
                city: "doha".to_string(),
                state: None,
                postal_code: None,
                country: None,
            },
            emergency_contact: EmergencyContact {
                name: "Fahad Al-Thani".to_string(),
                relationship: "spouse".to_string(),
                phone: "55502222".to_string(),
                email: None,
            },
            document_info: DocumentInfo {
                has_existing_passport: false,
                existing_passport_number: None,
                existing_passport_expiry: None,
                has_national_id: false,
                id_type: None,
                id_number: None,
            },
            terms_accepted: true,
        };
        StoredApplication::submitted(
            application,
            ReferenceNumber(reference.to_string()),
            Utc::now(),
        )
    }

    #[test]
    fn insert_rejects_reused_id_under_a_new_reference() {
        let repository = InMemoryApplicationRepository::default();
        let first = repository.insert(record("APP-ONE")).expect("stored");

        let mut clash = record("APP-TWO");
        clash.id = first.id;
        assert!(matches!(
            repository.insert(clash),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repository.insert(record("APP-ONE")),
            Err(RepositoryError::Conflict)
        ));

        repository.insert(record("APP-TWO")).expect("fresh id stored");
        assert_eq!(repository.len().expect("readable"), 2);
    }

    #[test]
    fn poisoned_lock_reports_unavailable() {
        let repository = InMemoryApplicationRepository::default();
        let shared = repository.clone();
        let _ = thread::spawn(move || {
            let _guard = shared.records.lock().expect("first lock");
            panic!("writer crashed while holding the lock");
        })
        .join();

        assert!(matches!(
            repository.len(),
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(matches!(
            repository.is_empty(),
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(matches!(
            repository.insert(record("APP-ONE")),
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
