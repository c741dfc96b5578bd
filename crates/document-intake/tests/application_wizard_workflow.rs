//! Integration specifications for the document application wizard and its store.
//!
//! Scenarios drive the public wizard, service and router together the way a deployment
//! wires them, so the authoring flow and the HTTP surface are checked against one store.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use document_intake::config::IntakeConfig;
    use document_intake::workflows::intake::{
        ApplicationRepository, ApplicationService, ApplicationStatus, ContactInfoDraft,
        DocumentInfoDraft, EmergencyContactDraft, PersonalInfoDraft, ReferenceNumber,
        RepositoryError, ReviewPatch, StepUpdate, StoredApplication, WizardController,
    };

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    pub(super) fn personal_info() -> PersonalInfoDraft {
        PersonalInfoDraft {
            first_name: text("Hamad"),
            last_name: text("Al-Kuwari"),
            date_of_birth: text("1984-11-02"),
            place_of_birth: text("Al Khor"),
            gender: text("male"),
            nationality: text("qatari"),
            marital_status: text("married"),
            ..PersonalInfoDraft::default()
        }
    }

    pub(super) fn contact_info() -> ContactInfoDraft {
        ContactInfoDraft {
            email: text("hamad@example.qa"),
            phone: text("+97455501234"),
            current_address: text("Villa 7, Al Waab"),
            city: text("doha"),
            country: text("Qatar"),
            ..ContactInfoDraft::default()
        }
    }

    pub(super) fn emergency_contact() -> EmergencyContactDraft {
        EmergencyContactDraft {
            name: text("Noora Al-Kuwari"),
            relationship: text("spouse"),
            phone: text("+97455509876"),
            email: text("noora@example.qa"),
        }
    }

    pub(super) fn national_id() -> DocumentInfoDraft {
        DocumentInfoDraft {
            has_existing_passport: Some(false),
            has_national_id: Some(true),
            id_type: text("qid"),
            id_number: text("28463400123"),
            ..DocumentInfoDraft::default()
        }
    }

    /// Wizard with every section filled, still on step 1.
    pub(super) fn completed_wizard() -> WizardController {
        let mut wizard = WizardController::new();
        for update in [
            StepUpdate::PersonalInfo(personal_info()),
            StepUpdate::ContactInfo(contact_info()),
            StepUpdate::EmergencyContact(emergency_contact()),
            StepUpdate::Documents(national_id()),
            StepUpdate::Review(ReviewPatch {
                terms_accepted: Some(true),
                signature: None,
            }),
        ] {
            wizard.update_step_data(update).expect("draft accepts updates");
        }
        wizard
    }

    /// Plain map-backed store standing in for a deployment-specific repository.
    #[derive(Default, Clone)]
    pub(super) struct MapRepository {
        records: Arc<Mutex<HashMap<ReferenceNumber, StoredApplication>>>,
    }

    impl MapRepository {
        pub(super) fn len(&self) -> usize {
            self.records.lock().expect("lock").len()
        }
    }

    impl ApplicationRepository for MapRepository {
        fn insert(&self, record: StoredApplication) -> Result<StoredApplication, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&record.reference_number) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(record.reference_number.clone(), record.clone());
            Ok(record)
        }

        fn fetch(
            &self,
            reference: &ReferenceNumber,
        ) -> Result<Option<StoredApplication>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(reference).cloned())
        }

        fn update_status(
            &self,
            reference: &ReferenceNumber,
            status: ApplicationStatus,
        ) -> Result<Option<StoredApplication>, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            Ok(guard.get_mut(reference).map(|record| {
                record.status = status;
                record.clone()
            }))
        }
    }

    pub(super) fn build_service() -> (Arc<ApplicationService<MapRepository>>, Arc<MapRepository>) {
        let repository = Arc::new(MapRepository::default());
        let config = IntakeConfig {
            reference_prefix: "QID".to_string(),
            ..IntakeConfig::default()
        };
        let service = Arc::new(ApplicationService::new(repository.clone(), &config));
        (service, repository)
    }
}

mod wizard_flow {
    use super::common::*;
    use document_intake::workflows::intake::{
        ApplicationType, InProcessGateway, SelectionPatch, StepUpdate, WizardStep,
    };

    #[test]
    fn applicant_walks_every_step_in_order() {
        let mut wizard = completed_wizard();
        wizard
            .update_step_data(StepUpdate::Selection(SelectionPatch {
                application_type: Some(ApplicationType::IdCard),
                ..SelectionPatch::default()
            }))
            .expect("selection stored");

        let mut visited = vec![wizard.current_step()];
        while wizard.current_step() != WizardStep::LAST {
            visited.push(wizard.advance().expect("step valid"));
        }

        assert_eq!(visited, WizardStep::ALL.to_vec());
        assert_eq!(wizard.progress().completed_steps, vec![1, 2, 3, 4, 5]);
        assert_eq!(wizard.fee_quote().total, 50);
    }

    #[tokio::test]
    async fn submission_is_stored_under_the_configured_prefix() {
        let (service, repository) = build_service();
        let gateway = InProcessGateway::new(service.clone());
        let mut wizard = completed_wizard();

        let reference = wizard.submit(&gateway).await.expect("submitted");

        assert!(reference.as_str().starts_with("QID-"));
        let stored = service.get(&reference).expect("stored");
        assert_eq!(stored.document_info.id_number.as_deref(), Some("28463400123"));
        assert!(stored.document_info.has_national_id);
        assert_eq!(stored.emergency_contact.relationship, "spouse");
        assert_eq!(repository.len(), 1);
    }
}

mod http_surface {
    use super::common::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use document_intake::workflows::intake::{application_router, InProcessGateway};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn wizard_submission_is_visible_over_http() {
        let (service, _) = build_service();
        let router = application_router(service.clone());
        let mut wizard = completed_wizard();
        let reference = wizard
            .submit(&InProcessGateway::new(service))
            .await
            .expect("submitted");

        let response = router
            .clone()
            .oneshot(
                Request::get(format!("/api/applications/{reference}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["contactInfo"]["email"], "hamad@example.qa");
        assert_eq!(body["status"], "submitted");

        let response = router
            .oneshot(
                Request::patch(format!("/api/applications/{reference}/status"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "status": "processing" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["application"]["status"], "processing");
        assert_eq!(body["application"]["paymentStatus"], "pending");
    }

    #[tokio::test]
    async fn http_submission_validates_like_the_wizard() {
        let (service, repository) = build_service();
        let router = application_router(service);
        let mut payload = serde_json::to_value(completed_wizard().draft().to_payload())
            .expect("payload json");
        payload["documentInfo"]["idNumber"] = Value::Null;

        let response = router
            .oneshot(
                Request::post("/api/applications")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["details"][0]["path"], json!(["documentInfo", "idNumber"]));
        assert_eq!(repository.len(), 0);
    }
}
