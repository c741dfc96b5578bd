use clap::{Args, ValueEnum};
use document_intake::config::AppConfig;
use document_intake::error::AppError;
use document_intake::workflows::intake::{
    ApplicationService, ApplicationType, ContactInfoDraft, DocumentInfoDraft,
    EmergencyContactDraft, InMemoryApplicationRepository, InProcessGateway, PersonalInfoDraft,
    RequestMode, ReviewPatch, SelectionPatch, StepUpdate, SubmitError, WizardController,
    WizardStep,
};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum DemoDocument {
    #[default]
    Passport,
    IdCard,
}

impl From<DemoDocument> for ApplicationType {
    fn from(value: DemoDocument) -> Self {
        match value {
            DemoDocument::Passport => ApplicationType::Passport,
            DemoDocument::IdCard => ApplicationType::IdCard,
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Document to apply for.
    #[arg(long, value_enum, default_value_t = DemoDocument::Passport)]
    pub(crate) document: DemoDocument,
    /// Apply as a renewal instead of a first issue.
    #[arg(long)]
    pub(crate) renew: bool,
    /// Request express delivery.
    #[arg(long)]
    pub(crate) express: bool,
    /// Leave the terms unaccepted to show the review step refusing to submit.
    #[arg(long)]
    pub(crate) decline_terms: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let service = Arc::new(ApplicationService::new(repository, &config.intake));
    let gateway = InProcessGateway::new(service.clone());

    println!("Document application demo (applicant details redacted)");
    let mut wizard = WizardController::new();
    for update in sample_updates(&args) {
        wizard.update_step_data(update)?;
    }

    let quote = wizard.fee_quote();
    println!(
        "- Fee quote: {} {} base + {} express = {} {}",
        quote.base_amount, quote.currency, quote.express_fee, quote.total, quote.currency
    );
    println!("  Payment is completed later with the external payment processor.");

    while wizard.current_step() != WizardStep::LAST {
        let from = wizard.current_step();
        match wizard.advance() {
            Ok(to) => println!("- Step {from} -> {to}"),
            Err(errors) => {
                println!("- Step {from} blocked:");
                for (field, message) in errors {
                    println!("    {field}: {message}");
                }
                return Ok(());
            }
        }
    }

    let reference = match wizard.submit(&gateway).await {
        Ok(reference) => reference,
        Err(SubmitError::Invalid(errors)) => {
            println!("- Review step refused to submit:");
            for (field, message) in errors {
                println!("    {field}: {message}");
            }
            return Ok(());
        }
        Err(err) => {
            println!("- Submission failed: {err}");
            return Ok(());
        }
    };
    println!("- Application submitted, reference number {reference}");

    let record = service.get(&reference)?;
    println!(
        "  Stored as {} | status {} | payment {:?}",
        record.application_type.label(),
        record.status,
        record.payment_status
    );
    let progress = wizard.progress();
    println!(
        "  Completed steps {:?} of {}",
        progress.completed_steps, progress.total_steps
    );

    Ok(())
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn sample_updates(args: &DemoArgs) -> Vec<StepUpdate> {
    let request_mode = if args.renew {
        RequestMode::Renew
    } else {
        RequestMode::New
    };

    vec![
        StepUpdate::Selection(SelectionPatch {
            application_type: Some(args.document.into()),
            request_mode: Some(request_mode),
            express_delivery: Some(args.express),
        }),
        StepUpdate::PersonalInfo(PersonalInfoDraft {
            first_name: text("Sample"),
            last_name: text("Applicant"),
            date_of_birth: text("1992-06-15"),
            place_of_birth: text("Doha"),
            gender: text("female"),
            nationality: text("qatari"),
            marital_status: text("single"),
            ..PersonalInfoDraft::default()
        }),
        StepUpdate::ContactInfo(ContactInfoDraft {
            email: text("applicant@example.qa"),
            phone: text("+97455500000"),
            current_address: text("Redacted"),
            city: text("doha"),
            country: text("Qatar"),
            ..ContactInfoDraft::default()
        }),
        StepUpdate::EmergencyContact(EmergencyContactDraft {
            name: text("Redacted"),
            relationship: text("sibling"),
            phone: text("+97455500001"),
            email: None,
        }),
        StepUpdate::Documents(DocumentInfoDraft {
            has_existing_passport: Some(args.renew),
            existing_passport_number: args.renew.then(|| "P0000000".to_string()),
            has_national_id: Some(false),
            ..DocumentInfoDraft::default()
        }),
        StepUpdate::Review(ReviewPatch {
            terms_accepted: Some(!args.decline_terms),
            signature: None,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wizard_for(args: &DemoArgs) -> WizardController {
        let mut wizard = WizardController::new();
        for update in sample_updates(args) {
            wizard.update_step_data(update).expect("update accepted");
        }
        wizard
    }

    #[test]
    fn sample_data_passes_every_blocking_step() {
        let args = DemoArgs::default();
        let wizard = wizard_for(&args);

        for step in WizardStep::ALL {
            assert!(wizard.validate_step(step).is_ok(), "step {step} failed");
        }
    }

    #[test]
    fn renewal_with_express_is_quoted_accordingly() {
        let args = DemoArgs {
            renew: true,
            express: true,
            ..DemoArgs::default()
        };
        let quote = wizard_for(&args).fee_quote();

        assert_eq!(quote.total, 200);
    }

    #[tokio::test]
    async fn declined_terms_block_submission() {
        let args = DemoArgs {
            decline_terms: true,
            ..DemoArgs::default()
        };
        let mut wizard = wizard_for(&args);
        let service = Arc::new(ApplicationService::new(
            Arc::new(InMemoryApplicationRepository::default()),
            &Default::default(),
        ));

        let outcome = wizard.submit(&InProcessGateway::new(service)).await;

        assert!(matches!(outcome, Err(SubmitError::Invalid(_))));
    }
}
