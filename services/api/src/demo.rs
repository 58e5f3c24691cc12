use crate::infra::{build_workflow, DEMO_ADMIN, DEMO_INTERVIEWER};
use chrono::{Duration, Utc};
use clap::Args;
use pawtrack::config::WorkflowConfig;
use pawtrack::error::AppError;
use pawtrack::workflows::adoption::{
    ApplicantRegistration, ApplicationSubmission, ContractRequest, IdentityContext,
    InterviewRequest, PublicListing,
};
use serde::Serialize;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print single-line JSON payloads instead of pretty-printed ones.
    #[arg(long)]
    pub(crate) compact: bool,
    /// Days from now until the adoption interview.
    #[arg(long, default_value_t = 3)]
    pub(crate) interview_in_days: i64,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        compact,
        interview_in_days,
    } = args;

    let workflow = build_workflow(WorkflowConfig {
        seed_demo_data: true,
        ..WorkflowConfig::default()
    })?;
    let admin = IdentityContext::admin(DEMO_ADMIN);
    let interviewer = IdentityContext::interviewer(DEMO_INTERVIEWER);

    println!("Shelter adoption demo");
    let listed = workflow.list_public_animals(PublicListing::Available)?;
    println!("\nAvailable animals");
    for animal in &listed {
        println!(
            "- {} {} ({})",
            animal.unique_id, animal.profile.name, animal.profile.species
        );
    }
    let Some(animal) = listed.first() else {
        println!("No animals available; nothing to adopt");
        return Ok(());
    };
    let animal_id = animal.unique_id.clone();

    let applicant = workflow.register_applicant(
        None,
        ApplicantRegistration {
            first_name: "Jordan".to_string(),
            last_name: "Rivera".to_string(),
            email: "jordan@mail.example".to_string(),
            phone_number: Some("555-0142".to_string()),
            interview_language: Some("English".to_string()),
            home_address: None,
            city: Some("Springfield".to_string()),
            province: None,
            zip_code: None,
        },
    )?;
    let applicant_identity = IdentityContext::applicant(applicant.id);
    println!(
        "\nRegistered applicant {} {} (#{})",
        applicant.first_name, applicant.last_name, applicant.id.0
    );

    let application = workflow.submit_application(
        None,
        ApplicationSubmission {
            animal_id: animal_id.clone(),
            applicant_id: applicant.id,
            answers: serde_json::json!({
                "home": "house with fenced yard",
                "other_pets": "none",
            }),
        },
    )?;
    println!(
        "- Application #{} for {} -> {:?}",
        application.application.id.0, animal_id, application.application.status
    );

    let interview = workflow.schedule_interview(
        Some(&interviewer),
        InterviewRequest {
            application_id: application.application.id,
            volunteer_id: DEMO_INTERVIEWER,
            applicant_id: applicant.id,
            interview_time: Utc::now() + Duration::days(interview_in_days),
        },
    )?;
    println!(
        "- Interview #{} with {} at {}",
        interview.interview.id.0,
        interview.interview.volunteer_name,
        interview.interview.interview_time.format("%Y-%m-%d %H:%M UTC")
    );

    let interview =
        workflow.record_interview_outcome(Some(&interviewer), interview.interview.id, "passed")?;
    println!("  Outcome: {:?}", interview.interview.interview_result);

    let application = workflow.update_application_status(
        Some(&interviewer),
        application.application.id,
        "approved",
    )?;
    println!("  Application -> {:?}", application.application.status);

    let contract = workflow.issue_contract(
        Some(&admin),
        ContractRequest {
            applicant_id: applicant.id,
            animal_id: animal_id.clone(),
            payment_proof: "receipt-0001".to_string(),
            signature: None,
        },
    )?;
    let contract = workflow.sign_contract(
        Some(&applicant_identity),
        contract.contract.id,
        "Jordan Rivera".to_string(),
    )?;
    println!(
        "- Contract #{} signed: {}",
        contract.contract.id.0,
        contract.contract.is_signed()
    );

    let animal = workflow.change_animal_status(Some(&admin), &animal_id, "adopted")?;
    println!("- {} -> {:?}", animal.animal.unique_id, animal.animal.status);

    print_payload("Contract payload", &contract, compact);
    print_payload("Animal payload", &animal, compact);

    let remaining = workflow.list_public_animals(PublicListing::Available)?;
    println!("\nStill available: {}", remaining.len());

    Ok(())
}

fn print_payload<T: Serialize>(label: &str, payload: &T, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(payload)
    } else {
        serde_json::to_string_pretty(payload)
    };
    match rendered {
        Ok(json) => println!("\n{label}:\n{json}"),
        Err(err) => println!("\n{label} unavailable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_walks_to_a_signed_contract() {
        run_demo(DemoArgs {
            compact: true,
            interview_in_days: 1,
        })
        .expect("demo completes");
    }
}
