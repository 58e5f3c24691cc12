use super::super::domain::{
    Animal, AnimalBrief, AnimalSummary, AnimalView, Applicant, ApplicantSummary, Application,
    ApplicationSummary, ApplicationView, Contract, ContractView, Interview, InterviewView,
    Volunteer, VolunteerSummary,
};
use super::super::store::{StoreError, StoreTx};

// Relations removed after the fact project as `None`.

pub(super) fn animal_view(tx: &dyn StoreTx, animal: Animal) -> Result<AnimalView, StoreError> {
    let volunteer = match animal.volunteer_id {
        Some(id) => tx.get::<Volunteer>(&id)?.as_ref().map(VolunteerSummary::from),
        None => None,
    };
    Ok(AnimalView { animal, volunteer })
}

pub(super) fn application_view(
    tx: &dyn StoreTx,
    application: Application,
) -> Result<ApplicationView, StoreError> {
    let animal = tx
        .get::<Animal>(&application.animal_id)?
        .as_ref()
        .map(AnimalSummary::from);
    let applicant = tx
        .get::<Applicant>(&application.applicant_id)?
        .as_ref()
        .map(ApplicantSummary::from);
    Ok(ApplicationView {
        application,
        animal,
        applicant,
    })
}

pub(super) fn interview_view(
    tx: &dyn StoreTx,
    interview: Interview,
) -> Result<InterviewView, StoreError> {
    let application = tx
        .get::<Application>(&interview.application_id)?
        .as_ref()
        .map(ApplicationSummary::from);
    let volunteer = tx
        .get::<Volunteer>(&interview.volunteer_id)?
        .as_ref()
        .map(VolunteerSummary::from);
    let applicant = tx
        .get::<Applicant>(&interview.applicant_id)?
        .as_ref()
        .map(ApplicantSummary::from);
    Ok(InterviewView {
        interview,
        application,
        volunteer,
        applicant,
    })
}

pub(super) fn contract_view(
    tx: &dyn StoreTx,
    contract: Contract,
) -> Result<ContractView, StoreError> {
    let applicant = tx
        .get::<Applicant>(&contract.applicant_id)?
        .as_ref()
        .map(ApplicantSummary::from);
    let animal = tx
        .get::<Animal>(&contract.animal_id)?
        .as_ref()
        .map(AnimalBrief::from);
    Ok(ContractView {
        contract,
        applicant,
        animal,
    })
}
