use tracing::{debug, info};

use super::super::domain::{
    Applicant, ApplicantId, ApplicantRegistration, ApplicantUpdate, Volunteer, VolunteerId,
    VolunteerRegistration, VolunteerUpdate,
};
use super::super::identity::IdentityContext;
use super::super::policy::{AccessContext, Operation};
use super::super::store::{EntityKind, EntityStore, Filter};
use super::{AdoptionWorkflow, WorkflowError};

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    pub fn register_volunteer(
        &self,
        actor: Option<&IdentityContext>,
        registration: VolunteerRegistration,
    ) -> Result<Volunteer, WorkflowError> {
        self.precheck(actor, EntityKind::Volunteer, Operation::Create)?;
        let volunteer = self.store.transaction(|tx| {
            let id = VolunteerId(tx.next_serial(EntityKind::Volunteer)?);
            let volunteer = Volunteer {
                id,
                first_name: registration.first_name.clone(),
                last_name: registration.last_name.clone(),
                email: registration.email.clone(),
                role: registration.role,
                credential: registration.credential.clone(),
            };
            Ok::<_, WorkflowError>(tx.insert(volunteer)?)
        })?;

        info!(volunteer = %volunteer.id, role = volunteer.role.label(), "volunteer registered");
        Ok(volunteer)
    }

    pub fn get_volunteer(
        &self,
        actor: Option<&IdentityContext>,
        id: VolunteerId,
    ) -> Result<Volunteer, WorkflowError> {
        self.precheck(actor, EntityKind::Volunteer, Operation::View)?;
        self.store
            .read(|tx| tx.require::<Volunteer>(&id).map_err(WorkflowError::from))
    }

    pub fn list_volunteers(
        &self,
        actor: Option<&IdentityContext>,
    ) -> Result<Vec<Volunteer>, WorkflowError> {
        self.precheck(actor, EntityKind::Volunteer, Operation::List)?;
        let Some(filter) = self.scoped(actor, EntityKind::Volunteer, Filter::all())? else {
            return Ok(Vec::new());
        };
        self.store
            .read(|tx| tx.list::<Volunteer>(&filter).map_err(WorkflowError::from))
    }

    /// Renames or re-roles a volunteer. Interview name snapshots are left as they were.
    pub fn update_volunteer(
        &self,
        actor: Option<&IdentityContext>,
        id: VolunteerId,
        update: VolunteerUpdate,
    ) -> Result<Volunteer, WorkflowError> {
        self.precheck(actor, EntityKind::Volunteer, Operation::Update)?;
        let volunteer = self.store.transaction(|tx| {
            let mut volunteer = tx.require::<Volunteer>(&id)?;
            if let Some(first_name) = &update.first_name {
                volunteer.first_name = first_name.clone();
            }
            if let Some(last_name) = &update.last_name {
                volunteer.last_name = last_name.clone();
            }
            if let Some(email) = &update.email {
                volunteer.email = email.clone();
            }
            if let Some(role) = update.role {
                volunteer.role = role;
            }
            Ok::<_, WorkflowError>(tx.replace(volunteer)?)
        })?;

        info!(volunteer = %id, "volunteer updated");
        Ok(volunteer)
    }

    pub fn delete_volunteer(
        &self,
        actor: Option<&IdentityContext>,
        id: VolunteerId,
    ) -> Result<Volunteer, WorkflowError> {
        self.precheck(actor, EntityKind::Volunteer, Operation::Delete)?;
        let removed = self
            .store
            .transaction(|tx| tx.remove::<Volunteer>(&id).map_err(WorkflowError::from))?;
        info!(volunteer = %id, "volunteer deleted");
        Ok(removed)
    }

    /// Public intake of a prospective adopter.
    pub fn register_applicant(
        &self,
        actor: Option<&IdentityContext>,
        registration: ApplicantRegistration,
    ) -> Result<Applicant, WorkflowError> {
        self.precheck(actor, EntityKind::Applicant, Operation::Create)?;
        let applicant = self.store.transaction(|tx| {
            let id = ApplicantId(tx.next_serial(EntityKind::Applicant)?);
            let ApplicantRegistration {
                first_name,
                last_name,
                email,
                phone_number,
                interview_language,
                home_address,
                city,
                province,
                zip_code,
            } = registration.clone();
            let applicant = Applicant {
                id,
                first_name,
                last_name,
                email,
                phone_number,
                interview_language,
                home_address,
                city,
                province,
                zip_code,
            };
            Ok::<_, WorkflowError>(tx.insert(applicant)?)
        })?;

        info!(applicant = %applicant.id, "applicant registered");
        Ok(applicant)
    }

    pub fn get_applicant(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicantId,
    ) -> Result<Applicant, WorkflowError> {
        self.precheck(actor, EntityKind::Applicant, Operation::View)?;
        self.store.read(|tx| {
            let applicant = tx.require::<Applicant>(&id)?;
            self.authorize(
                actor,
                EntityKind::Applicant,
                Operation::View,
                AccessContext::for_applicant(applicant.id),
            )?;
            Ok::<_, WorkflowError>(applicant)
        })
    }

    pub fn list_applicants(
        &self,
        actor: Option<&IdentityContext>,
    ) -> Result<Vec<Applicant>, WorkflowError> {
        self.precheck(actor, EntityKind::Applicant, Operation::List)?;
        let Some(filter) = self.scoped(actor, EntityKind::Applicant, Filter::all())? else {
            return Ok(Vec::new());
        };
        let applicants = self
            .store
            .read(|tx| tx.list::<Applicant>(&filter).map_err(WorkflowError::from))?;
        debug!(count = applicants.len(), "listed applicants");
        Ok(applicants)
    }

    pub fn update_applicant(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicantId,
        update: ApplicantUpdate,
    ) -> Result<Applicant, WorkflowError> {
        self.precheck(actor, EntityKind::Applicant, Operation::Update)?;
        let applicant = self.store.transaction(|tx| {
            let mut applicant = tx.require::<Applicant>(&id)?;
            if let Some(first_name) = &update.first_name {
                applicant.first_name = first_name.clone();
            }
            if let Some(last_name) = &update.last_name {
                applicant.last_name = last_name.clone();
            }
            if let Some(email) = &update.email {
                applicant.email = email.clone();
            }
            if let Some(phone_number) = &update.phone_number {
                applicant.phone_number = Some(phone_number.clone());
            }
            Ok::<_, WorkflowError>(tx.replace(applicant)?)
        })?;

        info!(applicant = %id, "applicant updated");
        Ok(applicant)
    }

    pub fn delete_applicant(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicantId,
    ) -> Result<Applicant, WorkflowError> {
        self.precheck(actor, EntityKind::Applicant, Operation::Delete)?;
        let removed = self
            .store
            .transaction(|tx| tx.remove::<Applicant>(&id).map_err(WorkflowError::from))?;
        info!(applicant = %id, "applicant deleted");
        Ok(removed)
    }
}
