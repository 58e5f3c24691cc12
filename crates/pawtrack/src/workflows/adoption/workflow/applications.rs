use chrono::Utc;
use tracing::{debug, info};

use super::super::domain::{
    Animal, Applicant, Application, ApplicationId, ApplicationQuery, ApplicationSubmission,
    ApplicationView,
};
use super::super::identity::IdentityContext;
use super::super::policy::{AccessContext, Operation};
use super::super::status::{validate_transition, ApplicationStatus, Lifecycle};
use super::super::store::{EntityKind, EntityStore, StoreError};
use super::{views, AdoptionWorkflow, WorkflowError};

const KIND: EntityKind = EntityKind::Application;

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    /// Files an adoption application. Open to anonymous callers; both references must exist.
    pub fn submit_application(
        &self,
        actor: Option<&IdentityContext>,
        submission: ApplicationSubmission,
    ) -> Result<ApplicationView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Create)?;
        let view = self.store.transaction(|tx| {
            tx.require::<Animal>(&submission.animal_id)?;
            tx.require::<Applicant>(&submission.applicant_id)?;
            let application = Application {
                id: ApplicationId(tx.next_serial(KIND)?),
                animal_id: submission.animal_id.clone(),
                applicant_id: submission.applicant_id,
                status: ApplicationStatus::INITIAL,
                answers: submission.answers.clone(),
                created_at: Utc::now(),
            };
            let application = tx.insert(application)?;
            Ok::<_, WorkflowError>(views::application_view(&*tx, application)?)
        })?;

        info!(
            application = %view.application.id,
            animal = %view.application.animal_id,
            applicant = %view.application.applicant_id,
            "application submitted"
        );
        Ok(view)
    }

    pub fn get_application(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicationId,
    ) -> Result<ApplicationView, WorkflowError> {
        self.precheck(actor, KIND, Operation::View)?;
        self.store.read(|tx| {
            let application = tx.require::<Application>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::View,
                AccessContext::for_applicant(application.applicant_id),
            )?;
            Ok::<_, WorkflowError>(views::application_view(tx, application)?)
        })
    }

    /// Applicants only see their own applications.
    pub fn list_applications(
        &self,
        actor: Option<&IdentityContext>,
        query: ApplicationQuery,
    ) -> Result<Vec<ApplicationView>, WorkflowError> {
        self.precheck(actor, KIND, Operation::List)?;
        let Some(filter) = self.scoped(actor, KIND, query.into())? else {
            return Ok(Vec::new());
        };
        let applications = self.store.read(|tx| {
            tx.list::<Application>(&filter)?
                .into_iter()
                .map(|application| views::application_view(tx, application))
                .collect::<Result<Vec<_>, StoreError>>()
                .map_err(WorkflowError::from)
        })?;
        debug!(count = applications.len(), "listed applications");
        Ok(applications)
    }

    pub fn update_application_status(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicationId,
        requested: &str,
    ) -> Result<ApplicationView, WorkflowError> {
        self.precheck(actor, KIND, Operation::ChangeStatus)?;
        let (view, change) = self.store.transaction(|tx| {
            let mut application = tx.require::<Application>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::ChangeStatus,
                AccessContext::for_applicant(application.applicant_id),
            )?;
            let change = validate_transition(application.status, requested)?;
            application.status = change.to;
            let application = tx.replace(application)?;
            Ok::<_, WorkflowError>((views::application_view(&*tx, application)?, change))
        })?;

        info!(
            application = %id,
            from = change.from.label(),
            to = change.to.label(),
            "application status changed"
        );
        Ok(view)
    }

    pub fn delete_application(
        &self,
        actor: Option<&IdentityContext>,
        id: ApplicationId,
    ) -> Result<Application, WorkflowError> {
        self.precheck(actor, KIND, Operation::Delete)?;
        let removed = self
            .store
            .transaction(|tx| tx.remove::<Application>(&id).map_err(WorkflowError::from))?;
        info!(application = %id, "application deleted");
        Ok(removed)
    }
}
