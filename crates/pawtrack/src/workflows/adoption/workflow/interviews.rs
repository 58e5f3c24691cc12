use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::super::domain::{
    Applicant, Application, Interview, InterviewId, InterviewQuery, InterviewRequest,
    InterviewView, Volunteer,
};
use super::super::identity::IdentityContext;
use super::super::policy::{AccessContext, Operation};
use super::super::status::{validate_transition, InterviewOutcome, Lifecycle};
use super::super::store::{EntityKind, EntityStore, StoreError};
use super::{views, AdoptionWorkflow, WorkflowError};

const KIND: EntityKind = EntityKind::Interview;

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    /// Books an interview. The interviewer's display name is copied onto the record.
    pub fn schedule_interview(
        &self,
        actor: Option<&IdentityContext>,
        request: InterviewRequest,
    ) -> Result<InterviewView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Create)?;
        let view = self.store.transaction(|tx| {
            tx.require::<Application>(&request.application_id)?;
            let interviewer = tx.require::<Volunteer>(&request.volunteer_id)?;
            tx.require::<Applicant>(&request.applicant_id)?;
            let interview = Interview {
                id: InterviewId(tx.next_serial(KIND)?),
                application_id: request.application_id,
                volunteer_id: request.volunteer_id,
                applicant_id: request.applicant_id,
                interview_time: request.interview_time,
                interview_result: InterviewOutcome::INITIAL,
                volunteer_name: interviewer.display_name(),
                created_at: Utc::now(),
            };
            let interview = tx.insert(interview)?;
            Ok::<_, WorkflowError>(views::interview_view(&*tx, interview)?)
        })?;

        info!(
            interview = %view.interview.id,
            application = %view.interview.application_id,
            interviewer = %view.interview.volunteer_id,
            at = %view.interview.interview_time,
            "interview scheduled"
        );
        Ok(view)
    }

    pub fn get_interview(
        &self,
        actor: Option<&IdentityContext>,
        id: InterviewId,
    ) -> Result<InterviewView, WorkflowError> {
        self.precheck(actor, KIND, Operation::View)?;
        self.store.read(|tx| {
            let interview = tx.require::<Interview>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::View,
                AccessContext::for_applicant(interview.applicant_id),
            )?;
            Ok::<_, WorkflowError>(views::interview_view(tx, interview)?)
        })
    }

    pub fn list_interviews(
        &self,
        actor: Option<&IdentityContext>,
        query: InterviewQuery,
    ) -> Result<Vec<InterviewView>, WorkflowError> {
        self.precheck(actor, KIND, Operation::List)?;
        let Some(filter) = self.scoped(actor, KIND, query.into())? else {
            return Ok(Vec::new());
        };
        let interviews = self.store.read(|tx| {
            tx.list::<Interview>(&filter)?
                .into_iter()
                .map(|interview| views::interview_view(tx, interview))
                .collect::<Result<Vec<_>, StoreError>>()
                .map_err(WorkflowError::from)
        })?;
        debug!(count = interviews.len(), "listed interviews");
        Ok(interviews)
    }

    pub fn reschedule_interview(
        &self,
        actor: Option<&IdentityContext>,
        id: InterviewId,
        interview_time: DateTime<Utc>,
    ) -> Result<InterviewView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Reschedule)?;
        let (view, previous) = self.store.transaction(|tx| {
            let mut interview = tx.require::<Interview>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::Reschedule,
                AccessContext::for_applicant(interview.applicant_id),
            )?;
            let previous = interview.interview_time;
            interview.interview_time = interview_time;
            let interview = tx.replace(interview)?;
            Ok::<_, WorkflowError>((views::interview_view(&*tx, interview)?, previous))
        })?;

        info!(interview = %id, from = %previous, to = %interview_time, "interview rescheduled");
        Ok(view)
    }

    /// Sets the outcome. Only interviewers may record it, and it may be re-set.
    pub fn record_interview_outcome(
        &self,
        actor: Option<&IdentityContext>,
        id: InterviewId,
        requested: &str,
    ) -> Result<InterviewView, WorkflowError> {
        self.precheck(actor, KIND, Operation::RecordOutcome)?;
        let (view, change) = self.store.transaction(|tx| {
            let mut interview = tx.require::<Interview>(&id)?;
            self.authorize(
                actor,
                KIND,
                Operation::RecordOutcome,
                AccessContext::for_applicant(interview.applicant_id),
            )?;
            let change = validate_transition(interview.interview_result, requested)?;
            interview.interview_result = change.to;
            let interview = tx.replace(interview)?;
            Ok::<_, WorkflowError>((views::interview_view(&*tx, interview)?, change))
        })?;

        info!(
            interview = %id,
            from = change.from.label(),
            to = change.to.label(),
            "interview outcome recorded"
        );
        Ok(view)
    }

    pub fn delete_interview(
        &self,
        actor: Option<&IdentityContext>,
        id: InterviewId,
    ) -> Result<Interview, WorkflowError> {
        self.precheck(actor, KIND, Operation::Delete)?;
        let removed = self
            .store
            .transaction(|tx| tx.remove::<Interview>(&id).map_err(WorkflowError::from))?;
        info!(interview = %id, "interview deleted");
        Ok(removed)
    }
}
