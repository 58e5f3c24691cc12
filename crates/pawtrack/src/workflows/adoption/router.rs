use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    AnimalIntake, AnimalQuery, AnimalUpdate, ApplicantId, ApplicantRegistration, ApplicantUpdate,
    ApplicationId, ApplicationQuery, ApplicationSubmission, ContractId, ContractQuery,
    ContractRequest, InterviewId, InterviewQuery, InterviewRequest, PublicListing, ShelterId,
    VolunteerId, VolunteerRegistration, VolunteerUpdate,
};
use super::identity::IdentityContext;
use super::store::EntityStore;
use super::workflow::{AdoptionWorkflow, WorkflowError};
use crate::error::AppError;

/// Header carrying the caller's role, set by the authenticating gateway.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the caller's subject identifier.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

type Shared<S> = State<Arc<AdoptionWorkflow<S>>>;

/// Router builder exposing the adoption pipeline under `/api/v1`.
pub fn adoption_router<S>(workflow: Arc<AdoptionWorkflow<S>>) -> Router
where
    S: EntityStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/animals",
            get(list_animals_handler::<S>).post(intake_animal_handler::<S>),
        )
        .route("/api/v1/animals/public", get(public_animals_handler::<S>))
        .route(
            "/api/v1/animals/:unique_id",
            get(get_animal_handler::<S>)
                .put(update_animal_handler::<S>)
                .delete(delete_animal_handler::<S>),
        )
        .route(
            "/api/v1/animals/:unique_id/status",
            patch(animal_status_handler::<S>),
        )
        .route(
            "/api/v1/volunteers",
            get(list_volunteers_handler::<S>).post(register_volunteer_handler::<S>),
        )
        .route(
            "/api/v1/volunteers/:volunteer_id",
            get(get_volunteer_handler::<S>)
                .put(update_volunteer_handler::<S>)
                .delete(delete_volunteer_handler::<S>),
        )
        .route(
            "/api/v1/applicants",
            get(list_applicants_handler::<S>).post(register_applicant_handler::<S>),
        )
        .route(
            "/api/v1/applicants/:applicant_id",
            get(get_applicant_handler::<S>)
                .put(update_applicant_handler::<S>)
                .delete(delete_applicant_handler::<S>),
        )
        .route(
            "/api/v1/applications",
            get(list_applications_handler::<S>).post(submit_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_application_handler::<S>).delete(delete_application_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/status",
            patch(application_status_handler::<S>),
        )
        .route(
            "/api/v1/interviews",
            get(list_interviews_handler::<S>).post(schedule_interview_handler::<S>),
        )
        .route(
            "/api/v1/interviews/:interview_id",
            get(get_interview_handler::<S>).delete(delete_interview_handler::<S>),
        )
        .route(
            "/api/v1/interviews/:interview_id/time",
            patch(reschedule_interview_handler::<S>),
        )
        .route(
            "/api/v1/interviews/:interview_id/result",
            patch(interview_result_handler::<S>),
        )
        .route(
            "/api/v1/contracts",
            get(list_contracts_handler::<S>).post(issue_contract_handler::<S>),
        )
        .route(
            "/api/v1/contracts/:contract_id",
            get(get_contract_handler::<S>).delete(delete_contract_handler::<S>),
        )
        .route(
            "/api/v1/contracts/:contract_id/signature",
            patch(sign_contract_handler::<S>),
        )
        .with_state(workflow)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub interview_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRequest {
    pub interview_result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureRequest {
    pub signature: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PublicListingQuery {
    #[serde(default)]
    pub listing: Option<PublicListing>,
}

/// Reads the caller identity from the gateway headers. No headers means anonymous.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Option<IdentityContext>, Response> {
    let role = headers
        .get(ACTOR_ROLE_HEADER)
        .map(|value| value.to_str().map(str::trim));
    let subject = headers
        .get(ACTOR_ID_HEADER)
        .map(|value| value.to_str().map(str::trim));

    match (role, subject) {
        (None, None) => Ok(None),
        (Some(Ok(role)), Some(Ok(subject))) => match subject.parse::<u64>() {
            Ok(subject) => Ok(Some(IdentityContext::from_claims(role, subject))),
            Err(_) => Err(bad_identity(format!(
                "{ACTOR_ID_HEADER} must be a numeric identifier"
            ))),
        },
        _ => Err(bad_identity(format!(
            "{ACTOR_ROLE_HEADER} and {ACTOR_ID_HEADER} must be supplied together"
        ))),
    }
}

fn bad_identity(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, WorkflowError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

fn no_content<T>(result: Result<T, WorkflowError>) -> Response {
    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

macro_rules! actor {
    ($headers:expr) => {
        match actor_from_headers(&$headers) {
            Ok(actor) => actor,
            Err(response) => return response,
        }
    };
}

pub(crate) async fn list_animals_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<AnimalQuery>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::OK, workflow.list_animals(actor.as_ref(), query))
}

pub(crate) async fn public_animals_handler<S>(
    State(workflow): Shared<S>,
    Query(query): Query<PublicListingQuery>,
) -> Response
where
    S: EntityStore + 'static,
{
    let listing = query.listing.unwrap_or(PublicListing::Available);
    respond(StatusCode::OK, workflow.list_public_animals(listing))
}

pub(crate) async fn intake_animal_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(intake): axum::Json<AnimalIntake>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::CREATED, workflow.intake_animal(actor.as_ref(), intake))
}

pub(crate) async fn get_animal_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(unique_id): Path<String>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_animal(actor.as_ref(), &ShelterId(unique_id)),
    )
}

pub(crate) async fn update_animal_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(unique_id): Path<String>,
    axum::Json(update): axum::Json<AnimalUpdate>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.update_animal(actor.as_ref(), &ShelterId(unique_id), update),
    )
}

pub(crate) async fn animal_status_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(unique_id): Path<String>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.change_animal_status(actor.as_ref(), &ShelterId(unique_id), &request.status),
    )
}

pub(crate) async fn delete_animal_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(unique_id): Path<String>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_animal(actor.as_ref(), &ShelterId(unique_id)))
}

pub(crate) async fn list_volunteers_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::OK, workflow.list_volunteers(actor.as_ref()))
}

pub(crate) async fn register_volunteer_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(registration): axum::Json<VolunteerRegistration>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::CREATED,
        workflow.register_volunteer(actor.as_ref(), registration),
    )
}

pub(crate) async fn get_volunteer_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(volunteer_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_volunteer(actor.as_ref(), VolunteerId(volunteer_id)),
    )
}

pub(crate) async fn update_volunteer_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(volunteer_id): Path<u64>,
    axum::Json(update): axum::Json<VolunteerUpdate>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.update_volunteer(actor.as_ref(), VolunteerId(volunteer_id), update),
    )
}

pub(crate) async fn delete_volunteer_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(volunteer_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_volunteer(actor.as_ref(), VolunteerId(volunteer_id)))
}

pub(crate) async fn list_applicants_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::OK, workflow.list_applicants(actor.as_ref()))
}

pub(crate) async fn register_applicant_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(registration): axum::Json<ApplicantRegistration>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::CREATED,
        workflow.register_applicant(actor.as_ref(), registration),
    )
}

pub(crate) async fn get_applicant_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_applicant(actor.as_ref(), ApplicantId(applicant_id)),
    )
}

pub(crate) async fn update_applicant_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(applicant_id): Path<u64>,
    axum::Json(update): axum::Json<ApplicantUpdate>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.update_applicant(actor.as_ref(), ApplicantId(applicant_id), update),
    )
}

pub(crate) async fn delete_applicant_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(applicant_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_applicant(actor.as_ref(), ApplicantId(applicant_id)))
}

pub(crate) async fn list_applications_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<ApplicationQuery>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.list_applications(actor.as_ref(), query),
    )
}

pub(crate) async fn submit_application_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::CREATED,
        workflow.submit_application(actor.as_ref(), submission),
    )
}

pub(crate) async fn get_application_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_application(actor.as_ref(), ApplicationId(application_id)),
    )
}

pub(crate) async fn application_status_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.update_application_status(
            actor.as_ref(),
            ApplicationId(application_id),
            &request.status,
        ),
    )
}

pub(crate) async fn delete_application_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(application_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_application(actor.as_ref(), ApplicationId(application_id)))
}

pub(crate) async fn list_interviews_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<InterviewQuery>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::OK, workflow.list_interviews(actor.as_ref(), query))
}

pub(crate) async fn schedule_interview_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<InterviewRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::CREATED,
        workflow.schedule_interview(actor.as_ref(), request),
    )
}

pub(crate) async fn get_interview_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_interview(actor.as_ref(), InterviewId(interview_id)),
    )
}

pub(crate) async fn reschedule_interview_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<u64>,
    axum::Json(request): axum::Json<RescheduleRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.reschedule_interview(
            actor.as_ref(),
            InterviewId(interview_id),
            request.interview_time,
        ),
    )
}

pub(crate) async fn interview_result_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<u64>,
    axum::Json(request): axum::Json<OutcomeRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.record_interview_outcome(
            actor.as_ref(),
            InterviewId(interview_id),
            &request.interview_result,
        ),
    )
}

pub(crate) async fn delete_interview_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(interview_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_interview(actor.as_ref(), InterviewId(interview_id)))
}

pub(crate) async fn list_contracts_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Query(query): Query<ContractQuery>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(StatusCode::OK, workflow.list_contracts(actor.as_ref(), query))
}

pub(crate) async fn issue_contract_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ContractRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::CREATED,
        workflow.issue_contract(actor.as_ref(), request),
    )
}

pub(crate) async fn get_contract_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(contract_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.get_contract(actor.as_ref(), ContractId(contract_id)),
    )
}

pub(crate) async fn sign_contract_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(contract_id): Path<u64>,
    axum::Json(request): axum::Json<SignatureRequest>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    respond(
        StatusCode::OK,
        workflow.sign_contract(actor.as_ref(), ContractId(contract_id), request.signature),
    )
}

pub(crate) async fn delete_contract_handler<S>(
    State(workflow): Shared<S>,
    headers: HeaderMap,
    Path(contract_id): Path<u64>,
) -> Response
where
    S: EntityStore + 'static,
{
    let actor = actor!(headers);
    no_content(workflow.delete_contract(actor.as_ref(), ContractId(contract_id)))
}
