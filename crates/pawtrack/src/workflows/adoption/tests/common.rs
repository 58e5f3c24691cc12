use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::workflows::adoption::domain::{
    AnimalIntake, AnimalProfile, Applicant, ApplicantId, ApplicationSubmission, ContractRequest,
    InterviewRequest, ShelterId, Volunteer, VolunteerId, VolunteerRole,
};
use crate::workflows::adoption::identity::IdentityContext;
use crate::workflows::adoption::store::{
    EntityKey, EntityKind, EntityStore, Filter, MemoryStore, Record, StoreError, StoreTx,
};
use crate::workflows::adoption::{adoption_router, AdoptionWorkflow, ShelterIdAllocator};

pub(super) const ADMIN: VolunteerId = VolunteerId(1);
pub(super) const FOSTER: VolunteerId = VolunteerId(2);
pub(super) const OTHER_FOSTER: VolunteerId = VolunteerId(3);
pub(super) const INTERVIEWER: VolunteerId = VolunteerId(4);
pub(super) const APPLICANT: ApplicantId = ApplicantId(1);
pub(super) const OTHER_APPLICANT: ApplicantId = ApplicantId(2);

pub(super) fn admin() -> IdentityContext {
    IdentityContext::admin(ADMIN)
}

pub(super) fn foster() -> IdentityContext {
    IdentityContext::foster(FOSTER)
}

pub(super) fn other_foster() -> IdentityContext {
    IdentityContext::foster(OTHER_FOSTER)
}

pub(super) fn interviewer() -> IdentityContext {
    IdentityContext::interviewer(INTERVIEWER)
}

pub(super) fn applicant() -> IdentityContext {
    IdentityContext::applicant(APPLICANT)
}

pub(super) fn config() -> WorkflowConfig {
    WorkflowConfig {
        allocation_retries: 3,
        seed_demo_data: false,
    }
}

fn volunteer(id: VolunteerId, first: &str, last: &str, role: VolunteerRole) -> Volunteer {
    Volunteer {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@shelter.example", first.to_ascii_lowercase()),
        role,
        credential: "hashed".to_string(),
    }
}

fn applicant_record(id: ApplicantId, first: &str) -> Applicant {
    Applicant {
        id,
        first_name: first.to_string(),
        last_name: "Doe".to_string(),
        email: format!("{}@mail.example", first.to_ascii_lowercase()),
        phone_number: Some("555-0100".to_string()),
        interview_language: Some("en".to_string()),
        home_address: None,
        city: Some("Toronto".to_string()),
        province: Some("ON".to_string()),
        zip_code: None,
    }
}

/// Store with two fosters, an admin, an interviewer and two applicants already present.
pub(super) fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .transaction(|tx| {
            tx.insert(volunteer(ADMIN, "Ada", "Lane", VolunteerRole::Admin))?;
            tx.insert(volunteer(FOSTER, "Finn", "Moss", VolunteerRole::Foster))?;
            tx.insert(volunteer(OTHER_FOSTER, "Ola", "Birch", VolunteerRole::Foster))?;
            tx.insert(volunteer(INTERVIEWER, "Ivy", "Stone", VolunteerRole::Interviewer))?;
            tx.insert(applicant_record(APPLICANT, "Jane"))?;
            tx.insert(applicant_record(OTHER_APPLICANT, "John"))?;
            Ok::<_, StoreError>(())
        })
        .expect("seed store");
    store
}

pub(super) fn build_workflow() -> (AdoptionWorkflow<MemoryStore>, Arc<MemoryStore>) {
    let store = seeded_store();
    let workflow = AdoptionWorkflow::new(store.clone(), config()).expect("workflow");
    (workflow, store)
}

pub(super) fn router_with_workflow(workflow: AdoptionWorkflow<MemoryStore>) -> axum::Router {
    adoption_router(Arc::new(workflow))
}

pub(super) fn intake(name: &str) -> AnimalIntake {
    AnimalIntake {
        profile: AnimalProfile {
            name: name.to_string(),
            species: "dog".to_string(),
            breed: Some("mixed".to_string()),
            photo_gallery: vec![format!("https://img.example/{name}.jpg")],
            vaccinated: true,
            ..AnimalProfile::default()
        },
        volunteer_id: None,
        status: None,
    }
}

pub(super) fn submission(animal: &ShelterId) -> ApplicationSubmission {
    ApplicationSubmission {
        animal_id: animal.clone(),
        applicant_id: APPLICANT,
        answers: serde_json::json!({ "home": "house", "yard": true }),
    }
}

pub(super) fn interview_request(
    application_id: crate::workflows::adoption::domain::ApplicationId,
) -> InterviewRequest {
    InterviewRequest {
        application_id,
        volunteer_id: INTERVIEWER,
        applicant_id: APPLICANT,
        interview_time: Utc
            .with_ymd_and_hms(2026, 11, 3, 15, 30, 0)
            .single()
            .expect("valid time"),
    }
}

pub(super) fn contract_request(animal: &ShelterId) -> ContractRequest {
    ContractRequest {
        applicant_id: APPLICANT,
        animal_id: animal.clone(),
        payment_proof: "receipt-7781".to_string(),
        signature: None,
    }
}

/// Store that is never reachable.
pub(super) struct UnavailableStore;

impl EntityStore for UnavailableStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        Err(StoreError::TimedOut("database offline".to_string()).into())
    }
}

/// Store whose animal table rejects every insert as a key clash.
pub(super) struct ClashingStore {
    pub(super) inner: MemoryStore,
}

struct ClashingTx<'a> {
    inner: &'a mut dyn StoreTx,
}

impl StoreTx for ClashingTx<'_> {
    fn find(&self, kind: EntityKind, key: &EntityKey) -> Result<Option<Record>, StoreError> {
        self.inner.find(kind, key)
    }

    fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        self.inner.find_all(kind, filter)
    }

    fn next_serial(&mut self, kind: EntityKind) -> Result<u64, StoreError> {
        self.inner.next_serial(kind)
    }

    fn create(&mut self, record: Record) -> Result<Record, StoreError> {
        match record.kind() {
            EntityKind::Animal => Err(StoreError::Conflict {
                kind: EntityKind::Animal,
                key: record.key(),
            }),
            _ => self.inner.create(record),
        }
    }

    fn update(&mut self, record: Record) -> Result<Record, StoreError> {
        self.inner.update(record)
    }

    fn delete(&mut self, kind: EntityKind, key: &EntityKey) -> Result<Record, StoreError> {
        self.inner.delete(kind, key)
    }
}

impl EntityStore for ClashingStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.inner.transaction(|tx| {
            let mut clashing = ClashingTx { inner: tx };
            work(&mut clashing)
        })
    }
}

pub(super) fn clashing_workflow() -> AdoptionWorkflow<ClashingStore> {
    let inner = MemoryStore::new();
    inner
        .transaction(|tx| {
            tx.insert(volunteer(ADMIN, "Ada", "Lane", VolunteerRole::Admin))?;
            Ok::<_, StoreError>(())
        })
        .expect("seed store");
    AdoptionWorkflow::with_allocator(
        Arc::new(ClashingStore { inner }),
        Arc::new(ShelterIdAllocator::default()),
        config(),
    )
}

pub(super) fn unavailable_workflow() -> AdoptionWorkflow<UnavailableStore> {
    AdoptionWorkflow::with_allocator(
        Arc::new(UnavailableStore),
        Arc::new(ShelterIdAllocator::default()),
        config(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
