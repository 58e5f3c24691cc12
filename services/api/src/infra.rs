use metrics_exporter_prometheus::PrometheusHandle;
use pawtrack::config::WorkflowConfig;
use pawtrack::workflows::adoption::{
    AdoptionWorkflow, AnimalIntake, AnimalProfile, EntityStore, IdentityContext, MemoryStore,
    Volunteer, VolunteerId, VolunteerRole, WorkflowError,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) const DEMO_ADMIN: VolunteerId = VolunteerId(1);
pub(crate) const DEMO_FOSTER: VolunteerId = VolunteerId(2);
pub(crate) const DEMO_INTERVIEWER: VolunteerId = VolunteerId(3);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Workflow over a fresh in-memory store, seeded when the configuration asks for it.
pub(crate) fn build_workflow(
    config: WorkflowConfig,
) -> Result<AdoptionWorkflow<MemoryStore>, WorkflowError> {
    let workflow = AdoptionWorkflow::new(Arc::new(MemoryStore::new()), config)?;
    if config.seed_demo_data {
        seed_demo_data(&workflow)?;
    }
    Ok(workflow)
}

fn demo_volunteer(id: VolunteerId, first: &str, last: &str, role: VolunteerRole) -> Volunteer {
    Volunteer {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@pawtrack.example", first.to_lowercase()),
        role,
        credential: String::new(),
    }
}

fn demo_animal(name: &str, species: &str, breed: &str, owner: VolunteerId) -> AnimalIntake {
    AnimalIntake {
        profile: AnimalProfile {
            name: name.to_string(),
            species: species.to_string(),
            breed: Some(breed.to_string()),
            age: Some("2 years".to_string()),
            personality: vec!["friendly".to_string(), "curious".to_string()],
            vaccinated: true,
            neutered: true,
            location: Some("Main shelter".to_string()),
            adoption_fee: Some(150),
            ..AnimalProfile::default()
        },
        volunteer_id: Some(owner),
        status: Some("published".to_string()),
    }
}

/// Loads an admin, a foster, an interviewer and two published animals.
pub(crate) fn seed_demo_data(workflow: &AdoptionWorkflow<MemoryStore>) -> Result<(), WorkflowError> {
    // Volunteers go straight into the store: no admin exists yet to register them.
    workflow.store().transaction(|tx| {
        tx.insert(demo_volunteer(DEMO_ADMIN, "Avery", "Admin", VolunteerRole::Admin))?;
        tx.insert(demo_volunteer(DEMO_FOSTER, "Finley", "Foster", VolunteerRole::Foster))?;
        tx.insert(demo_volunteer(
            DEMO_INTERVIEWER,
            "Indra",
            "Interviewer",
            VolunteerRole::Interviewer,
        ))?;
        Ok::<_, WorkflowError>(())
    })?;

    let admin = IdentityContext::admin(DEMO_ADMIN);
    for intake in [
        demo_animal("Biscuit", "dog", "Beagle mix", DEMO_ADMIN),
        demo_animal("Mochi", "cat", "Domestic shorthair", DEMO_FOSTER),
    ] {
        workflow.intake_animal(Some(&admin), intake)?;
    }

    info!(volunteers = 3, animals = 2, "demo data seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtrack::workflows::adoption::{AnimalQuery, PublicListing};

    fn seeded_config() -> WorkflowConfig {
        WorkflowConfig {
            seed_demo_data: true,
            ..WorkflowConfig::default()
        }
    }

    #[test]
    fn seeding_publishes_two_animals() {
        let workflow = build_workflow(seeded_config()).expect("seeded");
        let public = workflow
            .list_public_animals(PublicListing::Available)
            .expect("public listing");
        let ids: Vec<&str> = public.iter().map(|animal| animal.unique_id.as_str()).collect();
        assert_eq!(ids, vec!["SFP-001", "SFP-002"]);
    }

    #[test]
    fn seeded_foster_sees_only_its_animal() {
        let workflow = build_workflow(seeded_config()).expect("seeded");
        let mine = workflow
            .list_animals(
                Some(&IdentityContext::foster(DEMO_FOSTER)),
                AnimalQuery::default(),
            )
            .expect("foster listing");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].animal.profile.name, "Mochi");
    }

    #[test]
    fn unseeded_store_starts_empty() {
        let workflow = build_workflow(WorkflowConfig::default()).expect("workflow");
        let listed = workflow
            .list_public_animals(PublicListing::Available)
            .expect("public listing");
        assert!(listed.is_empty());
    }
}
