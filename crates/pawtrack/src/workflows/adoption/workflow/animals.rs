use chrono::Utc;
use tracing::{debug, info, warn};

use super::super::domain::{
    Animal, AnimalIntake, AnimalQuery, AnimalUpdate, AnimalView, PublicListing, ShelterId,
    Volunteer, VolunteerId,
};
use super::super::identity::{IdentityContext, Role};
use super::super::policy::{AccessContext, DenialReason, Operation};
use super::super::status::{initial_status, validate_transition, AnimalStatus, Lifecycle};
use super::super::store::{EntityKind, EntityStore, Filter, StoreError, StoreTx};
use super::{identity_of, views, AdoptionWorkflow, WorkflowError};

const KIND: EntityKind = EntityKind::Animal;

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    /// Registers a new animal under a freshly allocated shelter identifier.
    ///
    /// Fosters always own what they create; admins may name another volunteer as owner.
    pub fn intake_animal(
        &self,
        actor: Option<&IdentityContext>,
        intake: AnimalIntake,
    ) -> Result<AnimalView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Create)?;
        let identity = identity_of(actor, KIND, Operation::Create)?;
        let owner = self.resolve_owner(identity, intake.volunteer_id)?;
        let status: AnimalStatus = initial_status(intake.status.as_deref())?;

        let view = self.store.transaction(|tx| {
            tx.require::<Volunteer>(&owner)?;
            let animal = self.insert_with_fresh_id(tx, |unique_id| Animal {
                unique_id,
                profile: intake.profile.clone(),
                status,
                volunteer_id: Some(owner),
                created_at: Utc::now(),
            })?;
            Ok::<_, WorkflowError>(views::animal_view(&*tx, animal)?)
        })?;

        info!(
            actor = %identity,
            animal = %view.animal.unique_id,
            owner = %owner,
            status = view.animal.status.label(),
            "animal intake recorded"
        );
        Ok(view)
    }

    pub fn get_animal(
        &self,
        actor: Option<&IdentityContext>,
        unique_id: &ShelterId,
    ) -> Result<AnimalView, WorkflowError> {
        self.precheck(actor, KIND, Operation::View)?;
        self.store.read(|tx| {
            let animal = tx.require::<Animal>(unique_id)?;
            self.authorize(
                actor,
                KIND,
                Operation::View,
                AccessContext::owned_by(animal.volunteer_id),
            )?;
            Ok::<_, WorkflowError>(views::animal_view(tx, animal)?)
        })
    }

    /// Lists animals visible to the caller. Fosters only ever see their own.
    pub fn list_animals(
        &self,
        actor: Option<&IdentityContext>,
        query: AnimalQuery,
    ) -> Result<Vec<AnimalView>, WorkflowError> {
        self.precheck(actor, KIND, Operation::List)?;
        let Some(filter) = self.scoped(actor, KIND, query.into())? else {
            debug!("animal query outside caller scope");
            return Ok(Vec::new());
        };
        let animals = self.store.read(|tx| {
            tx.list::<Animal>(&filter)?
                .into_iter()
                .map(|animal| views::animal_view(tx, animal))
                .collect::<Result<Vec<_>, StoreError>>()
                .map_err(WorkflowError::from)
        })?;
        debug!(count = animals.len(), "listed animals");
        Ok(animals)
    }

    /// Anonymous listing of published or adopted animals. Owner details are not joined.
    pub fn list_public_animals(&self, listing: PublicListing) -> Result<Vec<Animal>, WorkflowError> {
        self.precheck(None, KIND, Operation::PublicList)?;
        let filter = Filter::with_animal_status(listing.status());
        let animals = self
            .store
            .read(|tx| tx.list::<Animal>(&filter).map_err(WorkflowError::from))?;
        debug!(count = animals.len(), ?listing, "listed public animals");
        Ok(animals)
    }

    /// Applies profile, owner and status changes in one write.
    pub fn update_animal(
        &self,
        actor: Option<&IdentityContext>,
        unique_id: &ShelterId,
        update: AnimalUpdate,
    ) -> Result<AnimalView, WorkflowError> {
        self.precheck(actor, KIND, Operation::Update)?;
        let view = self.store.transaction(|tx| {
            let mut animal = tx.require::<Animal>(unique_id)?;
            self.authorize(
                actor,
                KIND,
                Operation::Update,
                AccessContext::owned_by(animal.volunteer_id),
            )?;
            if let Some(owner) = update.volunteer_id {
                tx.require::<Volunteer>(&owner)?;
                animal.volunteer_id = Some(owner);
            }
            if let Some(profile) = update.profile.clone() {
                animal.profile = profile;
            }
            if let Some(requested) = update.status.as_deref() {
                animal.status = validate_transition(animal.status, requested)?.to;
            }
            let animal = tx.replace(animal)?;
            Ok::<_, WorkflowError>(views::animal_view(&*tx, animal)?)
        })?;

        info!(animal = %unique_id, "animal updated");
        Ok(view)
    }

    pub fn change_animal_status(
        &self,
        actor: Option<&IdentityContext>,
        unique_id: &ShelterId,
        requested: &str,
    ) -> Result<AnimalView, WorkflowError> {
        self.precheck(actor, KIND, Operation::ChangeStatus)?;
        let (view, change) = self.store.transaction(|tx| {
            let mut animal = tx.require::<Animal>(unique_id)?;
            self.authorize(
                actor,
                KIND,
                Operation::ChangeStatus,
                AccessContext::owned_by(animal.volunteer_id),
            )?;
            let change = validate_transition(animal.status, requested)?;
            animal.status = change.to;
            let animal = tx.replace(animal)?;
            Ok::<_, WorkflowError>((views::animal_view(&*tx, animal)?, change))
        })?;

        info!(
            animal = %unique_id,
            from = change.from.label(),
            to = change.to.label(),
            "animal status changed"
        );
        Ok(view)
    }

    pub fn delete_animal(
        &self,
        actor: Option<&IdentityContext>,
        unique_id: &ShelterId,
    ) -> Result<Animal, WorkflowError> {
        self.precheck(actor, KIND, Operation::Delete)?;
        let removed = self.store.transaction(|tx| {
            let animal = tx.require::<Animal>(unique_id)?;
            self.authorize(
                actor,
                KIND,
                Operation::Delete,
                AccessContext::owned_by(animal.volunteer_id),
            )?;
            Ok::<_, WorkflowError>(tx.remove::<Animal>(unique_id)?)
        })?;

        info!(animal = %unique_id, "animal deleted");
        Ok(removed)
    }

    fn resolve_owner(
        &self,
        identity: &IdentityContext,
        requested: Option<VolunteerId>,
    ) -> Result<VolunteerId, WorkflowError> {
        let subject = identity.volunteer_id();
        let owner = match identity.role() {
            Role::Foster => subject,
            Role::Admin => requested.or(subject),
            _ => None,
        };
        owner.ok_or_else(|| {
            self.denied(
                Some(identity),
                DenialReason::RoleNotPermitted {
                    role: identity.role(),
                    kind: KIND,
                    operation: Operation::Create,
                },
            )
        })
    }

    /// Claims identifiers until one inserts cleanly or the retry budget runs out.
    fn insert_with_fresh_id<F>(
        &self,
        tx: &mut dyn StoreTx,
        build: F,
    ) -> Result<Animal, WorkflowError>
    where
        F: Fn(ShelterId) -> Animal,
    {
        for attempt in 1..=self.allocation_retries {
            let unique_id = self.allocator.next();
            match tx.insert(build(unique_id.clone())) {
                Ok(animal) => return Ok(animal),
                Err(StoreError::Conflict { .. }) => {
                    // Another writer got ahead of this counter; resync from what is stored.
                    let highest = self.allocator.catch_up(&*tx)?;
                    warn!(%unique_id, attempt, highest, "shelter identifier already taken; retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(WorkflowError::AllocationConflict {
            attempts: self.allocation_retries,
        })
    }
}
