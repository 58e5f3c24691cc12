//! Coordinator for the multi-entity operations of the adoption pipeline.
//!
//! Each operation follows the same order: role-level policy check, then one store
//! transaction that loads the target and references, settles ownership-dependent policy,
//! validates status changes, writes, and joins the direct relations for the response.
//! Nothing is written unless every step succeeds.

mod animals;
mod applications;
mod contracts;
mod interviews;
mod people;
mod views;

use std::sync::Arc;

use tracing::warn;

use super::allocator::ShelterIdAllocator;
use super::identity::IdentityContext;
use super::policy::{AccessContext, AccessPolicy, Decision, DenialReason, Operation, Scope};
use super::status::InvalidTransition;
use super::store::{EntityKey, EntityKind, EntityStore, Filter, StoreError};
use crate::config::WorkflowConfig;

/// Service composing the access policy, the status rules, the identifier allocator and the store.
pub struct AdoptionWorkflow<S> {
    store: Arc<S>,
    policy: AccessPolicy,
    allocator: Arc<ShelterIdAllocator>,
    allocation_retries: u32,
}

impl<S> AdoptionWorkflow<S>
where
    S: EntityStore + 'static,
{
    /// Builds the coordinator, seeding the allocator from the animals already stored.
    pub fn new(store: Arc<S>, config: WorkflowConfig) -> Result<Self, WorkflowError> {
        let allocator = ShelterIdAllocator::seed_from(store.as_ref())?;
        Ok(Self::with_allocator(store, Arc::new(allocator), config))
    }

    pub fn with_allocator(
        store: Arc<S>,
        allocator: Arc<ShelterIdAllocator>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            store,
            policy: AccessPolicy::new(),
            allocator,
            allocation_retries: config.allocation_retries.max(1),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn allocator(&self) -> &ShelterIdAllocator {
        &self.allocator
    }

    /// Role-level gate run before the store is touched.
    fn precheck(
        &self,
        actor: Option<&IdentityContext>,
        kind: EntityKind,
        operation: Operation,
    ) -> Result<(), WorkflowError> {
        let decision = self.policy.precheck(actor, kind, operation);
        self.enforce(actor, decision)
    }

    /// Ownership-aware verdict once the target record is loaded.
    fn authorize(
        &self,
        actor: Option<&IdentityContext>,
        kind: EntityKind,
        operation: Operation,
        context: AccessContext,
    ) -> Result<(), WorkflowError> {
        let decision = self.policy.decide(actor, kind, operation, &context);
        self.enforce(actor, decision)
    }

    /// Scope for a list operation merged with the caller's filter. `None` means nothing matches.
    fn scoped(
        &self,
        actor: Option<&IdentityContext>,
        kind: EntityKind,
        filter: Filter,
    ) -> Result<Option<Filter>, WorkflowError> {
        let scope: Scope = self
            .policy
            .scope(actor, kind)
            .map_err(|reason| self.denied(actor, reason))?;
        Ok(scope.narrow(filter))
    }

    fn enforce(
        &self,
        actor: Option<&IdentityContext>,
        decision: Decision,
    ) -> Result<(), WorkflowError> {
        decision
            .into_result()
            .map_err(|reason| self.denied(actor, reason))
    }

    fn denied(&self, actor: Option<&IdentityContext>, reason: DenialReason) -> WorkflowError {
        match actor {
            Some(identity) => warn!(actor = %identity, %reason, "operation denied"),
            None => warn!(%reason, "anonymous operation denied"),
        }
        WorkflowError::AuthorizationDenied(reason)
    }
}

/// Error raised by the adoption workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("authorization denied: {0}")]
    AuthorizationDenied(DenialReason),
    #[error("{kind} {key} not found")]
    NotFound { kind: EntityKind, key: EntityKey },
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("{kind} {key} already exists")]
    Conflict { kind: EntityKind, key: EntityKey },
    #[error("no unique shelter identifier after {attempts} attempt(s); retry later")]
    AllocationConflict { attempts: u32 },
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl WorkflowError {
    /// Failures the caller may retry unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WorkflowError::AllocationConflict { .. } | WorkflowError::StorageUnavailable(_)
        )
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, key } => WorkflowError::NotFound { kind, key },
            StoreError::Conflict { kind, key } => WorkflowError::Conflict { kind, key },
            StoreError::TimedOut(detail) | StoreError::Unavailable(detail) => {
                WorkflowError::StorageUnavailable(detail)
            }
        }
    }
}

impl From<DenialReason> for WorkflowError {
    fn from(value: DenialReason) -> Self {
        WorkflowError::AuthorizationDenied(value)
    }
}

/// Identity for an operation the policy has already refused to run anonymously.
fn identity_of(
    actor: Option<&IdentityContext>,
    kind: EntityKind,
    operation: Operation,
) -> Result<&IdentityContext, WorkflowError> {
    actor.ok_or(WorkflowError::AuthorizationDenied(
        DenialReason::Unauthenticated { kind, operation },
    ))
}
