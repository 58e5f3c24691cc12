//! Authorization and workflow coordination for the shelter adoption pipeline.
//!
//! Animals move from intake through applications, interviews and contracts. Every call
//! carries an [`IdentityContext`]; [`AccessPolicy`] decides what it may do, the status rules
//! guard lifecycle fields, and [`AdoptionWorkflow`] commits each operation as one unit of
//! work against an [`EntityStore`].

pub mod allocator;
pub mod domain;
pub mod identity;
pub mod policy;
pub mod router;
pub mod status;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use allocator::ShelterIdAllocator;
pub use domain::{
    Animal, AnimalIntake, AnimalProfile, AnimalQuery, AnimalUpdate, AnimalView, Applicant,
    ApplicantId, ApplicantRegistration, ApplicantUpdate, Application, ApplicationId,
    ApplicationQuery, ApplicationSubmission, ApplicationView, Contract, ContractId, ContractQuery,
    ContractRequest, ContractView, Interview, InterviewId, InterviewQuery, InterviewRequest,
    InterviewView, PublicListing, ShelterId, Volunteer, VolunteerId, VolunteerRegistration,
    VolunteerRole, VolunteerUpdate,
};
pub use identity::{IdentityContext, Role};
pub use policy::{AccessContext, AccessPolicy, Decision, DenialReason, Operation, Scope};
pub use router::adoption_router;
pub use status::{
    AnimalStatus, ApplicationStatus, InterviewOutcome, InvalidTransition, Lifecycle, StatusKind,
};
pub use store::{EntityKey, EntityKind, EntityStore, Filter, MemoryStore, StoreError, StoreTx};
pub use workflow::{AdoptionWorkflow, WorkflowError};
