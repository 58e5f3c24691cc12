//! Storage seam for the adoption core.
//!
//! The coordinator only talks to [`EntityStore`]; persistence, indexing and query execution
//! belong to the implementor. Every unit of work runs inside [`EntityStore::transaction`],
//! which must be isolated and atomic: either all writes made by the closure become visible
//! or none do.

mod memory;

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{
    Animal, AnimalQuery, Applicant, ApplicantId, Application, ApplicationId, ApplicationQuery,
    Contract, ContractId, ContractQuery, Interview, InterviewId, InterviewQuery, ShelterId,
    Volunteer, VolunteerId,
};
use super::status::AnimalStatus;

pub use memory::MemoryStore;

/// Entity kinds known to the store and the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Animal,
    Volunteer,
    Applicant,
    Application,
    Interview,
    Contract,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Animal => "animal",
            EntityKind::Volunteer => "volunteer",
            EntityKind::Applicant => "applicant",
            EntityKind::Application => "application",
            EntityKind::Interview => "interview",
            EntityKind::Contract => "contract",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Primary key of a stored record. Animals are keyed by shelter identifier, the rest by serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    Shelter(ShelterId),
    Serial(u64),
}

impl EntityKey {
    fn sort_key(&self) -> (u8, u64, &str) {
        match self {
            EntityKey::Shelter(id) => (0, id.counter().unwrap_or(u64::MAX), id.as_str()),
            EntityKey::Serial(serial) => (1, *serial, ""),
        }
    }
}

impl Ord for EntityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for EntityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Shelter(id) => write!(f, "{id}"),
            EntityKey::Serial(serial) => write!(f, "{serial}"),
        }
    }
}

impl From<ShelterId> for EntityKey {
    fn from(value: ShelterId) -> Self {
        EntityKey::Shelter(value)
    }
}

macro_rules! serial_key {
    ($($id:ty),*) => {
        $(impl From<$id> for EntityKey {
            fn from(value: $id) -> Self {
                EntityKey::Serial(value.0)
            }
        })*
    };
}

serial_key!(VolunteerId, ApplicantId, ApplicationId, InterviewId, ContractId);

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Animal(Animal),
    Volunteer(Volunteer),
    Applicant(Applicant),
    Application(Application),
    Interview(Interview),
    Contract(Contract),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Animal(_) => EntityKind::Animal,
            Record::Volunteer(_) => EntityKind::Volunteer,
            Record::Applicant(_) => EntityKind::Applicant,
            Record::Application(_) => EntityKind::Application,
            Record::Interview(_) => EntityKind::Interview,
            Record::Contract(_) => EntityKind::Contract,
        }
    }

    pub fn key(&self) -> EntityKey {
        match self {
            Record::Animal(animal) => animal.unique_id.clone().into(),
            Record::Volunteer(volunteer) => volunteer.id.into(),
            Record::Applicant(applicant) => applicant.id.into(),
            Record::Application(application) => application.id.into(),
            Record::Interview(interview) => interview.id.into(),
            Record::Contract(contract) => contract.id.into(),
        }
    }
}

/// Typed view over [`Record`] so the coordinator never matches on the enum directly.
pub trait Entity: Clone + Sized {
    const KIND: EntityKind;
    type Id: Clone + Into<EntityKey>;

    fn id(&self) -> Self::Id;
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
}

macro_rules! entity {
    ($ty:ident, $id:ty, $field:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;
            type Id = $id;

            fn id(&self) -> Self::Id {
                self.$field.clone()
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

entity!(Animal, ShelterId, unique_id);
entity!(Volunteer, VolunteerId, id);
entity!(Applicant, ApplicantId, id);
entity!(Application, ApplicationId, id);
entity!(Interview, InterviewId, id);
entity!(Contract, ContractId, id);

/// Conjunctive filter for `find_all`.
///
/// A constraint on a field the kind does not carry never matches, so a narrowing scope
/// applied to the wrong kind fails closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub owner: Option<VolunteerId>,
    #[serde(default)]
    pub animal_status: Option<AnimalStatus>,
    #[serde(default)]
    pub animal: Option<ShelterId>,
    #[serde(default)]
    pub applicant: Option<ApplicantId>,
    #[serde(default)]
    pub application: Option<ApplicationId>,
    #[serde(default)]
    pub volunteer: Option<VolunteerId>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(owner: VolunteerId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn with_animal_status(status: AnimalStatus) -> Self {
        Self {
            animal_status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        fn check<T: PartialEq>(wanted: &Option<T>, actual: Option<&T>) -> bool {
            match wanted {
                None => true,
                Some(value) => actual == Some(value),
            }
        }

        match record {
            Record::Animal(animal) => {
                check(&self.owner, animal.volunteer_id.as_ref())
                    && check(&self.animal_status, Some(&animal.status))
                    && check(&self.animal, Some(&animal.unique_id))
                    && self.only(&[Field::Owner, Field::AnimalStatus, Field::Animal])
            }
            Record::Volunteer(volunteer) => {
                check(&self.volunteer, Some(&volunteer.id))
                    && self.only(&[Field::Volunteer])
            }
            Record::Applicant(applicant) => {
                check(&self.applicant, Some(&applicant.id)) && self.only(&[Field::Applicant])
            }
            Record::Application(application) => {
                check(&self.animal, Some(&application.animal_id))
                    && check(&self.applicant, Some(&application.applicant_id))
                    && check(&self.application, Some(&application.id))
                    && self.only(&[Field::Animal, Field::Applicant, Field::Application])
            }
            Record::Interview(interview) => {
                check(&self.application, Some(&interview.application_id))
                    && check(&self.volunteer, Some(&interview.volunteer_id))
                    && check(&self.applicant, Some(&interview.applicant_id))
                    && self.only(&[Field::Application, Field::Volunteer, Field::Applicant])
            }
            Record::Contract(contract) => {
                check(&self.applicant, Some(&contract.applicant_id))
                    && check(&self.animal, Some(&contract.animal_id))
                    && self.only(&[Field::Applicant, Field::Animal])
            }
        }
    }

    fn only(&self, allowed: &[Field]) -> bool {
        let set = [
            (Field::Owner, self.owner.is_some()),
            (Field::AnimalStatus, self.animal_status.is_some()),
            (Field::Animal, self.animal.is_some()),
            (Field::Applicant, self.applicant.is_some()),
            (Field::Application, self.application.is_some()),
            (Field::Volunteer, self.volunteer.is_some()),
        ];
        set.iter()
            .all(|(field, present)| !present || allowed.contains(field))
    }
}

impl From<AnimalQuery> for Filter {
    fn from(query: AnimalQuery) -> Self {
        Self {
            owner: query.volunteer_id,
            animal_status: query.status,
            ..Self::default()
        }
    }
}

impl From<ApplicationQuery> for Filter {
    fn from(query: ApplicationQuery) -> Self {
        Self {
            animal: query.animal_id,
            applicant: query.applicant_id,
            ..Self::default()
        }
    }
}

impl From<InterviewQuery> for Filter {
    fn from(query: InterviewQuery) -> Self {
        Self {
            application: query.application_id,
            volunteer: query.volunteer_id,
            applicant: query.applicant_id,
            ..Self::default()
        }
    }
}

impl From<ContractQuery> for Filter {
    fn from(query: ContractQuery) -> Self {
        Self {
            applicant: query.applicant_id,
            animal: query.animal_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Owner,
    AnimalStatus,
    Animal,
    Applicant,
    Application,
    Volunteer,
}

/// Failures surfaced by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {key} not found")]
    NotFound { kind: EntityKind, key: EntityKey },
    #[error("{kind} {key} already exists")]
    Conflict { kind: EntityKind, key: EntityKey },
    #[error("store timed out: {0}")]
    TimedOut(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::TimedOut(_) | StoreError::Unavailable(_))
    }
}

/// Operations available inside one unit of work.
pub trait StoreTx {
    fn find(&self, kind: EntityKind, key: &EntityKey) -> Result<Option<Record>, StoreError>;
    fn find_all(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError>;
    /// Reserves the next numeric key for `kind`.
    fn next_serial(&mut self, kind: EntityKind) -> Result<u64, StoreError>;
    /// Inserts a record, failing with `Conflict` when the key is taken.
    fn create(&mut self, record: Record) -> Result<Record, StoreError>;
    /// Replaces an existing record, failing with `NotFound` when absent.
    fn update(&mut self, record: Record) -> Result<Record, StoreError>;
    fn delete(&mut self, kind: EntityKind, key: &EntityKey) -> Result<Record, StoreError>;
}

/// Storage abstraction so the coordinator can be exercised in isolation.
pub trait EntityStore: Send + Sync {
    /// Runs `work` as one isolated read-modify-write unit. Writes are discarded on `Err`.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>;

    /// Runs `work` against a consistent snapshot without writing.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTx) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.transaction(|tx| work(&*tx))
    }
}

impl<'a> dyn StoreTx + 'a {
    pub fn get<T: Entity>(&self, id: &T::Id) -> Result<Option<T>, StoreError> {
        let key: EntityKey = id.clone().into();
        match self.find(T::KIND, &key)? {
            Some(record) => typed::<T>(record).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get) but a missing record is a `NotFound` error.
    pub fn require<T: Entity>(&self, id: &T::Id) -> Result<T, StoreError> {
        self.get::<T>(id)?.ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            key: id.clone().into(),
        })
    }

    pub fn list<T: Entity>(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.find_all(T::KIND, filter)?
            .into_iter()
            .map(typed::<T>)
            .collect()
    }

    pub fn insert<T: Entity>(&mut self, entity: T) -> Result<T, StoreError> {
        typed::<T>(self.create(entity.into_record())?)
    }

    pub fn replace<T: Entity>(&mut self, entity: T) -> Result<T, StoreError> {
        typed::<T>(self.update(entity.into_record())?)
    }

    pub fn remove<T: Entity>(&mut self, id: &T::Id) -> Result<T, StoreError> {
        let key: EntityKey = id.clone().into();
        typed::<T>(self.delete(T::KIND, &key)?)
    }
}

fn typed<T: Entity>(record: Record) -> Result<T, StoreError> {
    let found = record.kind();
    T::from_record(record).ok_or_else(|| {
        StoreError::Unavailable(format!(
            "store returned a {found} record where a {} was expected",
            T::KIND
        ))
    })
}
