use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::status::{AnimalStatus, ApplicationStatus, InterviewOutcome};

/// Fixed prefix of every shelter identifier.
pub const SHELTER_ID_PREFIX: &str = "SFP-";

/// Externally visible animal key, e.g. `SFP-007`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelterId(pub String);

impl ShelterId {
    /// Formats a counter value, zero-padded to three digits and unpadded past 999.
    pub fn from_counter(counter: u64) -> Self {
        Self(format!("{SHELTER_ID_PREFIX}{counter:03}"))
    }

    /// Numeric suffix, if the identifier follows the `SFP-<digits>` format.
    pub fn counter(&self) -> Option<u64> {
        let digits = self.0.strip_prefix(SHELTER_ID_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShelterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! serial_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

serial_id!(
    /// Volunteer (admin, foster, interviewer) identifier.
    VolunteerId
);
serial_id!(ApplicantId);
serial_id!(ApplicationId);
serial_id!(InterviewId);
serial_id!(ContractId);

/// Role stored on a volunteer record. Missing roles default to coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerRole {
    Admin,
    Foster,
    Interviewer,
    #[default]
    Coordinator,
}

impl VolunteerRole {
    pub const fn label(self) -> &'static str {
        match self {
            VolunteerRole::Admin => "admin",
            VolunteerRole::Foster => "foster",
            VolunteerRole::Interviewer => "interviewer",
            VolunteerRole::Coordinator => "coordinator",
        }
    }
}

/// Shelter staff member or volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: VolunteerRole,
    /// Opaque credential owned by the authentication layer.
    #[serde(skip_serializing, default)]
    pub credential: String,
}

impl Volunteer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Descriptive attributes captured at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimalProfile {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub photo_gallery: Vec<String>,
    #[serde(default)]
    pub vaccinated: bool,
    #[serde(default)]
    pub neutered: bool,
    #[serde(default)]
    pub good_with_children: bool,
    #[serde(default)]
    pub good_with_dogs: bool,
    #[serde(default)]
    pub good_with_cats: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub adoption_fee: Option<u32>,
    #[serde(default)]
    pub intake_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub unique_id: ShelterId,
    #[serde(flatten)]
    pub profile: AnimalProfile,
    pub status: AnimalStatus,
    /// Volunteer who created (or was assigned) the record.
    pub volunteer_id: Option<VolunteerId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: ApplicantId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub interview_language: Option<String>,
    #[serde(default)]
    pub home_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub animal_id: ShelterId,
    pub applicant_id: ApplicantId,
    pub status: ApplicationStatus,
    /// Free-form questionnaire answers.
    pub answers: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub id: InterviewId,
    pub application_id: ApplicationId,
    pub volunteer_id: VolunteerId,
    pub applicant_id: ApplicantId,
    pub interview_time: DateTime<Utc>,
    pub interview_result: InterviewOutcome,
    /// Interviewer name copied at scheduling time; does not follow later renames.
    pub volunteer_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub applicant_id: ApplicantId,
    pub animal_id: ShelterId,
    pub payment_proof: String,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

// Caller inputs. Field presence and format are checked upstream.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalIntake {
    #[serde(flatten)]
    pub profile: AnimalProfile,
    /// Owner requested by an admin; ignored for fosters.
    #[serde(default)]
    pub volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnimalUpdate {
    #[serde(default)]
    pub profile: Option<AnimalProfile>,
    #[serde(default)]
    pub volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: VolunteerRole,
    #[serde(default)]
    pub credential: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VolunteerUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<VolunteerRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub interview_language: Option<String>,
    #[serde(default)]
    pub home_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApplicantUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub animal_id: ShelterId,
    pub applicant_id: ApplicantId,
    #[serde(default)]
    pub answers: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewRequest {
    pub application_id: ApplicationId,
    pub volunteer_id: VolunteerId,
    pub applicant_id: ApplicantId,
    pub interview_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRequest {
    pub applicant_id: ApplicantId,
    pub animal_id: ShelterId,
    pub payment_proof: String,
    #[serde(default)]
    pub signature: Option<String>,
}

// List queries. Each narrows the listing of one kind.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnimalQuery {
    #[serde(default)]
    pub status: Option<AnimalStatus>,
    #[serde(default)]
    pub volunteer_id: Option<VolunteerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApplicationQuery {
    #[serde(default)]
    pub animal_id: Option<ShelterId>,
    #[serde(default)]
    pub applicant_id: Option<ApplicantId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InterviewQuery {
    #[serde(default)]
    pub application_id: Option<ApplicationId>,
    #[serde(default)]
    pub volunteer_id: Option<VolunteerId>,
    #[serde(default)]
    pub applicant_id: Option<ApplicantId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContractQuery {
    #[serde(default)]
    pub applicant_id: Option<ApplicantId>,
    #[serde(default)]
    pub animal_id: Option<ShelterId>,
}

/// Anonymous animal listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicListing {
    /// Published and waiting for a home.
    Available,
    Adopted,
}

impl PublicListing {
    pub const fn status(self) -> AnimalStatus {
        match self {
            PublicListing::Available => AnimalStatus::Published,
            PublicListing::Adopted => AnimalStatus::Adopted,
        }
    }
}

// Joined projections. These are read-only denormalizations, never stored.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerSummary {
    pub id: VolunteerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Volunteer> for VolunteerSummary {
    fn from(volunteer: &Volunteer) -> Self {
        Self {
            id: volunteer.id,
            first_name: volunteer.first_name.clone(),
            last_name: volunteer.last_name.clone(),
            email: volunteer.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub id: ApplicantId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Applicant> for ApplicantSummary {
    fn from(applicant: &Applicant) -> Self {
        Self {
            id: applicant.id,
            first_name: applicant.first_name.clone(),
            last_name: applicant.last_name.clone(),
            email: applicant.email.clone(),
        }
    }
}

/// Animal fields projected onto applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalSummary {
    pub unique_id: ShelterId,
    pub name: String,
    pub species: String,
    pub photo_gallery: Vec<String>,
}

impl From<&Animal> for AnimalSummary {
    fn from(animal: &Animal) -> Self {
        Self {
            unique_id: animal.unique_id.clone(),
            name: animal.profile.name.clone(),
            species: animal.profile.species.clone(),
            photo_gallery: animal.profile.photo_gallery.clone(),
        }
    }
}

/// Animal fields projected onto contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalBrief {
    pub unique_id: ShelterId,
    pub name: String,
    pub species: String,
}

impl From<&Animal> for AnimalBrief {
    fn from(animal: &Animal) -> Self {
        Self {
            unique_id: animal.unique_id.clone(),
            name: animal.profile.name.clone(),
            species: animal.profile.species.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
}

impl From<&Application> for ApplicationSummary {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id,
            status: application.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalView {
    #[serde(flatten)]
    pub animal: Animal,
    pub volunteer: Option<VolunteerSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub animal: Option<AnimalSummary>,
    pub applicant: Option<ApplicantSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewView {
    #[serde(flatten)]
    pub interview: Interview,
    pub application: Option<ApplicationSummary>,
    pub volunteer: Option<VolunteerSummary>,
    pub applicant: Option<ApplicantSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: Contract,
    pub applicant: Option<ApplicantSummary>,
    pub animal: Option<AnimalBrief>,
}
