use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantId, VolunteerId};

/// Coarse actor category supplied by the upstream authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator or adoption coordinator.
    Admin,
    Foster,
    Interviewer,
    Applicant,
    /// Any role string the shelter does not recognize. Denied everything non-public.
    Unrecognized,
}

impl Role {
    /// Parses a role claim case-insensitively, folding the legacy aliases.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" | "coordinator" => Role::Admin,
            "foster" => Role::Foster,
            "interviewer" | "adoption interviewer" | "adoption_interviewer" => Role::Interviewer,
            "applicant" => Role::Applicant,
            _ => Role::Unrecognized,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Foster => "foster",
            Role::Interviewer => "interviewer",
            Role::Applicant => "applicant",
            Role::Unrecognized => "unrecognized",
        }
    }

    /// Volunteer roles act on behalf of a volunteer record.
    pub const fn is_volunteer(self) -> bool {
        matches!(self, Role::Admin | Role::Foster | Role::Interviewer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque subject identifier carried in the identity claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub u64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Acting role and subject for one request. Trusted verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityContext {
    role: Role,
    subject: SubjectId,
}

impl IdentityContext {
    pub fn new(role: Role, subject: SubjectId) -> Self {
        Self { role, subject }
    }

    /// Builds a context from the raw claim pair handed over by the identity provider.
    pub fn from_claims(role: &str, subject: u64) -> Self {
        Self::new(Role::parse(role), SubjectId(subject))
    }

    pub fn admin(volunteer: VolunteerId) -> Self {
        Self::new(Role::Admin, SubjectId(volunteer.0))
    }

    pub fn foster(volunteer: VolunteerId) -> Self {
        Self::new(Role::Foster, SubjectId(volunteer.0))
    }

    pub fn interviewer(volunteer: VolunteerId) -> Self {
        Self::new(Role::Interviewer, SubjectId(volunteer.0))
    }

    pub fn applicant(applicant: ApplicantId) -> Self {
        Self::new(Role::Applicant, SubjectId(applicant.0))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    /// The volunteer this identity acts as, if it carries a volunteer role.
    pub fn volunteer_id(&self) -> Option<VolunteerId> {
        self.role
            .is_volunteer()
            .then_some(VolunteerId(self.subject.0))
    }

    /// The applicant this identity acts as, if it carries the applicant role.
    pub fn applicant_id(&self) -> Option<ApplicantId> {
        (self.role == Role::Applicant).then_some(ApplicantId(self.subject.0))
    }
}

impl fmt::Display for IdentityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.role, self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_case_insensitive_and_folds_aliases() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse(" Coordinator "), Role::Admin);
        assert_eq!(Role::parse("Adoption Interviewer"), Role::Interviewer);
        assert_eq!(Role::parse("Foster"), Role::Foster);
        assert_eq!(Role::parse("applicant"), Role::Applicant);
        assert_eq!(Role::parse("janitor"), Role::Unrecognized);
    }

    #[test]
    fn subject_projection_follows_role() {
        let foster = IdentityContext::from_claims("foster", 7);
        assert_eq!(foster.volunteer_id(), Some(VolunteerId(7)));
        assert_eq!(foster.applicant_id(), None);

        let applicant = IdentityContext::from_claims("Applicant", 9);
        assert_eq!(applicant.volunteer_id(), None);
        assert_eq!(applicant.applicant_id(), Some(ApplicantId(9)));

        let unknown = IdentityContext::from_claims("guest", 3);
        assert_eq!(unknown.volunteer_id(), None);
        assert_eq!(unknown.applicant_id(), None);
    }
}
