//! Access decisions for every (role, entity kind, operation) triple.
//!
//! [`AccessPolicy`] is pure: it reads nothing but its arguments, so identical inputs always
//! produce identical verdicts. Ownership-dependent rules are answered in two steps: a
//! role-level [`AccessPolicy::precheck`] before the store is touched, then
//! [`AccessPolicy::decide`] once the target record is known. List operations never consult
//! ownership per record; they are narrowed up front through [`AccessPolicy::scope`].

mod table;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantId, VolunteerId};
use super::identity::{IdentityContext, Role};
use super::store::{EntityKind, Filter};

pub use table::Rule;

/// Operations the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    List,
    View,
    /// Anonymous listing of published or adopted animals.
    PublicList,
    Create,
    Update,
    ChangeStatus,
    Delete,
    Reschedule,
    RecordOutcome,
    Sign,
}

impl Operation {
    pub const fn label(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::View => "view",
            Operation::PublicList => "public list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::ChangeStatus => "change status of",
            Operation::Delete => "delete",
            Operation::Reschedule => "reschedule",
            Operation::RecordOutcome => "record outcome of",
            Operation::Sign => "sign",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ownership facts about the record an operation targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessContext {
    /// Volunteer recorded on the target animal.
    pub owner: Option<VolunteerId>,
    /// Applicant the target record belongs to.
    pub applicant: Option<ApplicantId>,
}

impl AccessContext {
    pub fn owned_by(owner: Option<VolunteerId>) -> Self {
        Self {
            owner,
            applicant: None,
        }
    }

    pub fn for_applicant(applicant: ApplicantId) -> Self {
        Self {
            owner: None,
            applicant: Some(applicant),
        }
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DenialReason {
    #[error("authentication required to {operation} {kind}")]
    Unauthenticated {
        kind: EntityKind,
        operation: Operation,
    },
    #[error("role {role} may not {operation} {kind}")]
    RoleNotPermitted {
        role: Role,
        kind: EntityKind,
        operation: Operation,
    },
    #[error("role {role} may only {operation} its own {kind} records")]
    NotOwner {
        role: Role,
        kind: EntityKind,
        operation: Operation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenialReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Result-set narrowing applied to list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    OwnedBy(VolunteerId),
    Applicant(ApplicantId),
}

impl Scope {
    /// Intersects a caller-supplied filter with the scope.
    ///
    /// Returns `None` when the caller asked for records outside the scope, meaning the
    /// result set is empty.
    pub fn narrow(self, mut filter: Filter) -> Option<Filter> {
        match self {
            Scope::All => Some(filter),
            Scope::OwnedBy(owner) => match filter.owner {
                Some(requested) if requested != owner => None,
                _ => {
                    filter.owner = Some(owner);
                    Some(filter)
                }
            },
            Scope::Applicant(applicant) => match filter.applicant {
                Some(requested) if requested != applicant => None,
                _ => {
                    filter.applicant = Some(applicant);
                    Some(filter)
                }
            },
        }
    }
}

/// Stateless decision table.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Raw table entry for a role.
    pub fn rule_for(&self, role: Role, kind: EntityKind, operation: Operation) -> Rule {
        table::rule(kind, operation, role)
    }

    pub fn is_public(&self, kind: EntityKind, operation: Operation) -> bool {
        table::is_public(kind, operation)
    }

    /// Role-level verdict, before any target is loaded. Ownership rules pass here and are
    /// settled later by [`decide`](Self::decide) or [`scope`](Self::scope).
    pub fn precheck(
        &self,
        identity: Option<&IdentityContext>,
        kind: EntityKind,
        operation: Operation,
    ) -> Decision {
        match self.lookup(identity, kind, operation) {
            Ok((_, Rule::Public | Rule::Allow | Rule::OwnerOnly | Rule::ApplicantOnly)) => {
                Decision::Allow
            }
            Ok((role, Rule::Deny)) => Decision::Deny(DenialReason::RoleNotPermitted {
                role,
                kind,
                operation,
            }),
            Err(reason) => Decision::Deny(reason),
        }
    }

    /// Full verdict for an operation on a known target.
    pub fn decide(
        &self,
        identity: Option<&IdentityContext>,
        kind: EntityKind,
        operation: Operation,
        context: &AccessContext,
    ) -> Decision {
        let (role, rule) = match self.lookup(identity, kind, operation) {
            Ok(found) => found,
            Err(reason) => return Decision::Deny(reason),
        };

        let owns = match (rule, identity) {
            (Rule::Public | Rule::Allow, _) => true,
            (Rule::Deny, _) => {
                return Decision::Deny(DenialReason::RoleNotPermitted {
                    role,
                    kind,
                    operation,
                })
            }
            (Rule::OwnerOnly, Some(identity)) => {
                identity.volunteer_id().is_some() && identity.volunteer_id() == context.owner
            }
            (Rule::ApplicantOnly, Some(identity)) => {
                identity.applicant_id().is_some() && identity.applicant_id() == context.applicant
            }
            (Rule::OwnerOnly | Rule::ApplicantOnly, None) => false,
        };

        if owns {
            Decision::Allow
        } else {
            Decision::Deny(DenialReason::NotOwner {
                role,
                kind,
                operation,
            })
        }
    }

    /// Narrowing for list operations. Roles with no list right are denied outright.
    pub fn scope(
        &self,
        identity: Option<&IdentityContext>,
        kind: EntityKind,
    ) -> Result<Scope, DenialReason> {
        let (role, rule) = self.lookup(identity, kind, Operation::List)?;
        match (rule, identity) {
            (Rule::Public | Rule::Allow, _) => Ok(Scope::All),
            (Rule::OwnerOnly, Some(identity)) => identity
                .volunteer_id()
                .map(Scope::OwnedBy)
                .ok_or(DenialReason::RoleNotPermitted {
                    role,
                    kind,
                    operation: Operation::List,
                }),
            (Rule::ApplicantOnly, Some(identity)) => identity
                .applicant_id()
                .map(Scope::Applicant)
                .ok_or(DenialReason::RoleNotPermitted {
                    role,
                    kind,
                    operation: Operation::List,
                }),
            _ => Err(DenialReason::RoleNotPermitted {
                role,
                kind,
                operation: Operation::List,
            }),
        }
    }

    fn lookup(
        &self,
        identity: Option<&IdentityContext>,
        kind: EntityKind,
        operation: Operation,
    ) -> Result<(Role, Rule), DenialReason> {
        match identity {
            Some(identity) => Ok((identity.role(), table::rule(kind, operation, identity.role()))),
            None if table::is_public(kind, operation) => Ok((Role::Unrecognized, Rule::Public)),
            None => Err(DenialReason::Unauthenticated { kind, operation }),
        }
    }
}
