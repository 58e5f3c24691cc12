use super::super::identity::Role;
use super::super::store::EntityKind;
use super::Operation;

/// What the table grants a role for one (kind, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Open to anyone, authenticated or not.
    Public,
    Allow,
    /// Only when the volunteer subject owns the target animal.
    OwnerOnly,
    /// Only when the applicant subject is the one the target refers to.
    ApplicantOnly,
    Deny,
}

/// The fixed decision table keyed by (kind, operation, role).
pub(crate) fn rule(kind: EntityKind, operation: Operation, role: Role) -> Rule {
    use EntityKind as K;
    use Operation as O;
    use Role as R;

    match (kind, operation) {
        (K::Animal, O::PublicList)
        | (K::Application, O::Create)
        | (K::Applicant, O::Create) => Rule::Public,

        (K::Animal, O::List | O::View) => match role {
            R::Admin => Rule::Allow,
            R::Foster => Rule::OwnerOnly,
            _ => Rule::Deny,
        },
        (K::Animal, O::Create) => match role {
            R::Admin | R::Foster => Rule::Allow,
            _ => Rule::Deny,
        },
        (K::Animal, O::Update | O::ChangeStatus | O::Delete) => admin_only(role),

        (K::Application, O::List | O::View) => match role {
            R::Admin | R::Interviewer => Rule::Allow,
            R::Applicant => Rule::ApplicantOnly,
            _ => Rule::Deny,
        },
        (K::Application, O::ChangeStatus) => match role {
            R::Admin | R::Interviewer => Rule::Allow,
            _ => Rule::Deny,
        },
        (K::Application, O::Delete) => admin_only(role),

        (K::Interview, O::List | O::View) => match role {
            R::Admin | R::Interviewer => Rule::Allow,
            R::Applicant => Rule::ApplicantOnly,
            _ => Rule::Deny,
        },
        (K::Interview, O::Create | O::Reschedule) => match role {
            R::Admin | R::Interviewer => Rule::Allow,
            _ => Rule::Deny,
        },
        (K::Interview, O::RecordOutcome) => match role {
            R::Interviewer => Rule::Allow,
            _ => Rule::Deny,
        },
        (K::Interview, O::Delete) => admin_only(role),

        (K::Contract, O::List | O::View | O::Sign) => match role {
            R::Admin => Rule::Allow,
            R::Applicant => Rule::ApplicantOnly,
            _ => Rule::Deny,
        },
        (K::Contract, O::Create | O::Delete) => admin_only(role),

        (K::Applicant, O::List | O::View) => match role {
            R::Admin | R::Interviewer => Rule::Allow,
            R::Applicant => Rule::ApplicantOnly,
            _ => Rule::Deny,
        },
        (K::Applicant, O::Update | O::Delete) => admin_only(role),

        (K::Volunteer, O::List | O::View | O::Create | O::Update | O::Delete) => admin_only(role),

        _ => Rule::Deny,
    }
}

fn admin_only(role: Role) -> Rule {
    if role == Role::Admin {
        Rule::Allow
    } else {
        Rule::Deny
    }
}

/// Whether the pair is open to unauthenticated callers.
pub(crate) fn is_public(kind: EntityKind, operation: Operation) -> bool {
    rule(kind, operation, Role::Unrecognized) == Rule::Public
}
