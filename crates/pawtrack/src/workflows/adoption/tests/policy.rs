use super::common::*;

use crate::workflows::adoption::domain::{ApplicantId, VolunteerId};
use crate::workflows::adoption::identity::{IdentityContext, Role, SubjectId};
use crate::workflows::adoption::policy::{
    AccessContext, AccessPolicy, Decision, DenialReason, Operation, Rule, Scope,
};
use crate::workflows::adoption::store::{EntityKind, Filter};

const KINDS: [EntityKind; 6] = [
    EntityKind::Animal,
    EntityKind::Volunteer,
    EntityKind::Applicant,
    EntityKind::Application,
    EntityKind::Interview,
    EntityKind::Contract,
];

const OPERATIONS: [Operation; 10] = [
    Operation::List,
    Operation::View,
    Operation::PublicList,
    Operation::Create,
    Operation::Update,
    Operation::ChangeStatus,
    Operation::Delete,
    Operation::Reschedule,
    Operation::RecordOutcome,
    Operation::Sign,
];

fn identities() -> Vec<Option<IdentityContext>> {
    vec![
        None,
        Some(admin()),
        Some(foster()),
        Some(interviewer()),
        Some(applicant()),
        Some(IdentityContext::from_claims("janitor", 9)),
    ]
}

#[test]
fn decide_is_deterministic_for_identical_inputs() {
    let policy = AccessPolicy::new();
    let contexts = [
        AccessContext::default(),
        AccessContext::owned_by(Some(FOSTER)),
        AccessContext::for_applicant(APPLICANT),
    ];

    for identity in identities() {
        for kind in KINDS {
            for operation in OPERATIONS {
                for context in &contexts {
                    let first = policy.decide(identity.as_ref(), kind, operation, context);
                    let second =
                        AccessPolicy::new().decide(identity.as_ref(), kind, operation, context);
                    assert_eq!(first, second, "{kind} {operation} for {identity:?}");
                }
            }
        }
    }
}

#[test]
fn only_three_operations_are_open_to_anonymous_callers() {
    let policy = AccessPolicy::new();
    let mut public = Vec::new();
    for kind in KINDS {
        for operation in OPERATIONS {
            if policy.is_public(kind, operation) {
                public.push((kind, operation));
            } else {
                assert_eq!(
                    policy.precheck(None, kind, operation),
                    Decision::Deny(DenialReason::Unauthenticated { kind, operation })
                );
            }
        }
    }

    assert_eq!(
        public,
        vec![
            (EntityKind::Animal, Operation::PublicList),
            (EntityKind::Applicant, Operation::Create),
            (EntityKind::Application, Operation::Create),
        ]
    );
}

#[test]
fn unrecognized_roles_get_nothing_beyond_public_operations() {
    let policy = AccessPolicy::new();
    let stranger = IdentityContext::from_claims("janitor", 9);
    assert_eq!(stranger.role(), Role::Unrecognized);

    for kind in KINDS {
        for operation in OPERATIONS {
            let decision = policy.decide(Some(&stranger), kind, operation, &AccessContext::default());
            assert_eq!(
                decision.is_allowed(),
                policy.is_public(kind, operation),
                "{kind} {operation}"
            );
        }
    }
}

#[test]
fn coordinator_and_interviewer_aliases_resolve_to_table_roles() {
    let policy = AccessPolicy::new();
    let coordinator = IdentityContext::from_claims("Coordinator", 1);
    let adoption_interviewer = IdentityContext::from_claims("Adoption Interviewer", 4);

    assert!(policy
        .decide(
            Some(&coordinator),
            EntityKind::Contract,
            Operation::Delete,
            &AccessContext::default()
        )
        .is_allowed());
    assert!(policy
        .decide(
            Some(&adoption_interviewer),
            EntityKind::Interview,
            Operation::RecordOutcome,
            &AccessContext::default()
        )
        .is_allowed());
}

#[test]
fn foster_may_only_view_animals_it_owns() {
    let policy = AccessPolicy::new();
    let identity = foster();

    assert!(policy
        .decide(
            Some(&identity),
            EntityKind::Animal,
            Operation::View,
            &AccessContext::owned_by(Some(FOSTER))
        )
        .is_allowed());
    assert_eq!(
        policy.decide(
            Some(&identity),
            EntityKind::Animal,
            Operation::View,
            &AccessContext::owned_by(Some(OTHER_FOSTER))
        ),
        Decision::Deny(DenialReason::NotOwner {
            role: Role::Foster,
            kind: EntityKind::Animal,
            operation: Operation::View,
        })
    );
    assert!(!policy
        .decide(
            Some(&identity),
            EntityKind::Animal,
            Operation::View,
            &AccessContext::owned_by(None)
        )
        .is_allowed());
}

#[test]
fn foster_is_refused_animal_updates_before_ownership_matters() {
    let policy = AccessPolicy::new();
    let identity = foster();
    assert_eq!(
        policy.precheck(Some(&identity), EntityKind::Animal, Operation::Update),
        Decision::Deny(DenialReason::RoleNotPermitted {
            role: Role::Foster,
            kind: EntityKind::Animal,
            operation: Operation::Update,
        })
    );
}

#[test]
fn only_interviewers_record_outcomes() {
    let policy = AccessPolicy::new();
    assert_eq!(
        policy.rule_for(Role::Interviewer, EntityKind::Interview, Operation::RecordOutcome),
        Rule::Allow
    );
    assert_eq!(
        policy.rule_for(Role::Admin, EntityKind::Interview, Operation::RecordOutcome),
        Rule::Deny
    );
    assert_eq!(
        policy.rule_for(Role::Admin, EntityKind::Interview, Operation::Reschedule),
        Rule::Allow
    );
}

#[test]
fn applicants_sign_only_their_own_contracts() {
    let policy = AccessPolicy::new();
    let identity = applicant();

    assert!(policy
        .decide(
            Some(&identity),
            EntityKind::Contract,
            Operation::Sign,
            &AccessContext::for_applicant(APPLICANT)
        )
        .is_allowed());
    assert!(!policy
        .decide(
            Some(&identity),
            EntityKind::Contract,
            Operation::Sign,
            &AccessContext::for_applicant(OTHER_APPLICANT)
        )
        .is_allowed());
    assert!(!policy
        .decide(
            Some(&identity),
            EntityKind::Contract,
            Operation::Create,
            &AccessContext::for_applicant(APPLICANT)
        )
        .is_allowed());
}

#[test]
fn list_scope_narrows_fosters_and_applicants() {
    let policy = AccessPolicy::new();

    assert_eq!(
        policy.scope(Some(&admin()), EntityKind::Animal),
        Ok(Scope::All)
    );
    assert_eq!(
        policy.scope(Some(&foster()), EntityKind::Animal),
        Ok(Scope::OwnedBy(FOSTER))
    );
    assert_eq!(
        policy.scope(Some(&applicant()), EntityKind::Application),
        Ok(Scope::Applicant(APPLICANT))
    );
    assert!(policy.scope(Some(&foster()), EntityKind::Application).is_err());
    assert!(policy.scope(None, EntityKind::Contract).is_err());
}

#[test]
fn scope_refuses_filters_that_reach_outside_it() {
    let owned = Scope::OwnedBy(VolunteerId(2));
    assert_eq!(
        owned.narrow(Filter::all()),
        Some(Filter::owned_by(VolunteerId(2)))
    );
    assert_eq!(owned.narrow(Filter::owned_by(VolunteerId(3))), None);

    let own_records = Scope::Applicant(ApplicantId(1));
    let foreign = Filter {
        applicant: Some(ApplicantId(5)),
        ..Filter::default()
    };
    assert_eq!(own_records.narrow(foreign), None);
}

#[test]
fn subject_is_not_reinterpreted_across_roles() {
    let policy = AccessPolicy::new();
    // Applicant 2 and foster 2 share a numeric subject but not an identity.
    let applicant_two = IdentityContext::new(Role::Applicant, SubjectId(2));
    assert!(!policy
        .decide(
            Some(&applicant_two),
            EntityKind::Animal,
            Operation::View,
            &AccessContext::owned_by(Some(VolunteerId(2)))
        )
        .is_allowed());
}
