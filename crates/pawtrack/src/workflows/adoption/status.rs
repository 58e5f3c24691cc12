//! Status enumerations for the adoption pipeline and the rule that guards changes to them.
//!
//! Every change is explicit. The machine only rejects values outside an entity's
//! enumeration; it does not restrict which enumerated state may follow which.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity kinds that carry a status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Animal,
    Application,
    InterviewOutcome,
}

impl StatusKind {
    pub const fn label(self) -> &'static str {
        match self {
            StatusKind::Animal => "animal status",
            StatusKind::Application => "application status",
            StatusKind::InterviewOutcome => "interview outcome",
        }
    }

    /// Labels accepted for this kind, in declaration order.
    pub fn allowed(self) -> Vec<&'static str> {
        match self {
            StatusKind::Animal => AnimalStatus::ALL.iter().map(|s| s.label()).collect(),
            StatusKind::Application => ApplicationStatus::ALL.iter().map(|s| s.label()).collect(),
            StatusKind::InterviewOutcome => {
                InterviewOutcome::ALL.iter().map(|s| s.label()).collect()
            }
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared behavior of the per-kind status enumerations.
pub trait Lifecycle: Copy + Eq + fmt::Debug + 'static {
    const KIND: StatusKind;
    const ALL: &'static [Self];
    const INITIAL: Self;

    fn label(self) -> &'static str;

    /// Matches a requested value against the enumeration (trimmed, case-insensitive).
    fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|state| state.label().eq_ignore_ascii_case(wanted))
    }
}

/// Lifecycle of an animal record. No state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    #[default]
    Draft,
    Published,
    Fostering,
    Adopted,
}

impl Lifecycle for AnimalStatus {
    const KIND: StatusKind = StatusKind::Animal;
    const ALL: &'static [Self] = &[
        AnimalStatus::Draft,
        AnimalStatus::Published,
        AnimalStatus::Fostering,
        AnimalStatus::Adopted,
    ];
    const INITIAL: Self = AnimalStatus::Draft;

    fn label(self) -> &'static str {
        match self {
            AnimalStatus::Draft => "draft",
            AnimalStatus::Published => "published",
            AnimalStatus::Fostering => "fostering",
            AnimalStatus::Adopted => "adopted",
        }
    }
}

/// Review state of an adoption application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Submitted,
    UnderReview,
    Approved,
    Rejected,
}

impl Lifecycle for ApplicationStatus {
    const KIND: StatusKind = StatusKind::Application;
    const ALL: &'static [Self] = &[
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];
    const INITIAL: Self = ApplicationStatus::Submitted;

    fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Result recorded by the interviewer. Can be re-set to correct mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterviewOutcome {
    #[default]
    Pending,
    Passed,
    Failed,
}

impl Lifecycle for InterviewOutcome {
    const KIND: StatusKind = StatusKind::InterviewOutcome;
    const ALL: &'static [Self] = &[
        InterviewOutcome::Pending,
        InterviewOutcome::Passed,
        InterviewOutcome::Failed,
    ];
    const INITIAL: Self = InterviewOutcome::Pending;

    fn label(self) -> &'static str {
        match self {
            InterviewOutcome::Pending => "pending",
            InterviewOutcome::Passed => "passed",
            InterviewOutcome::Failed => "failed",
        }
    }
}

/// Raised when a requested status is outside the enumeration for its kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{requested}' is not a valid {kind} (expected one of: {})", .kind.allowed().join(", "))]
pub struct InvalidTransition {
    pub kind: StatusKind,
    pub requested: String,
}

/// An accepted status change, kept for logging and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub from: S,
    pub to: S,
}

impl<S: Lifecycle> StatusChange<S> {
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Validates a requested status against the current one.
///
/// Any enumerated value is reachable from any other, including itself.
pub fn validate_transition<S: Lifecycle>(
    current: S,
    requested: &str,
) -> Result<StatusChange<S>, InvalidTransition> {
    let to = S::parse(requested).ok_or_else(|| InvalidTransition {
        kind: S::KIND,
        requested: requested.to_string(),
    })?;
    Ok(StatusChange { from: current, to })
}

/// Resolves the status a new record starts with: the kind's initial value, or a validated override.
pub fn initial_status<S: Lifecycle>(requested: Option<&str>) -> Result<S, InvalidTransition> {
    match requested {
        Some(raw) => validate_transition(S::INITIAL, raw).map(|change| change.to),
        None => Ok(S::INITIAL),
    }
}
