use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::adoption::policy::DenialReason;
use crate::workflows::adoption::WorkflowError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Workflow(WorkflowError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Workflow(err) => workflow_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::AuthorizationDenied(DenialReason::Unauthenticated { .. }) => {
            StatusCode::UNAUTHORIZED
        }
        WorkflowError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::Conflict { .. } => StatusCode::CONFLICT,
        WorkflowError::AllocationConflict { .. } | WorkflowError::StorageUnavailable(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Workflow(err) => write!(f, "workflow error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Workflow(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Workflow messages go out without the wrapper prefix.
        let message = match &self {
            AppError::Workflow(err) => err.to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::adoption::policy::Operation;
    use crate::workflows::adoption::status::{InvalidTransition, StatusKind};
    use crate::workflows::adoption::store::{EntityKey, EntityKind};

    #[test]
    fn workflow_errors_map_to_http_statuses() {
        let cases = [
            (
                WorkflowError::AuthorizationDenied(DenialReason::Unauthenticated {
                    kind: EntityKind::Animal,
                    operation: Operation::List,
                }),
                StatusCode::UNAUTHORIZED,
            ),
            (
                WorkflowError::AuthorizationDenied(DenialReason::NotOwner {
                    role: crate::workflows::adoption::identity::Role::Foster,
                    kind: EntityKind::Animal,
                    operation: Operation::View,
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                WorkflowError::NotFound {
                    kind: EntityKind::Contract,
                    key: EntityKey::Serial(9),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                WorkflowError::InvalidTransition(InvalidTransition {
                    kind: StatusKind::Animal,
                    requested: "archived".to_string(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                WorkflowError::AllocationConflict { attempts: 5 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn config_errors_are_internal() {
        let err = AppError::from(ConfigError::InvalidPort);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("configuration error"));
    }
}
