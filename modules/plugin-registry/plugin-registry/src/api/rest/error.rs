use plugin_registry_sdk::RegistryError;

use super::problem::{self, Problem};

/// Map a registry error to an RFC 9457 Problem.
pub fn registry_error_to_problem(e: &RegistryError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        RegistryError::InvalidArgument { message } => {
            problem::bad_request(message.clone()).with_code("PLUGIN_REGISTRY_INVALID_ARGUMENT")
        }
        RegistryError::NotFound { .. } => {
            problem::not_found(e.to_string()).with_code("PLUGIN_REGISTRY_NOT_FOUND")
        }
        RegistryError::Conflict { message } => {
            problem::conflict(message.clone()).with_code("PLUGIN_REGISTRY_CONFLICT")
        }
        RegistryError::Internal { message } => {
            tracing::error!(error = %message, "Internal error serving registry request");
            problem::internal_error("An internal error occurred")
                .with_code("PLUGIN_REGISTRY_INTERNAL")
        }
    };

    problem.with_instance(instance).with_trace_id(trace_id)
}

/// Implement `From<RegistryError>` for Problem so `?` works in handlers.
impl From<RegistryError> for Problem {
    fn from(e: RegistryError) -> Self {
        registry_error_to_problem(&e, "/")
    }
}
