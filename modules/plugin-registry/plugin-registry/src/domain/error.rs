use plugin_registry_sdk::RegistryError;
use thiserror::Error;
use uuid::Uuid;

/// Internal error type of the domain layer.
///
/// Repository implementations map their backend failures into
/// [`DomainError::Database`]; everything else is produced by the services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<DomainError> for RegistryError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidArgument { message } => Self::InvalidArgument { message },
            DomainError::NotFound { entity, id } => Self::NotFound { entity, id },
            DomainError::Conflict { message } => Self::Conflict { message },
            DomainError::Database { message } => Self::Internal { message },
        }
    }
}
