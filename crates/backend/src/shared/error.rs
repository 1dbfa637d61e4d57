//! Error type of the service layer

use contracts::domain::common::AggregateRoot;
use contracts::shared::records::RecordValidationErrors;
use contracts::shared::schema::SchemaError;
use thiserror::Error;

use crate::shared::data::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Per-field validation errors of a submitted record
    #[error("record validation failed: {0}")]
    Validation(RecordValidationErrors),

    #[error("schema rejected: {0}")]
    Schema(#[from] SchemaError),

    /// Malformed input that is not tied to one field (bad id, blank name)
    #[error("{0}")]
    Invalid(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    StoreUnavailable(StoreError),
}

impl ServiceError {
    /// Absent aggregate, named by [`AggregateRoot::element_name`]
    pub fn missing<A: AggregateRoot>(id: impl ToString) -> Self {
        Self::not_found(A::element_name(), id)
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Missing { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::StoreUnavailable(other),
        }
    }
}

impl From<RecordValidationErrors> for ServiceError {
    fn from(e: RecordValidationErrors) -> Self {
        ServiceError::Validation(e)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
