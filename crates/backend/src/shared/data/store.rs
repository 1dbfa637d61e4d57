//! Capability traits over the document store
//!
//! The engine never talks to a database directly: services receive a
//! `&dyn DocumentStore` and use the per-aggregate traits below. Every
//! operation is async and may fail with [`StoreError`]. The store assigns
//! creation and update timestamps and returns the stored document.
//!
//! Deletes are idempotent: deleting a missing document returns `Ok(false)`.
//! Updating a missing document fails with [`StoreError::Missing`].

use async_trait::async_trait;
use thiserror::Error;

use contracts::domain::a001_project::aggregate::{Project, ProjectId};
use contracts::domain::a002_project_member::aggregate::{MemberId, ProjectMember};
use contracts::domain::a003_collection::aggregate::{Collection, CollectionId};
use contracts::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use contracts::domain::a005_data_record::aggregate::{DataRecord, RecordId};
use contracts::domain::common::AggregateRoot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: String },

    #[error("stored {entity} {id} cannot be read: {message}")]
    Corrupt {
        entity: &'static str,
        id: String,
        message: String,
    },
}

impl StoreError {
    /// Update target that does not exist
    pub fn missing<A: AggregateRoot>(id: impl ToString) -> Self {
        StoreError::Missing {
            entity: A::element_name(),
            id: id.to_string(),
        }
    }

    pub fn corrupt(entity: &'static str, id: impl ToString, message: impl ToString) -> Self {
        StoreError::Corrupt {
            entity,
            id: id.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(e: sea_orm::DbErr) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(&self, project: &Project) -> StoreResult<Project>;
    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>>;
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;
    async fn update_project(&self, project: &Project) -> StoreResult<Project>;
    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn create_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember>;
    async fn get_member(&self, id: MemberId) -> StoreResult<Option<ProjectMember>>;
    async fn list_members_by_project(&self, project_id: ProjectId)
        -> StoreResult<Vec<ProjectMember>>;
    async fn list_members_by_user(&self, user_id: &str) -> StoreResult<Vec<ProjectMember>>;
    async fn update_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember>;
    async fn delete_member(&self, id: MemberId) -> StoreResult<bool>;
}

#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn create_collection(&self, collection: &Collection) -> StoreResult<Collection>;
    async fn get_collection(&self, id: CollectionId) -> StoreResult<Option<Collection>>;
    async fn list_collections_by_project(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<Collection>>;
    async fn update_collection(&self, collection: &Collection) -> StoreResult<Collection>;
    async fn delete_collection(&self, id: CollectionId) -> StoreResult<bool>;
}

#[async_trait]
pub trait FieldDefinitionStore: Send + Sync {
    async fn create_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition>;
    async fn get_field(&self, id: FieldDefinitionId) -> StoreResult<Option<FieldDefinition>>;
    /// Fields of a collection sorted by `order`
    async fn list_fields_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<FieldDefinition>>;
    async fn update_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition>;
    async fn delete_field(&self, id: FieldDefinitionId) -> StoreResult<bool>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(&self, record: &DataRecord) -> StoreResult<DataRecord>;
    async fn get_record(&self, id: RecordId) -> StoreResult<Option<DataRecord>>;
    /// Records of a collection, newest first
    async fn list_records_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<DataRecord>>;
    async fn count_records_by_collection(&self, collection_id: CollectionId) -> StoreResult<usize>;
    async fn update_record(&self, record: &DataRecord) -> StoreResult<DataRecord>;
    async fn delete_record(&self, id: RecordId) -> StoreResult<bool>;
}

/// Every capability the services need, as one injectable object
pub trait DocumentStore:
    ProjectStore + MemberStore + CollectionStore + FieldDefinitionStore + RecordStore
{
}

impl<T> DocumentStore for T where
    T: ProjectStore + MemberStore + CollectionStore + FieldDefinitionStore + RecordStore
{
}
