//! Process-local document store for tests and demos

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use contracts::domain::a001_project::aggregate::{Project, ProjectId};
use contracts::domain::a002_project_member::aggregate::{MemberId, ProjectMember};
use contracts::domain::a003_collection::aggregate::{Collection, CollectionId};
use contracts::domain::a004_field_definition::aggregate::{FieldDefinition, FieldDefinitionId};
use contracts::domain::a005_data_record::aggregate::{DataRecord, RecordId};

use super::store::{
    CollectionStore, FieldDefinitionStore, MemberStore, ProjectStore, RecordStore, StoreError,
    StoreResult,
};

#[derive(Default)]
struct Tables {
    projects: HashMap<ProjectId, Project>,
    members: HashMap<MemberId, ProjectMember>,
    collections: HashMap<CollectionId, Collection>,
    fields: HashMap<FieldDefinitionId, FieldDefinition>,
    records: HashMap<RecordId, DataRecord>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing server timestamp
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// Mutex-guarded in-memory tables implementing every store trait
///
/// `fail_next(n)` makes the next `n` calls fail with
/// [`StoreError::Unavailable`], to exercise error paths.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    failures: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, calls: usize) {
        self.failures.store(calls, Ordering::SeqCst);
    }

    fn open(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable("injected failure".into()));
        }
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn create_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.open()?;
        let mut stored = project.clone();
        let now = tables.stamp();
        stored.metadata.created_at = now;
        stored.metadata.updated_at = now;
        tables.projects.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self.open()?.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut items: Vec<Project> = self.open()?.projects.values().cloned().collect();
        items.sort_by_key(|p| p.metadata.created_at);
        Ok(items)
    }

    async fn update_project(&self, project: &Project) -> StoreResult<Project> {
        let mut tables = self.open()?;
        let created_at = match tables.projects.get(&project.id) {
            Some(existing) => existing.metadata.created_at,
            None => return Err(StoreError::missing::<Project>(project.id)),
        };
        let mut stored = project.clone();
        stored.metadata.created_at = created_at;
        stored.metadata.updated_at = tables.stamp();
        tables.projects.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_project(&self, id: ProjectId) -> StoreResult<bool> {
        Ok(self.open()?.projects.remove(&id).is_some())
    }
}

#[async_trait]
impl MemberStore for InMemoryStore {
    async fn create_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember> {
        let mut tables = self.open()?;
        let mut stored = member.clone();
        stored.added_at = tables.stamp();
        tables.members.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_member(&self, id: MemberId) -> StoreResult<Option<ProjectMember>> {
        Ok(self.open()?.members.get(&id).cloned())
    }

    async fn list_members_by_project(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<ProjectMember>> {
        let mut items: Vec<ProjectMember> = self
            .open()?
            .members
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        items.sort_by_key(|m| m.added_at);
        Ok(items)
    }

    async fn list_members_by_user(&self, user_id: &str) -> StoreResult<Vec<ProjectMember>> {
        let mut items: Vec<ProjectMember> = self
            .open()?
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|m| m.added_at);
        Ok(items)
    }

    async fn update_member(&self, member: &ProjectMember) -> StoreResult<ProjectMember> {
        let mut tables = self.open()?;
        let added_at = match tables.members.get(&member.id) {
            Some(existing) => existing.added_at,
            None => return Err(StoreError::missing::<ProjectMember>(member.id)),
        };
        let mut stored = member.clone();
        stored.added_at = added_at;
        tables.members.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        Ok(self.open()?.members.remove(&id).is_some())
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn create_collection(&self, collection: &Collection) -> StoreResult<Collection> {
        let mut tables = self.open()?;
        let mut stored = collection.clone();
        let now = tables.stamp();
        stored.metadata.created_at = now;
        stored.metadata.updated_at = now;
        tables.collections.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_collection(&self, id: CollectionId) -> StoreResult<Option<Collection>> {
        Ok(self.open()?.collections.get(&id).cloned())
    }

    async fn list_collections_by_project(
        &self,
        project_id: ProjectId,
    ) -> StoreResult<Vec<Collection>> {
        let mut items: Vec<Collection> = self
            .open()?
            .collections
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        items.sort_by_key(|c| c.metadata.created_at);
        Ok(items)
    }

    async fn update_collection(&self, collection: &Collection) -> StoreResult<Collection> {
        let mut tables = self.open()?;
        let created_at = match tables.collections.get(&collection.id) {
            Some(existing) => existing.metadata.created_at,
            None => return Err(StoreError::missing::<Collection>(collection.id)),
        };
        let mut stored = collection.clone();
        stored.metadata.created_at = created_at;
        stored.metadata.updated_at = tables.stamp();
        tables.collections.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_collection(&self, id: CollectionId) -> StoreResult<bool> {
        Ok(self.open()?.collections.remove(&id).is_some())
    }
}

#[async_trait]
impl FieldDefinitionStore for InMemoryStore {
    async fn create_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition> {
        let mut tables = self.open()?;
        let mut stored = field.clone();
        let now = tables.stamp();
        stored.metadata.created_at = now;
        stored.metadata.updated_at = now;
        tables.fields.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_field(&self, id: FieldDefinitionId) -> StoreResult<Option<FieldDefinition>> {
        Ok(self.open()?.fields.get(&id).cloned())
    }

    async fn list_fields_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<FieldDefinition>> {
        let mut items: Vec<FieldDefinition> = self
            .open()?
            .fields
            .values()
            .filter(|f| f.collection_id == collection_id)
            .cloned()
            .collect();
        items.sort_by_key(|f| f.order);
        Ok(items)
    }

    async fn update_field(&self, field: &FieldDefinition) -> StoreResult<FieldDefinition> {
        let mut tables = self.open()?;
        let created_at = match tables.fields.get(&field.id) {
            Some(existing) => existing.metadata.created_at,
            None => return Err(StoreError::missing::<FieldDefinition>(field.id)),
        };
        let mut stored = field.clone();
        stored.metadata.created_at = created_at;
        stored.metadata.updated_at = tables.stamp();
        tables.fields.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_field(&self, id: FieldDefinitionId) -> StoreResult<bool> {
        Ok(self.open()?.fields.remove(&id).is_some())
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create_record(&self, record: &DataRecord) -> StoreResult<DataRecord> {
        let mut tables = self.open()?;
        let mut stored = record.clone();
        let now = tables.stamp();
        stored.metadata.created_at = now;
        stored.metadata.updated_at = now;
        tables.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_record(&self, id: RecordId) -> StoreResult<Option<DataRecord>> {
        Ok(self.open()?.records.get(&id).cloned())
    }

    async fn list_records_by_collection(
        &self,
        collection_id: CollectionId,
    ) -> StoreResult<Vec<DataRecord>> {
        let mut items: Vec<DataRecord> = self
            .open()?
            .records
            .values()
            .filter(|r| r.collection_id == collection_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        Ok(items)
    }

    async fn count_records_by_collection(&self, collection_id: CollectionId) -> StoreResult<usize> {
        Ok(self
            .open()?
            .records
            .values()
            .filter(|r| r.collection_id == collection_id)
            .count())
    }

    async fn update_record(&self, record: &DataRecord) -> StoreResult<DataRecord> {
        let mut tables = self.open()?;
        let created_at = match tables.records.get(&record.id) {
            Some(existing) => existing.metadata.created_at,
            None => return Err(StoreError::missing::<DataRecord>(record.id)),
        };
        let mut stored = record.clone();
        stored.metadata.created_at = created_at;
        stored.metadata.updated_at = tables.stamp();
        tables.records.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_record(&self, id: RecordId) -> StoreResult<bool> {
        Ok(self.open()?.records.remove(&id).is_some())
    }
}
