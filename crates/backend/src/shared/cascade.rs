//! Cascading deletes as a saga of idempotent steps
//!
//! Children go first and the parent last, so an interrupted run leaves the
//! parent in place and can simply be run again. Each step is retried under a
//! [`RetryPolicy`]; fan-out inside a step (one delete per child) runs
//! concurrently. Readers are not isolated from a running cascade.

use std::future::Future;
use std::time::Duration;

use futures::future::try_join_all;
use serde::Serialize;

use contracts::domain::a001_project::aggregate::ProjectId;
use contracts::domain::a003_collection::aggregate::CollectionId;

use crate::shared::config::CascadeConfig;
use crate::shared::data::store::{DocumentStore, StoreError, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retry
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&CascadeConfig::default())
    }
}

impl From<&CascadeConfig> for RetryPolicy {
    fn from(config: &CascadeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff(),
        }
    }
}

/// Number of documents removed by a cascade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub projects: usize,
    pub members: usize,
    pub collections: usize,
    pub fields: usize,
    pub records: usize,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn absorb(&mut self, other: &CascadeReport) {
        self.projects += other.projects;
        self.members += other.members;
        self.collections += other.collections;
        self.fields += other.fields;
        self.records += other.records;
    }
}

/// Run one saga step, retrying unavailable-store failures
pub async fn run_step<T, F, Fut>(step: &str, policy: &RetryPolicy, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e @ StoreError::Unavailable(_)) if attempt < policy.max_attempts => {
                tracing::warn!(step, attempt, error = %e, "Cascade step failed, retrying");
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(step, attempt, error = %e, "Cascade step failed");
                return Err(e);
            }
        }
    }
}

fn deleted(flags: Vec<bool>) -> usize {
    flags.into_iter().filter(|d| *d).count()
}

/// Delete a collection with all its field definitions and records
pub async fn delete_collection(
    store: &dyn DocumentStore,
    collection_id: CollectionId,
    policy: &RetryPolicy,
) -> StoreResult<CascadeReport> {
    let records = run_step("delete records", policy, move || async move {
        let records = store.list_records_by_collection(collection_id).await?;
        let flags = try_join_all(records.iter().map(|r| store.delete_record(r.id))).await?;
        Ok(deleted(flags))
    })
    .await?;

    let fields = run_step("delete field definitions", policy, move || async move {
        let fields = store.list_fields_by_collection(collection_id).await?;
        let flags = try_join_all(fields.iter().map(|f| store.delete_field(f.id))).await?;
        Ok(deleted(flags))
    })
    .await?;

    let collection = run_step("delete collection", policy, move || {
        store.delete_collection(collection_id)
    })
    .await?;

    let report = CascadeReport {
        collections: usize::from(collection),
        fields,
        records,
        ..Default::default()
    };
    tracing::info!(
        collection_id = %collection_id,
        fields = report.fields,
        records = report.records,
        "Collection cascade finished"
    );
    Ok(report)
}

/// Delete a project with its members and every collection's contents
pub async fn delete_project(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    policy: &RetryPolicy,
) -> StoreResult<CascadeReport> {
    let collections = run_step("list collections", policy, move || {
        store.list_collections_by_project(project_id)
    })
    .await?;

    let mut report = CascadeReport::default();
    let children = try_join_all(
        collections
            .iter()
            .map(|c| delete_collection(store, c.id, policy)),
    )
    .await?;
    for child in &children {
        report.absorb(child);
    }

    report.members = run_step("delete members", policy, move || async move {
        let members = store.list_members_by_project(project_id).await?;
        let flags = try_join_all(members.iter().map(|m| store.delete_member(m.id))).await?;
        Ok(deleted(flags))
    })
    .await?;

    let project = run_step("delete project", policy, move || store.delete_project(project_id)).await?;
    report.projects = usize::from(project);

    tracing::info!(
        project_id = %project_id,
        collections = report.collections,
        members = report.members,
        records = report.records,
        "Project cascade finished"
    );
    Ok(report)
}
