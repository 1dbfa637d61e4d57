use contracts::domain::a001_project::aggregate::{Project, ProjectDto, ProjectId};
use contracts::domain::a002_project_member::aggregate::ProjectMember;
use contracts::enums::member_role::MemberRole;
use contracts::system::auth::SessionUser;
use futures::future::try_join_all;

use crate::shared::cascade::{self, CascadeReport, RetryPolicy};
use crate::shared::data::store::DocumentStore;
use crate::shared::error::{ServiceError, ServiceResult};

/// Создание проекта; создатель становится участником с ролью owner
pub async fn create(
    store: &dyn DocumentStore,
    dto: ProjectDto,
    owner: &SessionUser,
) -> ServiceResult<Project> {
    let mut aggregate = Project::new_for_insert(dto.name, dto.description, owner.user_id.clone());

    // Валидация
    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();

    let project = store.create_project(&aggregate).await?;
    let member = ProjectMember::new_for_insert(
        project.id,
        owner.user_id.clone(),
        owner.display_name.clone(),
        owner.email.clone(),
        MemberRole::Owner,
    );
    store.create_member(&member).await?;

    tracing::info!(project_id = %project.id, owner = %owner.user_id, "Project created");
    Ok(project)
}

/// Получение проекта по ID
pub async fn get_by_id(store: &dyn DocumentStore, id: ProjectId) -> ServiceResult<Project> {
    store
        .get_project(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<Project>(id))
}

/// Обновление названия и описания
pub async fn update(
    store: &dyn DocumentStore,
    id: ProjectId,
    dto: ProjectDto,
) -> ServiceResult<Project> {
    let mut aggregate = get_by_id(store, id).await?;
    aggregate.update(&dto);
    aggregate.validate().map_err(ServiceError::Invalid)?;
    aggregate.before_write();
    Ok(store.update_project(&aggregate).await?)
}

/// Проекты, в которых пользователь является участником
pub async fn list_for_user(store: &dyn DocumentStore, user_id: &str) -> ServiceResult<Vec<Project>> {
    let memberships = store.list_members_by_user(user_id).await?;
    let mut project_ids: Vec<ProjectId> = memberships.iter().map(|m| m.project_id).collect();
    project_ids.sort();
    project_ids.dedup();

    let found = try_join_all(project_ids.into_iter().map(|id| store.get_project(id))).await?;
    let mut projects: Vec<Project> = found.into_iter().flatten().collect();
    projects.sort_by_key(|p| p.metadata.created_at);
    Ok(projects)
}

/// Удаление проекта со всеми участниками, коллекциями, полями и записями
pub async fn delete(
    store: &dyn DocumentStore,
    id: ProjectId,
    policy: &RetryPolicy,
) -> ServiceResult<CascadeReport> {
    let report = cascade::delete_project(store, id, policy).await?;
    if report.is_empty() {
        return Err(ServiceError::missing::<Project>(id));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_collection::service as collections;
    use crate::shared::data::memory_store::InMemoryStore;
    use crate::shared::data::store::{MemberStore, ProjectStore};
    use contracts::domain::a003_collection::aggregate::CollectionDto;
    use contracts::system::auth::AppRole;

    fn user(id: &str) -> SessionUser {
        SessionUser {
            user_id: id.into(),
            display_name: format!("User {}", id),
            email: format!("{}@example.com", id),
            role: AppRole::User,
        }
    }

    fn dto(name: &str) -> ProjectDto {
        ProjectDto {
            id: None,
            name: name.into(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_adds_owner_membership() {
        let store = InMemoryStore::new();
        let project = create(&store, dto("Survey"), &user("u1")).await.unwrap();

        let members = store.list_members_by_project(project.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, MemberRole::Owner);
        assert_eq!(members[0].user_email, "u1@example.com");

        let mine = list_for_user(&store, "u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert!(list_for_user(&store, "u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_never_reaches_store() {
        let store = InMemoryStore::new();
        assert!(matches!(
            create(&store, dto("  "), &user("u1")).await,
            Err(ServiceError::Invalid(_))
        ));
        assert!(store.list_projects().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_not_found() {
        let store = InMemoryStore::new();
        let project = create(&store, dto("Old"), &user("u1")).await.unwrap();
        let updated = update(&store, project.id, dto("New")).await.unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.metadata.created_at, project.metadata.created_at);

        assert!(matches!(
            get_by_id(&store, ProjectId::new_v4()).await,
            Err(ServiceError::NotFound { entity: "project", .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_and_missing_is_not_found() {
        let store = InMemoryStore::new();
        let project = create(&store, dto("P"), &user("u1")).await.unwrap();
        collections::create(
            &store,
            project.id,
            CollectionDto {
                name: "C".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let report = delete(&store, project.id, &RetryPolicy::once()).await.unwrap();
        assert_eq!((report.projects, report.members, report.collections), (1, 1, 1));
        assert!(list_for_user(&store, "u1").await.unwrap().is_empty());

        assert!(matches!(
            delete(&store, project.id, &RetryPolicy::once()).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_unavailable() {
        let store = InMemoryStore::new();
        store.fail_next(1);
        assert!(matches!(
            list_for_user(&store, "u1").await,
            Err(ServiceError::StoreUnavailable(_))
        ));
    }
}
