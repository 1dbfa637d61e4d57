use contracts::domain::a001_project::aggregate::{Project, ProjectId};
use contracts::domain::a002_project_member::aggregate::{MemberId, ProjectMember, ProjectMemberDto};
use contracts::enums::member_role::MemberRole;

use crate::shared::data::store::DocumentStore;
use crate::shared::error::{ServiceError, ServiceResult};

/// Добавление участника в проект
pub async fn add(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    dto: ProjectMemberDto,
) -> ServiceResult<ProjectMember> {
    if dto.user_id.trim().is_empty() {
        return Err(ServiceError::Invalid("Member user id cannot be empty".into()));
    }
    if store.get_project(project_id).await?.is_none() {
        return Err(ServiceError::missing::<Project>(project_id));
    }
    let member = ProjectMember::new_for_insert(
        project_id,
        dto.user_id,
        dto.user_name,
        dto.user_email,
        dto.role,
    );
    let member = store.create_member(&member).await?;
    tracing::info!(project_id = %project_id, user_id = %member.user_id, role = member.role.code(), "Member added");
    Ok(member)
}

/// Участники проекта в порядке добавления
pub async fn list_by_project(
    store: &dyn DocumentStore,
    project_id: ProjectId,
) -> ServiceResult<Vec<ProjectMember>> {
    Ok(store.list_members_by_project(project_id).await?)
}

/// Роль пользователя в проекте, если он участник
pub async fn get_user_role(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    user_id: &str,
) -> ServiceResult<Option<MemberRole>> {
    let members = store.list_members_by_project(project_id).await?;
    Ok(members
        .into_iter()
        .find(|m| m.user_id == user_id)
        .map(|m| m.role))
}

pub async fn has_access(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    user_id: &str,
) -> ServiceResult<bool> {
    Ok(get_user_role(store, project_id, user_id).await?.is_some())
}

/// Проверка роли с учётом иерархии viewer < editor < owner
pub async fn has_role(
    store: &dyn DocumentStore,
    project_id: ProjectId,
    user_id: &str,
    required: MemberRole,
) -> ServiceResult<bool> {
    Ok(get_user_role(store, project_id, user_id)
        .await?
        .is_some_and(|role| role.satisfies(required)))
}

pub async fn update_role(
    store: &dyn DocumentStore,
    id: MemberId,
    role: MemberRole,
) -> ServiceResult<ProjectMember> {
    let mut member = store
        .get_member(id)
        .await?
        .ok_or_else(|| ServiceError::missing::<ProjectMember>(id))?;
    member.role = role;
    Ok(store.update_member(&member).await?)
}

pub async fn remove(store: &dyn DocumentStore, id: MemberId) -> ServiceResult<()> {
    if !store.delete_member(id).await? {
        return Err(ServiceError::missing::<ProjectMember>(id));
    }
    Ok(())
}

/// Число участников для карточки проекта; ошибки хранилища дают 0
pub async fn member_count(store: &dyn DocumentStore, project_id: ProjectId) -> usize {
    match store.list_members_by_project(project_id).await {
        Ok(members) => members.len(),
        Err(e) => {
            tracing::warn!(project_id = %project_id, error = %e, "Failed to count members");
            0
        }
    }
}
