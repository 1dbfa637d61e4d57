use serde::{Deserialize, Serialize};

use crate::domain::a001_project::aggregate::ProjectId;
use crate::domain::common::AggregateRoot;
use crate::enums::member_role::MemberRole;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор участника проекта
    MemberId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Участник проекта с ролью
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub role: MemberRole,
    pub added_at: chrono::DateTime<chrono::Utc>,
}

impl ProjectMember {
    /// Создать нового участника для вставки в хранилище
    pub fn new_for_insert(
        project_id: ProjectId,
        user_id: String,
        user_name: String,
        user_email: String,
        role: MemberRole,
    ) -> Self {
        Self {
            id: MemberId::new_v4(),
            project_id,
            user_id,
            user_name,
            user_email,
            role,
            added_at: chrono::Utc::now(),
        }
    }
}

impl AggregateRoot for ProjectMember {
    type Id = MemberId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "project_members"
    }

    fn element_name() -> &'static str {
        "project member"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для добавления участника
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberDto {
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub role: MemberRole,
}
