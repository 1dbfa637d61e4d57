use serde::{Deserialize, Serialize};

/// Role of a project member.
///
/// Roles form a hierarchy `Viewer < Editor < Owner`. Only the contract is
/// stated here; enforcing it is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
}

impl MemberRole {
    /// Получить код роли
    pub fn code(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Editor => "editor",
            MemberRole::Viewer => "viewer",
        }
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "owner" => Some(MemberRole::Owner),
            "editor" => Some(MemberRole::Editor),
            "viewer" => Some(MemberRole::Viewer),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            MemberRole::Viewer => 1,
            MemberRole::Editor => 2,
            MemberRole::Owner => 3,
        }
    }

    /// Роль не ниже требуемой
    pub fn satisfies(&self, required: MemberRole) -> bool {
        self.rank() >= required.rank()
    }
}
