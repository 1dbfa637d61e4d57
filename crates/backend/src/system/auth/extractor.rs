use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use contracts::system::auth::{AppRole, SessionUser};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Extractor for the signed-in user forwarded by the identity provider
/// Usage in handlers: `async fn handler(CurrentUser(user): CurrentUser) -> Response`
pub struct CurrentUser(pub SessionUser);

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read the session user from request headers; only the user id is mandatory
pub fn session_user_from_parts(parts: &Parts) -> Option<SessionUser> {
    let user_id = header(parts, USER_ID_HEADER)?;
    Some(SessionUser {
        display_name: header(parts, USER_NAME_HEADER).unwrap_or_else(|| user_id.clone()),
        email: header(parts, USER_EMAIL_HEADER).unwrap_or_default(),
        role: header(parts, USER_ROLE_HEADER)
            .and_then(|r| AppRole::from_code(&r))
            .unwrap_or_default(),
        user_id,
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user_from_parts(parts)
            .map(CurrentUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_reads_all_headers() {
        let user = session_user_from_parts(&parts(&[
            ("x-user-id", "u1"),
            ("x-user-name", "Ann"),
            ("x-user-email", "ann@example.com"),
            ("x-user-role", "Admin"),
        ]))
        .unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.display_name, "Ann");
        assert_eq!(user.role, AppRole::Admin);
    }

    #[test]
    fn test_defaults_and_missing_id() {
        let user = session_user_from_parts(&parts(&[("x-user-id", "u2"), ("x-user-role", "root")]))
            .unwrap();
        assert_eq!(user.display_name, "u2");
        assert_eq!(user.email, "");
        assert_eq!(user.role, AppRole::User);

        assert!(session_user_from_parts(&parts(&[("x-user-id", "  ")])).is_none());
        assert!(session_user_from_parts(&parts(&[])).is_none());
    }

    #[tokio::test]
    async fn test_extractor_rejects_anonymous() {
        let mut anonymous = parts(&[]);
        let result = CurrentUser::from_request_parts(&mut anonymous, &()).await;
        assert!(matches!(result, Err(StatusCode::UNAUTHORIZED)));
    }
}
