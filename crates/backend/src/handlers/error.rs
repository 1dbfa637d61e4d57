use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::domain::common::AggregateId;
use serde_json::json;

use crate::shared::error::ServiceError;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match &self {
            ServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation", "message": message, "fields": errors }),
            ),
            ServiceError::Schema(e) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "schema", "message": message, "detail": e }),
            ),
            ServiceError::Invalid(_) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid", "message": message }),
            ),
            ServiceError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "notFound", "message": message }),
            ),
            ServiceError::StoreUnavailable(e) => {
                tracing::error!(error = %e, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "error": "unavailable", "message": "Storage is temporarily unavailable" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Parse an id from a path segment
pub fn parse_id<T: AggregateId>(raw: &str) -> Result<T, ServiceError> {
    T::from_string(raw).map_err(ServiceError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::store::StoreError;
    use contracts::domain::a005_data_record::aggregate::RecordId;
    use contracts::shared::schema::SchemaError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::Invalid("bad".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::Schema(SchemaError::CyclicFormula {
                    cycle: vec!["X".into(), "Y".into(), "X".into()],
                }),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::not_found("record", "r1"), StatusCode::NOT_FOUND),
            (
                ServiceError::from(StoreError::Unavailable("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_parse_id() {
        let id = RecordId::new_v4();
        assert_eq!(parse_id::<RecordId>(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_id::<RecordId>("temp_1"),
            Err(ServiceError::Invalid(_))
        ));
    }
}
