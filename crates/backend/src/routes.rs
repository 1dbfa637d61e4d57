use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers;
use crate::shared::cascade::RetryPolicy;
use crate::shared::data::store::DocumentStore;
use crate::system;
use crate::system::auth::session::SessionEvents;

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub cascade: RetryPolicy,
    pub sessions: SessionEvents,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM SESSION ROUTES
        // ========================================
        .route(
            "/api/system/session",
            get(system::handlers::session::current)
                .post(system::handlers::session::sign_in)
                .delete(system::handlers::session::sign_out),
        )
        // ========================================
        // A001 Project
        // ========================================
        .route(
            "/api/projects",
            get(handlers::a001_project::list).post(handlers::a001_project::create),
        )
        .route(
            "/api/projects/:id",
            get(handlers::a001_project::get_by_id)
                .put(handlers::a001_project::update)
                .delete(handlers::a001_project::delete),
        )
        // ========================================
        // A002 Project member
        // ========================================
        .route(
            "/api/projects/:id/members",
            get(handlers::a002_project_member::list).post(handlers::a002_project_member::add),
        )
        .route(
            "/api/members/:id",
            put(handlers::a002_project_member::update_role)
                .delete(handlers::a002_project_member::remove),
        )
        // ========================================
        // A003 Collection
        // ========================================
        .route(
            "/api/projects/:id/collections",
            get(handlers::a003_collection::list).post(handlers::a003_collection::create),
        )
        .route(
            "/api/projects/:id/collections/summary",
            get(handlers::a003_collection::list_summaries),
        )
        .route(
            "/api/collections/:id",
            get(handlers::a003_collection::get_by_id)
                .put(handlers::a003_collection::update)
                .delete(handlers::a003_collection::delete),
        )
        .route(
            "/api/collections/:id/summary",
            get(handlers::a003_collection::summary),
        )
        // ========================================
        // A004 Field definition
        // ========================================
        .route(
            "/api/collections/:id/fields",
            get(handlers::a003_collection::list_fields)
                .put(handlers::a003_collection::replace_fields)
                .post(handlers::a003_collection::add_field),
        )
        .route(
            "/api/collections/:id/fields/order",
            put(handlers::a003_collection::reorder_fields),
        )
        .route(
            "/api/fields/:id",
            patch(handlers::a003_collection::update_field)
                .delete(handlers::a003_collection::remove_field),
        )
        // ========================================
        // A005 Data record
        // ========================================
        .route(
            "/api/collections/:id/records",
            get(handlers::a005_data_record::list).post(handlers::a005_data_record::create),
        )
        .route(
            "/api/collections/:id/records/table",
            get(handlers::a005_data_record::table),
        )
        .route(
            "/api/collections/:id/records/delete",
            post(handlers::a005_data_record::delete_many),
        )
        .route(
            "/api/records/:id",
            get(handlers::a005_data_record::get_by_id)
                .put(handlers::a005_data_record::update)
                .delete(handlers::a005_data_record::delete),
        )
        .route(
            "/api/records/:id/edit",
            get(handlers::a005_data_record::edit_values),
        )
        .with_state(state)
}
