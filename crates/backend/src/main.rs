use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use backend::routes::{configure_routes, AppState};
use backend::shared::cascade::RetryPolicy;
use backend::shared::config::{get_database_path, load_config};
use backend::shared::data::db::SqliteStore;
use backend::system;
use backend::system::auth::extractor::{
    USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER, USER_ROLE_HEADER,
};
use backend::system::auth::session::SessionEvents;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    system::tracing::initialize(&config.logging)?;

    let db_path = get_database_path(&config);
    let store = SqliteStore::open(&db_path).await?;

    let sessions = SessionEvents::new();
    sessions
        .subscribe(|user| match user {
            Some(u) => tracing::debug!(user_id = %u.user_id, role = u.role.code(), "Session user set"),
            None => tracing::debug!("Session user cleared"),
        })
        .detach();

    let state = AppState {
        store: Arc::new(store),
        cascade: RetryPolicy::from(&config.cascade),
        sessions,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_NAME_HEADER),
            HeaderName::from_static(USER_EMAIL_HEADER),
            HeaderName::from_static(USER_ROLE_HEADER),
        ]);

    let app = configure_routes(state)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
