use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет в лог:
/// - метод и путь
/// - статус код
/// - длительность (ms)
/// - пользователя из заголовка `x-user-id`, если он есть
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user = req
        .headers()
        .get(crate::system::auth::extractor::USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, duration_ms, %user, "request");
    } else {
        tracing::info!(%method, %path, status, duration_ms, %user, "request");
    }
    response
}
