use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::shared::format::format_number;

/// Цвет времени: голубой для 2xx, коричневый для остальных
fn status_color(status: StatusCode) -> &'static str {
    if status.is_success() {
        "36"
    } else {
        "33"
    }
}

fn print_line(color: &str, millis: u128, size: &str, status: StatusCode, method: &Method, path: &str) {
    let timestamp = Utc::now().format("%H:%M:%S");
    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color,
        timestamp,
        millis,
        size,
        status.as_u16(),
        method,
        path
    );
}

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль время (UTC), длительность, размер ответа,
/// статус, метод и путь. Запросы к ассистенту идут десятки секунд,
/// поэтому длительность важна.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(_) => {
            print_line("33", start.elapsed().as_millis(), "error", parts.status, &method, &path);
            return Response::from_parts(parts, Body::default());
        }
    };

    print_line(
        status_color(parts.status),
        start.elapsed().as_millis(),
        &format_number(bytes.len()),
        parts.status,
        &method,
        &path,
    );

    Response::from_parts(parts, Body::from(bytes))
}
