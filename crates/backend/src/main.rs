use axum::http::{header, Method};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use backend::shared::config::{get_database_path, init_config};
use backend::shared::data::db::initialize_database;
use backend::{routes, system};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = init_config()?;
    let db_path = get_database_path(config)?;
    initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    if config.llm.api_key.trim().is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set: tour plan generation is disabled");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes()
        .layer(axum::middleware::from_fn(
            system::middleware::request_logger,
        ))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Tour planner backend listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
