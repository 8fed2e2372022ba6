//! HTTP API: serves the current snapshot as JSON.

use std::{sync::Arc, time::Instant};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        Method, Request, StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use cityweather_core::SnapshotStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

const JSON_UTF8: &str = "application/json; charset=utf-8";
const INTERNAL_ERROR_BODY: &str = r#"{"error":"internal server error"}"#;

pub fn router(store: Arc<SnapshotStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/api/weather", get(weather).options(preflight))
        .with_state(store)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

pub async fn serve(
    listener: TcpListener,
    store: Arc<SnapshotStore>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

async fn weather(State(store): State<Arc<SnapshotStore>>) -> Response {
    let current = store.read();

    match serde_json::to_vec(&current.snapshot) {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => {
            error!(error = %err, "failed to encode weather snapshot");
            json_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let body: Body = body.into();
    let mut response = (status, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8));
    response
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}
