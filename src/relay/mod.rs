//! Same-origin relay in front of the Aladhan `timingsByCity` endpoint, so
//! browser clients can fetch prayer times without cross-origin errors.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};

use crate::api::aladhan::RELAY_PATH;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("API request failed with status: {}", .0.as_u16())]
    Status(reqwest::StatusCode),
    #[error("upstream returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct RelayState {
    http: Client,
    upstream_base: String,
}

impl RelayState {
    pub fn new(http: Client, upstream_base: &str) -> Self {
        Self {
            http,
            upstream_base: upstream_base.trim_end_matches('/').to_string(),
        }
    }
}

fn default_city() -> String {
    "Jakarta".to_string()
}
fn default_country() -> String {
    "Indonesia".to_string()
}
fn default_method() -> String {
    "8".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_method")]
    pub method: String,
}

const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

/// Any origin may call the relay. The layer answers preflights itself.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// `CorsLayer` only sends the allowed methods and headers on preflights;
/// browsers get them on every response here, rejections included.
async fn cors_everywhere(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_METHODS)
        .or_insert(HeaderValue::from_static(ALLOW_METHODS));
    headers
        .entry(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(ALLOW_HEADERS));
    response
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route(RELAY_PATH, any(prayer_times))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors_layer())
        .layer(middleware::map_response(cors_everywhere))
}

fn error_payload(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Failed to fetch prayer times",
            "message": message,
        })),
    )
        .into_response()
}

async fn forward(state: &RelayState, query: &RelayQuery) -> Result<Bytes, RelayError> {
    let url = format!("{}/timingsByCity", state.upstream_base);
    let response = state
        .http
        .get(&url)
        .query(&[
            ("city", query.city.as_str()),
            ("country", query.country.as_str()),
            ("method", query.method.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Status(status));
    }

    let body = response.bytes().await?;
    serde_json::from_slice::<serde::de::IgnoredAny>(&body)?;
    Ok(body)
}

async fn prayer_times(
    State(state): State<RelayState>,
    method: Method,
    query: Result<Query<RelayQuery>, QueryRejection>,
) -> Response {
    match method {
        Method::OPTIONS => StatusCode::OK.into_response(),
        Method::GET => {
            let Query(query) = match query {
                Ok(query) => query,
                Err(rejection) => {
                    log::warn!("Rejected relay query: {}", rejection.body_text());
                    return error_payload(rejection.body_text());
                }
            };
            log::info!(
                "Fetching prayer times for {}, {} with method {}",
                query.city,
                query.country,
                query.method
            );
            match forward(&state, &query).await {
                Ok(body) => {
                    log::info!("Prayer times relayed successfully");
                    (
                        StatusCode::OK,
                        [(header::CONTENT_TYPE, "application/json")],
                        body,
                    )
                        .into_response()
                }
                Err(e) => {
                    log::error!("Error relaying prayer times: {}", e);
                    error_payload(e.to_string())
                }
            }
        }
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": "Method not allowed" })),
        )
            .into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "Prayer times proxy server is running",
    }))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(bind: &str, state: RelayState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Binding relay to {}", bind))?;
    let addr = listener.local_addr()?;
    log::info!("Prayer times relay running on http://{}", addr);
    log::info!("Relay endpoint: http://{}{}", addr, RELAY_PATH);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down relay");
}
