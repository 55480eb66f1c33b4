// Puppet Agent Exporter - HTTP server
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTTP endpoints: landing page, metrics and health check.

use crate::metrics::encode_metrics;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use prometheus::Registry;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, warn};

/// Prometheus text exposition content type.
const METRICS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Application state shared across handlers.
pub struct AppState {
    pub registry: Registry,
    pub metrics_path: String,
}

/// Credentials required on every request when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

/// Build the router.
pub fn router(state: Arc<AppState>, auth: Option<BasicAuth>) -> Router {
    let metrics_path = state.metrics_path.clone();
    let app = Router::new()
        .route("/", get(root_handler))
        .route(&metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state);

    match auth {
        Some(auth) => app.layer(middleware::from_fn_with_state(
            Arc::new(auth),
            basic_auth_middleware,
        )),
        None => app,
    }
}

/// Serve `app` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Root handler - links to the metrics path.
async fn root_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Puppet Agent Exporter</title></head>
<body>
    <h1>Puppet Agent Exporter</h1>
    <p><a href="{path}">Metrics</a></p>
</body>
</html>"#,
        path = state.metrics_path
    ))
}

/// Metrics handler - returns Prometheus text format.
///
/// Gathering reads the agent state files, so it runs on the blocking pool.
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let encoded = tokio::task::spawn_blocking(move || encode_metrics(&state.registry)).await;

    match encoded {
        Ok(Ok(metrics)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
            metrics,
        )
            .into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "Metrics task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"puppet-agent-exporter\"")],
        Body::from("Unauthorized"),
    )
        .into_response()
}

/// Decode `Basic <base64(user:password)>`.
fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    use base64::Engine;

    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_owned(), password.to_owned()))
}

/// Byte equality whose running time does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl BasicAuth {
    /// Check both fields without short-circuiting on the user name.
    fn matches(&self, user: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(user.as_bytes(), self.user.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok & password_ok
    }
}

async fn basic_auth_middleware(
    State(auth): State<Arc<BasicAuth>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    let credentials = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_auth);

    match credentials {
        Some((user, password)) if auth.matches(&user, &password) => {
            debug!(user = %user, path = %path, "authenticated");
            next.run(req).await
        }
        Some((user, _)) => {
            warn!(user = %user, path = %path, "auth failed: invalid credentials");
            unauthorized()
        }
        None => {
            warn!(path = %path, "auth failed: missing or malformed authorization header");
            unauthorized()
        }
    }
}
