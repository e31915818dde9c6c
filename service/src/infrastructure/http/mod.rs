use anyhow::Context;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use serde_json::json;

use tokio::net;

use crate::domain::session::{GuardDecision, SessionGuard};
use crate::domain::{AppState, Identity};
use crate::infrastructure::http::api::ApiError;
use crate::infrastructure::http::handlers::admin::{create_tutorial, publish_tutorial, upload_media};
use crate::infrastructure::http::handlers::auth::{login, logout};
use crate::infrastructure::http::handlers::catalog::{get_tutorial, list_tutorials};
use crate::infrastructure::http::handlers::health_check;

mod api;
mod handlers;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = Router::new()
            .route("/", get(landing))
            .route("/health", get(health_check))
            .nest("/api", api_routes(state.clone()))
            .route("/metrics", get(|| async move { metric_handle.render() }))
            // Unknown locations fall back to the landing page.
            .fallback(get(|| async { Redirect::temporary("/") }))
            .layer(trace_layer)
            .layer(prometheus_layer)
            .with_state(state);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        tracing::debug!("listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

async fn landing() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Tuto Time",
        "catalog": "/api/tutorials",
    }))
}

fn api_routes<S: AppState>(state: S) -> Router<S> {
    let admin = Router::new()
        .route("/admin/tutorials", post(create_tutorial::<S>))
        .route("/admin/tutorials/{id}/publish", post(publish_tutorial::<S>))
        .route("/admin/media", post(upload_media::<S>))
        .layer(middleware::from_fn_with_state(state, require_session::<S>));

    Router::new()
        .route("/tutorials", get(list_tutorials::<S>))
        .route("/tutorials/{id}", get(get_tutorial::<S>))
        .route("/auth/login", post(login::<S>))
        .route("/auth/logout", post(logout::<S>))
        .merge(admin)
}

/// Session guard wrapping every admin route. Subscribes to the identity
/// collaborator's auth-state stream for the duration of the request; denied
/// requests are pointed at the login entry with the originally requested
/// location preserved.
async fn require_session<S: AppState>(
    State(state): State<S>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let mut guard = SessionGuard::new(state.identity().watch_session());
    match guard.resolve().await {
        GuardDecision::Grant(principal) => {
            request.extensions_mut().insert(principal);
            Ok(next.run(request).await)
        }
        GuardDecision::RedirectToLogin => {
            let from = request.uri().path().to_string();
            Err(ApiError::Unauthorized {
                login: format!("/login?from={from}"),
            })
        }
    }
}
