//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, headers)
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::bookings::BookingService;
use crate::clock::{Clock, SystemClock};
use crate::config::ServerConfig;
use crate::http::handlers::{self, bookings, config as policy, issues};
use crate::http::request::{make_span, propagate_request_id, set_request_id, track_metrics};
use crate::issues::IssueStore;
use crate::lifecycle::signals::shutdown_signal;
use crate::policy::PolicyStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<PolicyStore>,
    pub bookings: Arc<BookingService>,
    pub issues: Arc<IssueStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(policy: Arc<PolicyStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bookings: Arc::new(BookingService::new(policy.clone(), clock.clone())),
            issues: Arc::new(IssueStore::new()),
            policy,
            clock,
        }
    }
}

/// HTTP server for LabBooker.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Server on the wall clock with the given policy store.
    pub fn new(config: ServerConfig, policy: Arc<PolicyStore>) -> Self {
        Self::with_state(config, AppState::new(policy, Arc::new(SystemClock)))
    }

    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self {
            router: build_router(&config, state),
        }
    }

    /// Run the server until Ctrl+C/SIGTERM or `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => tracing::info!("Shutdown triggered"),
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/config",
            get(policy::get_config).post(policy::create_config).put(policy::update_config),
        )
        .route("/issues/create", post(issues::create_issue))
        .route("/issues/all", get(issues::list_issues))
        .route("/issues/{id}", get(issues::get_issue))
        .route("/issues/update/{id}", put(issues::update_issue))
        .route("/issues/update-status/{id}", patch(issues::update_issue_status))
        .route("/issues/delete/{id}", axum::routing::delete(issues::delete_issue))
        .route("/bookings", post(bookings::create_booking).get(bookings::list_bookings))
        .route(
            "/bookings/{id}",
            get(bookings::get_booking).delete(bookings::cancel_booking),
        )
        .route("/bookings/{id}/no-show", post(bookings::mark_no_show))
        .route("/users/{user_id}/standing", get(bookings::get_standing))
        .with_state(state);

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs));

    api.layer(
        ServiceBuilder::new()
            .layer(set_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(propagate_request_id())
            .layer(middleware::from_fn(track_metrics))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(timeout),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    fn app() -> Router {
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()));
        build_router(&ServerConfig::default(), AppState::new(Arc::new(PolicyStore::new()), clock))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_has_request_id_and_headers() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_client_request_id_is_echoed() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let response = app()
            .oneshot(
                Request::put("/config")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["kind"], "ValidationError");
    }

    #[tokio::test]
    async fn test_unknown_issue_id_is_not_found() {
        let response = app()
            .oneshot(Request::get("/issues/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["msg"], "Issue not found");
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = ServerConfig::default();
        config.security.max_body_size = 16;
        let clock = Arc::new(SystemClock);
        let app = build_router(&config, AppState::new(Arc::new(PolicyStore::new()), clock));

        let response = app
            .oneshot(
                Request::post("/issues/create")
                    .header("content-type", "application/json")
                    .header("content-length", "54")
                    .body(Body::from(r#"{"issueType":"other","description":"a very long text"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
