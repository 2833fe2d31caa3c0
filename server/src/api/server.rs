//! API server initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{analyze, health, metrics};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::StorageService;
use crate::domain::AnalyticsEngine;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered
    ///
    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let host = app.config.server.host.clone();
        let port = app.config.server.port;

        let router = build_router(
            app.engine.clone(),
            app.storage.clone(),
            shutdown.token(),
            &allowed_origins,
        );

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", host, port))?;
        tracing::debug!(host = %host, port, "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Assemble every route with the shared layers
///
/// `shutdown` is the root token analyze requests derive their own from.
pub fn build_router(
    engine: Arc<AnalyticsEngine>,
    storage: Arc<StorageService>,
    shutdown: CancellationToken,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let api_routes = Router::new()
        .merge(health::routes(storage))
        .merge(metrics::routes())
        .merge(analyze::routes(engine, shutdown));

    Router::new()
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/api/v1", api_routes)
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::AnalyticsConfig;
    use crate::data::SqliteService;
    use crate::data::sqlite::fixtures::seeded_pool;

    async fn router_with(shutdown: CancellationToken) -> Router {
        let storage = Arc::new(StorageService::Sqlite(Arc::new(SqliteService::from_pool(
            seeded_pool().await,
        ))));
        let engine = Arc::new(AnalyticsEngine::new(
            storage.aggregates(),
            storage.scopes(),
            AnalyticsConfig::default(),
        ));
        build_router(
            engine,
            storage,
            shutdown,
            &AllowedOrigins::new("127.0.0.1", 5390),
        )
    }

    async fn router() -> Router {
        router_with(CancellationToken::new()).await
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const QUARTER: &str = "strtYmd=2024-01-01&endYmd=2024-03-31&dtType=month";

    #[tokio::test]
    async fn test_get_growth_rate() {
        let uri = format!("/api/v1/admin/posts/analyze/growth-rate?{}", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["error"], false);
        assert_eq!(json["code"], "OK");
        assert_eq!(json["data"]["kind"], "growth_rate_series");
        let counts: Vec<i64> = json["data"]["points"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["count"].as_i64().unwrap())
            .collect();
        assert_eq!(counts, vec![10, 0, 5]);
        assert!(json["data"]["points"][0]["rate"].is_null());
    }

    #[tokio::test]
    async fn test_post_top_with_compact_dates() {
        let body = serde_json::json!({
            "strtYmd": "20240101",
            "endYmd": "20240331",
            "dtType": "month",
            "limit": 2
        });
        let (status, json) = send(
            router().await,
            post("/api/v1/admin/users/analyze/top", body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["kind"], "ranking_list");
        assert_eq!(json["data"]["limit"], 2);
        assert_eq!(json["data"]["items"][0]["id"], 1);
        assert_eq!(json["data"]["items"][0]["label"], "alice");
        assert_eq!(json["data"]["items"][1]["id"], 3);
    }

    #[tokio::test]
    async fn test_overview_lists_fields_in_order() {
        let uri = format!("/api/v1/admin/posts/analyze/overview?{}&scopeNo=2", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        let fields = json["data"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 7);
        assert!(fields.iter().all(|f| f["error"].is_null()));
    }

    #[tokio::test]
    async fn test_unknown_path_segments_are_404() {
        let uri = format!("/api/v1/admin/widgets/analyze/count?{}", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "UNKNOWN_DOMAIN");

        let uri = format!("/api/v1/public/posts/analyze/count?{}", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "UNKNOWN_AUDIENCE");

        let uri = format!("/api/v1/admin/posts/analyze/median?{}", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "UNKNOWN_METRIC");
    }

    #[tokio::test]
    async fn test_request_errors_use_envelope() {
        let uri = "/api/v1/admin/posts/analyze/count?strtYmd=2024-13-01&endYmd=2024-03-31";
        let (status, json) = send(router().await, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], true);
        assert_eq!(json["code"], "INVALID_DATE");
        assert!(json["data"].is_null());

        let uri = "/api/v1/admin/posts/analyze/count?strtYmd=2024-03-01&endYmd=2024-01-01";
        let (status, json) = send(router().await, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_RANGE");

        let uri = "/api/v1/admin/posts/analyze/count?endYmd=2024-01-01";
        let (status, json) = send(router().await, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "QUERY_PARSE_ERROR");

        let uri = format!("/api/v1/admin/posts/analyze/count?{}&pstNo=0", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/posts/analyze/count")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"strtYmd\": "))
            .unwrap();
        let (status, json) = send(router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "JSON_PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_deleted_scope_is_404() {
        let uri = format!("/api/v1/admin/posts/analyze/count?{}&scopeNo=3", QUARTER);
        let (status, json) = send(router().await, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "SCOPE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_shutdown_cancels_requests() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let uri = format!("/api/v1/admin/posts/analyze/count?{}", QUARTER);
        let (status, json) = send(router_with(shutdown).await, get(&uri)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "CANCELLED");
    }

    #[tokio::test]
    async fn test_metrics_and_health() {
        let (status, json) = send(router().await, get("/api/v1/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().unwrap().len(), 6);

        let (status, json) = send(router().await, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["backend"], "sqlite");
    }

    #[tokio::test]
    async fn test_unmatched_route_is_envelope_404() {
        let (status, json) = send(router().await, get("/api/v2/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], true);
    }
}
