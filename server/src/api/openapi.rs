//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{analyze, health, metrics};
use crate::data::types::ScopeKind;
use crate::domain::analytics::types::{
    AnalysisResult, AveragePoint, CountPoint, DistributionItem, DomainKind, FieldError,
    GrowthPoint, MetricKind, MetricResult, OverviewField, OverviewPolicy, OverviewResult,
    RankingItem, RatioPoint,
};
use crate::domain::analytics::{DomainCatalog, MetricInfo};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blogstat API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Time-bucketed analytics for a blog platform"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "metrics", description = "Metric registry"),
        (name = "analyze", description = "Per-domain metric analysis")
    ),
    paths(
        health::health,
        metrics::list_metrics,
        analyze::analyze_get,
        analyze::analyze_post,
    ),
    components(schemas(
        // Health
        health::HealthResponse,
        // Registry
        DomainCatalog,
        MetricInfo,
        DomainKind,
        MetricKind,
        ScopeKind,
        // Analyze
        analyze::AnalyzeParams,
        AnalysisResult,
        MetricResult,
        CountPoint,
        RatioPoint,
        AveragePoint,
        GrowthPoint,
        RankingItem,
        DistributionItem,
        OverviewResult,
        OverviewField,
        OverviewPolicy,
        FieldError,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Blogstat API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_analyze_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| *p == "/api/v1/{audience}/{domain}/analyze/{metric}"));
        assert!(paths.iter().any(|p| *p == "/api/v1/metrics"));
        assert!(paths.iter().any(|p| *p == "/api/v1/health"));
    }
}
