use crate::infra::{deserialize_optional_date, AppState, EngineState};
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use waste_insights::error::AppError;
use waste_insights::insights::{
    CollectionRecord, Contributor, Insight, InsightEngine, InsightReport, MonthlyTotals,
};
use waste_insights::summary::{contributor_earnings, CollectionSummary, ContributorEarnings, WasteCatalog};

#[derive(Debug, Deserialize)]
pub(crate) struct InsightRequest {
    #[serde(default)]
    pub(crate) records: Vec<CollectionRecord>,
    #[serde(default)]
    pub(crate) contributors: Vec<Contributor>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) now: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) catalog: WasteCatalog,
}

#[derive(Debug, Serialize)]
pub(crate) struct InsightResponse {
    pub(crate) generated_for: NaiveDate,
    pub(crate) monthly_totals: MonthlyTotals,
    pub(crate) insights: Vec<Insight>,
    pub(crate) summary: CollectionSummary,
    pub(crate) leaderboard: Vec<ContributorEarnings>,
}

impl InsightResponse {
    pub(crate) fn assemble(
        engine: &InsightEngine,
        records: &[CollectionRecord],
        contributors: &[Contributor],
        catalog: &WasteCatalog,
        now: NaiveDate,
    ) -> (Self, InsightReport) {
        let report = engine.generate(records, contributors, now);
        let response = Self {
            generated_for: now,
            monthly_totals: report.monthly_totals.clone(),
            insights: report.insights().to_vec(),
            summary: CollectionSummary::compute(records, catalog),
            leaderboard: contributor_earnings(contributors, records, catalog),
        };
        (response, report)
    }
}

pub(crate) fn insight_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/insights", axum::routing::post(insights_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn insights_endpoint(
    Extension(state): Extension<EngineState>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightResponse>, AppError> {
    let Json(payload) = payload.inspect_err(|rejection| {
        tracing::warn!(%rejection, "rejected insight request body");
    })?;
    let InsightRequest {
        records,
        contributors,
        now,
        catalog,
    } = payload;

    let now = now.unwrap_or_else(|| Local::now().date_naive());
    let (response, report) =
        InsightResponse::assemble(&state.engine, &records, &contributors, &catalog, now);

    tracing::info!(
        records = records.len(),
        contributors = contributors.len(),
        %now,
        trend = report.trend.label.label(),
        "insight report served"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;
    use waste_insights::error::AppError;
use waste_insights::insights::{InsightKind, Severity};

    fn engine_state() -> EngineState {
        EngineState {
            engine: Arc::new(InsightEngine::default()),
        }
    }

    fn sample_request() -> InsightRequest {
        serde_json::from_value(json!({
            "records": [
                { "berat": 50, "jenisSampah": "Plastik", "waktu": "2025-02-11T09:00:00Z", "rt": "RT 01", "userId": "a" },
                { "berat": "50", "jenisSampah": "Plastik", "waktu": "2025-03-03T09:00:00Z", "rt": "RT 02", "userId": "b" }
            ],
            "contributors": [
                { "id": "a", "display_name": "A", "score": 10 },
                { "id": "b", "display_name": "B", "score": 30 }
            ],
            "now": "2025-03-18",
            "catalog": [
                { "name": "Plastik", "pricePerKg": 2500, "recyclable": true }
            ]
        }))
        .expect("request parses")
    }

    #[tokio::test]
    async fn insights_endpoint_returns_six_ordered_insights() {
        let Json(body) = insights_endpoint(Extension(engine_state()), Ok(Json(sample_request())))
            .await
            .expect("valid request succeeds");

        assert_eq!(body.generated_for.to_string(), "2025-03-18");
        assert_eq!(body.insights.len(), 6);
        let kinds: Vec<InsightKind> = body.insights.iter().map(|insight| insight.kind).collect();
        assert_eq!(kinds, InsightKind::ordered().to_vec());
        assert_eq!(body.insights[0].text, "Predicted waste trend: Stable");
        assert_eq!(body.insights[5].severity, Severity::Highlight);
        assert_eq!(body.summary.total_earnings, 250_000.0);
        assert_eq!(body.leaderboard[1].total_earnings, 125_000.0);
    }

    #[tokio::test]
    async fn router_serves_health_and_insights() {
        let app = insight_routes().layer(Extension(engine_state()));

        let health = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("health responds");
        assert_eq!(health.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/insights")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"records": [], "now": "2025-03-18"}"#))
                    .expect("request builds"),
            )
            .await
            .expect("insights respond");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["insights"].as_array().map(Vec::len), Some(6));
        assert_eq!(body["insights"][5]["text"], "No contributor recorded yet");
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_bad_request() {
        let app = insight_routes().layer(Extension(engine_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/insights")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"records": [ {"berat": 3"#))
                    .expect("request builds"),
            )
            .await
            .expect("insights respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        let message = body["error"].as_str().expect("error message present");
        assert!(message.starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };

        let response = readiness_endpoint(Extension(state)).await.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
