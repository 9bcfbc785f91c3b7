use crate::cli::ServeArgs;
use crate::infra::{AppState, EngineState};
use crate::routes::insight_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use waste_insights::config::AppConfig;
use waste_insights::error::AppError;
use waste_insights::insights::InsightEngine;
use waste_insights::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = InsightEngine::new(config.insights.clone())?;
    let engine_state = EngineState {
        engine: Arc::new(engine),
    };

    let app = insight_routes()
        .layer(Extension(engine_state))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        window_months = config.insights.window_months,
        target_category = %config.insights.target_category,
        "waste insight service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
