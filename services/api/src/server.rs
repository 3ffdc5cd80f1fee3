use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use hirelane::config::AppConfig;
use hirelane::error::AppError;
use hirelane::pipeline::{PipelineService, ScoringConfig};
use hirelane::telemetry;

use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicationStore, InMemoryQuestionBank, KeywordEvaluator};
use crate::routes::with_pipeline_routes;

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

    let store = Arc::new(InMemoryApplicationStore::default());
    let bank = Arc::new(InMemoryQuestionBank::seeded());
    let evaluator = Arc::new(KeywordEvaluator);
    let service = Arc::new(PipelineService::new(
        store,
        bank.clone(),
        evaluator,
        ScoringConfig::default(),
    ));

    let app = with_pipeline_routes(service)
        .layer(Extension(app_state))
        .layer(Extension(bank))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring assessment pipeline ready");

    axum::serve(listener, app).await?;
    Ok(())
}
