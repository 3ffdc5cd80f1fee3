use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use hirelane::pipeline::{
    pipeline_router, AnswerEvaluator, ApplicationStore, Assessment, PipelineService, QuestionBank,
};

use crate::generator::generate_assessment;
use crate::infra::{AppState, InMemoryQuestionBank};

pub(crate) fn with_pipeline_routes<S, Q, E>(
    service: Arc<PipelineService<S, Q, E>>,
) -> axum::Router
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    pipeline_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/assessments/generate",
            axum::routing::post(generate_assessment_endpoint),
        )
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

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateAssessmentRequest {
    pub(crate) role_title: String,
    pub(crate) job_description: String,
}

/// Derive an assessment from a job description and register it with the
/// question bank so candidates can select it immediately.
pub(crate) async fn generate_assessment_endpoint(
    Extension(bank): Extension<Arc<InMemoryQuestionBank>>,
    Json(request): Json<GenerateAssessmentRequest>,
) -> Result<(StatusCode, Json<Assessment>), (StatusCode, Json<serde_json::Value>)> {
    if request.role_title.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "role_title must not be empty" })),
        ));
    }

    let assessment = generate_assessment(&request.role_title, &request.job_description);
    bank.install(assessment.clone());
    Ok((StatusCode::CREATED, Json(assessment)))
}
