use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentId, CandidateId, Question};
use super::question_bank::QuestionBank;
use super::scorer::AnswerEvaluator;
use super::service::{PipelineError, PipelineService};
use super::store::{ApplicationStore, ApplicationView, StoreError};

/// Router builder exposing the pipeline operations over HTTP. Every route is
/// keyed by candidate e-mail plus assessment id; no session state is
/// consulted.
pub fn pipeline_router<S, Q, E>(service: Arc<PipelineService<S, Q, E>>) -> Router
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    Router::new()
        .route(
            "/api/v1/pipeline/applications",
            post(select_handler::<S, Q, E>),
        )
        .route(
            "/api/v1/pipeline/applications/:email/:assessment_id",
            get(status_handler::<S, Q, E>),
        )
        .route("/api/v1/pipeline/resume", post(resume_handler::<S, Q, E>))
        .route(
            "/api/v1/pipeline/stage/complete",
            post(complete_stage_handler::<S, Q, E>),
        )
        .route(
            "/api/v1/pipeline/stage/evaluate",
            post(evaluate_stage_handler::<S, Q, E>),
        )
        .route("/api/v1/pipeline/final", post(final_handler::<S, Q, E>))
        .route(
            "/api/v1/pipeline/violation",
            post(violation_handler::<S, Q, E>),
        )
        .route("/api/v1/pipeline/restart", post(restart_handler::<S, Q, E>))
        .route(
            "/api/v1/questions/psychometric",
            get(psychometric_questions_handler::<S, Q, E>),
        )
        .route(
            "/api/v1/questions/resume/:email",
            get(resume_questions_handler::<S, Q, E>),
        )
        .route(
            "/api/v1/assessments/:assessment_id",
            get(assessment_handler::<S, Q, E>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationKeyRequest {
    pub email: String,
    pub assessment_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResumeRequest {
    pub email: String,
    pub assessment_id: String,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompleteStageRequest {
    pub email: String,
    pub assessment_id: String,
    pub stage: u8,
    pub score: u8,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateStageRequest {
    pub email: String,
    pub questions: Vec<Question>,
    pub answers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitFinalRequest {
    pub email: String,
    pub assessment_id: String,
    pub answers: Vec<String>,
}

fn error_response(error: PipelineError) -> Response {
    let status = match &error {
        PipelineError::NotFound => StatusCode::NOT_FOUND,
        PipelineError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::SingleOfferViolation { .. } => StatusCode::CONFLICT,
        PipelineError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        PipelineError::Store(_) | PipelineError::Bank(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn application_response(
    result: Result<super::domain::Application, PipelineError>,
    success: StatusCode,
) -> Response {
    match result {
        Ok(application) => {
            let view = ApplicationView::from_application(&application);
            (success, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<ApplicationKeyRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(
        service.select_assessment(&candidate, &assessment),
        StatusCode::OK,
    )
}

pub(crate) async fn status_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    Path((email, assessment_id)): Path<(String, String)>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(email);
    let assessment = AssessmentId(assessment_id);
    application_response(service.get_status(&candidate, &assessment), StatusCode::OK)
}

pub(crate) async fn resume_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<SubmitResumeRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(
        service.submit_resume(&candidate, &assessment, &request.resume_text),
        StatusCode::OK,
    )
}

pub(crate) async fn complete_stage_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<CompleteStageRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(
        service.complete_stage(
            &candidate,
            &assessment,
            request.stage,
            request.score,
            request.feedback,
        ),
        StatusCode::OK,
    )
}

pub(crate) async fn evaluate_stage_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<EvaluateStageRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let report = service
        .evaluate_stage(&candidate, &request.questions, &request.answers)
        .await;
    (StatusCode::OK, axum::Json(report)).into_response()
}

pub(crate) async fn final_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<SubmitFinalRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(
        service
            .submit_final(&candidate, &assessment, &request.answers)
            .await,
        StatusCode::OK,
    )
}

pub(crate) async fn violation_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<ApplicationKeyRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(
        service.report_violation(&candidate, &assessment),
        StatusCode::OK,
    )
}

pub(crate) async fn restart_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    axum::Json(request): axum::Json<ApplicationKeyRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(request.email);
    let assessment = AssessmentId(request.assessment_id);
    application_response(service.restart(&candidate, &assessment), StatusCode::OK)
}

pub(crate) async fn psychometric_questions_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    match service.question_bank().psychometric_set() {
        Ok(questions) => (StatusCode::OK, axum::Json(questions)).into_response(),
        Err(error) => error_response(PipelineError::Bank(error)),
    }
}

pub(crate) async fn resume_questions_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    Path(email): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let candidate = CandidateId(email);
    match service.question_bank().resume_set(&candidate) {
        Ok(questions) => (StatusCode::OK, axum::Json(questions)).into_response(),
        Err(error) => error_response(PipelineError::Bank(error)),
    }
}

pub(crate) async fn assessment_handler<S, Q, E>(
    State(service): State<Arc<PipelineService<S, Q, E>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.question_bank().assessment(&id) {
        Ok(Some(assessment)) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Ok(None) => error_response(PipelineError::NotFound),
        Err(error) => error_response(PipelineError::Bank(error)),
    }
}
