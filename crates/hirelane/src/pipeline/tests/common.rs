use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::pipeline::domain::{
    Application, Assessment, AssessmentId, CandidateId, Difficulty, Question, QuestionKind,
};
use crate::pipeline::question_bank::{BankError, QuestionBank};
use crate::pipeline::scorer::{
    AnswerEvaluator, BoxFuture, EvaluationRequest, EvaluatorError, EvaluatorReply, ScoringConfig,
};
use crate::pipeline::service::PipelineService;
use crate::pipeline::store::{ApplicationStore, StoreError};

pub(super) fn candidate() -> CandidateId {
    CandidateId("ada@example.com".to_string())
}

pub(super) fn other_candidate() -> CandidateId {
    CandidateId("grace@example.com".to_string())
}

pub(super) fn assessment_id() -> AssessmentId {
    AssessmentId("fullstack-dev".to_string())
}

pub(super) fn other_assessment_id() -> AssessmentId {
    AssessmentId("ai-engineer".to_string())
}

pub(super) fn mc_question(id: &str, prompt: &str, options: &[&str], key: Option<&str>) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind: QuestionKind::MultipleChoice {
            options: options.iter().map(|option| option.to_string()).collect(),
            answer_key: key.map(|key| key.to_string()),
        },
        difficulty: Some(Difficulty::Easy),
        keywords: Vec::new(),
    }
}

pub(super) fn open_question(id: &str, prompt: &str, keywords: &[&str]) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind: QuestionKind::FreeText,
        difficulty: Some(Difficulty::Medium),
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
    }
}

pub(super) fn assessment() -> Assessment {
    Assessment {
        assessment_id: assessment_id(),
        role_title: "Full Stack Developer".to_string(),
        job_description: "React frontend, FastAPI-style services, SQL storage.".to_string(),
        suggested_skills: vec![
            "React".to_string(),
            "Python".to_string(),
            "SQL".to_string(),
        ],
        questions: vec![
            open_question(
                "j1",
                "Explain how a virtual DOM improves rendering performance.",
                &["diffing", "reconciliation"],
            ),
            open_question(
                "j2",
                "Contrast the PUT and PATCH HTTP methods.",
                &["replace", "partial"],
            ),
            open_question(
                "j3",
                "How would you run database migrations without downtime?",
                &["migration", "backup"],
            ),
        ],
    }
}

pub(super) fn other_assessment() -> Assessment {
    Assessment {
        assessment_id: other_assessment_id(),
        role_title: "AI Engineer".to_string(),
        job_description: "LLM integration and retrieval pipelines.".to_string(),
        suggested_skills: vec!["Python".to_string(), "PyTorch".to_string()],
        questions: vec![open_question(
            "s1",
            "Describe the architecture of a retrieval-augmented pipeline.",
            &["retrieval", "embedding"],
        )],
    }
}

pub(super) fn psychometric_set() -> Vec<Question> {
    vec![
        mc_question("p1", "Pick the odd one out.", &["a", "b", "c"], Some("c")),
        mc_question("p2", "Complete the sequence.", &["2", "4", "8"], Some("8")),
        mc_question("p3", "Choose the closest synonym.", &["x", "y"], Some("x")),
        mc_question("p4", "Select the best response.", &["i", "ii"], Some("ii")),
    ]
}

/// Hits three section checkpoints and at least three keywords: scores 100.
pub(super) fn strong_resume() -> &'static str {
    "Experience: five years building React and Python services.\n\
     Education: BSc Computer Science.\n\
     Skills: React, Python, SQL, Docker.\n\
     Projects: internal tooling and dashboards."
}

/// No recognizable sections or keywords: scores 40, below the shortlist bar.
pub(super) fn plain_resume() -> &'static str {
    "I like computers and want a job."
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<HashMap<(CandidateId, AssessmentId), Application>>,
}

impl MemoryStore {
    pub(super) fn stored(
        &self,
        candidate: &CandidateId,
        assessment: &AssessmentId,
    ) -> Option<Application> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .get(&(candidate.clone(), assessment.clone()))
            .cloned()
    }

    /// Test seam: force-write a record, bypassing the revision check.
    pub(super) fn seed(&self, mut application: Application) {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        application.revision += 1;
        guard.insert(
            (
                application.candidate_id.clone(),
                application.assessment_id.clone(),
            ),
            application,
        );
    }
}

impl ApplicationStore for MemoryStore {
    fn load(
        &self,
        candidate: &CandidateId,
        assessment: &AssessmentId,
    ) -> Result<Option<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(&(candidate.clone(), assessment.clone())).cloned())
    }

    fn upsert(&self, mut application: Application) -> Result<Application, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let key = (
            application.candidate_id.clone(),
            application.assessment_id.clone(),
        );
        match guard.get(&key) {
            Some(existing) if existing.revision != application.revision => {
                return Err(StoreError::Conflict)
            }
            None if application.revision != 0 => return Err(StoreError::Conflict),
            _ => {}
        }
        application.revision += 1;
        guard.insert(key, application.clone());
        Ok(application)
    }

    fn list_by_candidate(&self, candidate: &CandidateId) -> Result<Vec<Application>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| &application.candidate_id == candidate)
            .cloned()
            .collect())
    }
}

pub(super) struct MemoryBank {
    assessments: HashMap<AssessmentId, Assessment>,
    psychometric: Vec<Question>,
}

impl Default for MemoryBank {
    fn default() -> Self {
        let mut assessments = HashMap::new();
        assessments.insert(assessment_id(), assessment());
        assessments.insert(other_assessment_id(), other_assessment());
        Self {
            assessments,
            psychometric: psychometric_set(),
        }
    }
}

impl QuestionBank for MemoryBank {
    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, BankError> {
        Ok(self.assessments.get(id).cloned())
    }

    fn psychometric_set(&self) -> Result<Vec<Question>, BankError> {
        Ok(self.psychometric.clone())
    }

    fn resume_set(&self, _candidate: &CandidateId) -> Result<Vec<Question>, BankError> {
        Ok(vec![open_question(
            "r1",
            "Walk through the most complex system on your resume.",
            &["architecture", "tradeoff"],
        )])
    }
}

/// Evaluator double returning a fixed reply. Validation happens in the
/// scorer, so invalid scores or empty feedback exercise the malformed path.
pub(super) struct ScriptedEvaluator {
    pub(super) score: f64,
    pub(super) feedback: String,
}

impl ScriptedEvaluator {
    pub(super) fn passing(score: f64) -> Self {
        Self {
            score,
            feedback: "Covered the expected concepts.".to_string(),
        }
    }
}

impl AnswerEvaluator for ScriptedEvaluator {
    fn evaluate(
        &self,
        _request: EvaluationRequest,
    ) -> BoxFuture<'_, Result<EvaluatorReply, EvaluatorError>> {
        let reply = EvaluatorReply {
            score: self.score,
            feedback: self.feedback.clone(),
        };
        Box::pin(async move { Ok(reply) })
    }
}

pub(super) struct FailingEvaluator;

impl AnswerEvaluator for FailingEvaluator {
    fn evaluate(
        &self,
        _request: EvaluationRequest,
    ) -> BoxFuture<'_, Result<EvaluatorReply, EvaluatorError>> {
        Box::pin(async move { Err(EvaluatorError::Unreachable("connection refused".to_string())) })
    }
}

pub(super) type TestService<E = ScriptedEvaluator> = PipelineService<MemoryStore, MemoryBank, E>;

pub(super) fn build_service(evaluator: ScriptedEvaluator) -> (Arc<TestService>, Arc<MemoryStore>) {
    build_service_with(evaluator)
}

pub(super) fn build_service_with<E>(evaluator: E) -> (Arc<TestService<E>>, Arc<MemoryStore>)
where
    E: AnswerEvaluator + 'static,
{
    let store = Arc::new(MemoryStore::default());
    let bank = Arc::new(MemoryBank::default());
    let service = Arc::new(PipelineService::new(
        store.clone(),
        bank,
        Arc::new(evaluator),
        ScoringConfig::default(),
    ));
    (service, store)
}

/// Progress a fresh application through stages 1-3 with the given scores.
/// The strong resume fixture pins the stage-1 score at 100.
pub(super) fn advance_to_final<E>(
    service: &TestService<E>,
    candidate: &CandidateId,
    stage2_score: u8,
    stage3_score: u8,
) where
    E: AnswerEvaluator + 'static,
{
    let id = assessment_id();
    service
        .submit_resume(candidate, &id, strong_resume())
        .expect("resume shortlists");
    service
        .complete_stage(candidate, &id, 2, stage2_score, "psychometric done".to_string())
        .expect("stage 2 completes");
    service
        .complete_stage(candidate, &id, 3, stage3_score, "technical done".to_string())
        .expect("stage 3 completes");
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
