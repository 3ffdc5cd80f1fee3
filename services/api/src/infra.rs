use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use hirelane::pipeline::scorer::BoxFuture;
use hirelane::pipeline::{
    AnswerEvaluator, Application, ApplicationStore, Assessment, AssessmentId, BankError,
    CandidateId, Difficulty, EvaluationRequest, EvaluatorError, EvaluatorReply, Question,
    QuestionBank, QuestionKind, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local application store with revision-checked commits.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationStore {
    records: Arc<Mutex<HashMap<(CandidateId, AssessmentId), Application>>>,
}

impl ApplicationStore for InMemoryApplicationStore {
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

/// Question bank backed by process memory, seeded with the standard role
/// catalog and extendable at runtime with generated assessments.
pub(crate) struct InMemoryQuestionBank {
    assessments: Mutex<HashMap<AssessmentId, Assessment>>,
    psychometric: Vec<Question>,
}

impl InMemoryQuestionBank {
    pub(crate) fn seeded() -> Self {
        let mut assessments = HashMap::new();
        for assessment in seed_assessments() {
            assessments.insert(assessment.assessment_id.clone(), assessment);
        }
        Self {
            assessments: Mutex::new(assessments),
            psychometric: seed_psychometric_set(),
        }
    }

    /// Register a generated assessment so candidates can select it.
    pub(crate) fn install(&self, assessment: Assessment) {
        let mut guard = self.assessments.lock().expect("bank mutex poisoned");
        guard.insert(assessment.assessment_id.clone(), assessment);
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, BankError> {
        let guard = self.assessments.lock().expect("bank mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn psychometric_set(&self) -> Result<Vec<Question>, BankError> {
        Ok(self.psychometric.clone())
    }

    fn resume_set(&self, _candidate: &CandidateId) -> Result<Vec<Question>, BankError> {
        Ok(resume_probe_set())
    }
}

/// Deterministic free-text evaluator used when no external grading service
/// is wired in: each answer is scored by expected-keyword coverage.
#[derive(Default, Clone)]
pub(crate) struct KeywordEvaluator;

impl KeywordEvaluator {
    fn score_pair(answer: &str, expected: &[String]) -> f64 {
        let answer = answer.to_lowercase();
        if expected.is_empty() {
            // No grading hints: credit a substantive answer, nothing more.
            return if answer.trim().len() >= 40 { 70.0 } else { 30.0 };
        }
        let hits = expected
            .iter()
            .filter(|keyword| answer.contains(&keyword.to_lowercase()))
            .count();
        100.0 * hits as f64 / expected.len() as f64
    }
}

impl AnswerEvaluator for KeywordEvaluator {
    fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> BoxFuture<'_, Result<EvaluatorReply, EvaluatorError>> {
        Box::pin(async move {
            if request.pairs.is_empty() {
                return Err(EvaluatorError::Malformed("empty request".to_string()));
            }
            let total: f64 = request
                .pairs
                .iter()
                .map(|pair| Self::score_pair(&pair.answer, &pair.expected_keywords))
                .sum();
            let score = total / request.pairs.len() as f64;
            Ok(EvaluatorReply {
                score,
                feedback: format!(
                    "Keyword coverage across {} answers averaged {:.0}%.",
                    request.pairs.len(),
                    score
                ),
            })
        })
    }
}

fn mc(id: &str, prompt: &str, options: &[&str], key: &str) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind: QuestionKind::MultipleChoice {
            options: options.iter().map(|option| option.to_string()).collect(),
            answer_key: Some(key.to_string()),
        },
        difficulty: Some(Difficulty::Easy),
        keywords: Vec::new(),
    }
}

fn open(id: &str, prompt: &str, keywords: &[&str], difficulty: Difficulty) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        kind: QuestionKind::FreeText,
        difficulty: Some(difficulty),
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
    }
}

fn seed_assessments() -> Vec<Assessment> {
    vec![
        Assessment {
            assessment_id: AssessmentId("fullstack-developer".to_string()),
            role_title: "Full Stack Developer".to_string(),
            job_description: "Build and maintain React frontends backed by Python services \
                              and relational storage, owning features end to end."
                .to_string(),
            suggested_skills: vec![
                "React".to_string(),
                "Python".to_string(),
                "SQL".to_string(),
                "Docker".to_string(),
            ],
            questions: vec![
                open(
                    "fs1",
                    "Explain how the virtual DOM keeps UI updates cheap.",
                    &["diffing", "reconciliation", "render"],
                    Difficulty::Medium,
                ),
                open(
                    "fs2",
                    "Contrast the PUT and PATCH HTTP methods with an example.",
                    &["replace", "partial", "idempotent"],
                    Difficulty::Medium,
                ),
                mc(
                    "fs3",
                    "Which SQL clause removes duplicate rows from a result set?",
                    &["DISTINCT", "UNIQUE", "GROUP", "HAVING"],
                    "DISTINCT",
                ),
                open(
                    "fs4",
                    "How would you roll out a schema migration without downtime?",
                    &["migration", "backfill", "rollback"],
                    Difficulty::Hard,
                ),
            ],
        },
        Assessment {
            assessment_id: AssessmentId("ai-engineer".to_string()),
            role_title: "AI Engineer".to_string(),
            job_description: "Design retrieval pipelines and integrate large language models \
                              into production services with measurable quality."
                .to_string(),
            suggested_skills: vec![
                "Python".to_string(),
                "PyTorch".to_string(),
                "Embeddings".to_string(),
            ],
            questions: vec![
                open(
                    "ai1",
                    "Walk through the architecture of a retrieval-augmented pipeline.",
                    &["retrieval", "embedding", "context"],
                    Difficulty::Medium,
                ),
                open(
                    "ai2",
                    "How do you evaluate a model whose outputs are free text?",
                    &["benchmark", "rubric", "judge"],
                    Difficulty::Hard,
                ),
                mc(
                    "ai3",
                    "Which technique reduces hallucination by grounding answers in sources?",
                    &["fine-tuning", "retrieval augmentation", "quantization", "distillation"],
                    "retrieval augmentation",
                ),
            ],
        },
    ]
}

fn seed_psychometric_set() -> Vec<Question> {
    vec![
        mc(
            "psy1",
            "Complete the sequence: 3, 6, 12, 24, ...",
            &["36", "40", "48", "60"],
            "48",
        ),
        mc(
            "psy2",
            "Book is to reading as fork is to:",
            &["drawing", "eating", "writing", "stirring"],
            "eating",
        ),
        mc(
            "psy3",
            "A deadline slips because a teammate blocked you. What do you do first?",
            &[
                "escalate to management",
                "raise it with the teammate directly",
                "absorb the delay silently",
                "reassign the work",
            ],
            "raise it with the teammate directly",
        ),
        mc(
            "psy4",
            "Which figure does not belong: square, triangle, circle, cube?",
            &["square", "triangle", "circle", "cube"],
            "cube",
        ),
        mc(
            "psy5",
            "If all widgets are gadgets and some gadgets are tools, then:",
            &[
                "all widgets are tools",
                "some widgets may be tools",
                "no widgets are tools",
                "all tools are widgets",
            ],
            "some widgets may be tools",
        ),
        mc(
            "psy6",
            "You spot a mistake in work already shipped by a colleague. You:",
            &[
                "flag it to them with a suggested fix",
                "ignore it",
                "report it upward immediately",
                "fix it quietly without telling anyone",
            ],
            "flag it to them with a suggested fix",
        ),
    ]
}

fn resume_probe_set() -> Vec<Question> {
    vec![
        open(
            "rp1",
            "Pick the most complex system on your resume and walk through its architecture.",
            &["architecture", "tradeoff", "scale"],
            Difficulty::Medium,
        ),
        open(
            "rp2",
            "Describe a production incident you handled and what changed afterwards.",
            &["incident", "root cause", "postmortem"],
            Difficulty::Medium,
        ),
        open(
            "rp3",
            "Which listed skill is your weakest, and how have you compensated for it?",
            &["learning", "mentor", "practice"],
            Difficulty::Easy,
        ),
    ]
}
