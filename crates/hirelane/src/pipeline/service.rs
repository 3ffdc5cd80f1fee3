use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    Application, ApplicationStatus, AssessmentId, CandidateId, Question, Stage, StageKey,
    StageScore,
};
use super::proctor::VISIBILITY_DISQUALIFICATION_REASON;
use super::question_bank::{BankError, QuestionBank};
use super::scorer::{AnswerEvaluator, ScoreReport, Scorer, ScoringConfig};
use super::store::{ApplicationStore, StoreError};

/// The pipeline state machine: owns the application aggregate and is the only
/// writer of its state.
///
/// Every transition follows the same commit discipline: load a fresh
/// snapshot, check terminality, mutate, and `upsert` with the loaded
/// revision. A racing commit surfaces as [`PipelineError::Store`] with a
/// conflict, and the caller retries from a fresh read; a retry that finds a
/// terminal record gets [`PipelineError::InvalidTransition`]. That is how a
/// disqualification that logically precedes or races a stage completion
/// always wins.
pub struct PipelineService<S, Q, E> {
    store: Arc<S>,
    bank: Arc<Q>,
    evaluator: Arc<E>,
    scorer: Scorer,
}

impl<S, Q, E> PipelineService<S, Q, E>
where
    S: ApplicationStore + 'static,
    Q: QuestionBank + 'static,
    E: AnswerEvaluator + 'static,
{
    pub fn new(store: Arc<S>, bank: Arc<Q>, evaluator: Arc<E>, config: ScoringConfig) -> Self {
        Self {
            store,
            bank,
            evaluator,
            scorer: Scorer::new(config),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn question_bank(&self) -> &Q {
        self.bank.as_ref()
    }

    /// Idempotent: returns the existing application when present, otherwise
    /// creates a fresh stage-1 record.
    pub fn select_assessment(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
    ) -> Result<Application, PipelineError> {
        self.bank
            .assessment(assessment_id)?
            .ok_or(PipelineError::NotFound)?;

        if let Some(existing) = self.store.load(candidate, assessment_id)? {
            return Ok(existing);
        }

        self.guard_single_offer(candidate)?;

        let application = Application::new(candidate.clone(), assessment_id.clone());
        let stored = self.store.upsert(application)?;
        info!(candidate = %candidate, assessment = %assessment_id, "application created");
        Ok(stored)
    }

    /// Read-only snapshot for UI rendering.
    pub fn get_status(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
    ) -> Result<Application, PipelineError> {
        self.store
            .load(candidate, assessment_id)?
            .ok_or(PipelineError::NotFound)
    }

    /// Stage 1: screen the resume against the role. At or above the
    /// shortlist threshold the candidate advances; below it the application
    /// is rejected outright, with no disqualification reason.
    pub fn submit_resume(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
        resume_text: &str,
    ) -> Result<Application, PipelineError> {
        let assessment = self
            .bank
            .assessment(assessment_id)?
            .ok_or(PipelineError::NotFound)?;

        // A resume upload is a valid first action; it creates the
        // application when selection has not happened yet.
        let mut application = match self.store.load(candidate, assessment_id)? {
            Some(existing) => existing,
            None => {
                self.guard_single_offer(candidate)?;
                Application::new(candidate.clone(), assessment_id.clone())
            }
        };

        self.ensure_at_stage(&application, Stage::ResumeScreening)?;

        let report = self.scorer.screen_resume(resume_text, &assessment);
        application.record_score(StageKey::Resume, StageScore::new(report.score, report.feedback));

        if report.score >= self.scorer.config().shortlist_threshold {
            application.stage = Stage::Psychometric;
            application.strike_count = 0;
            info!(
                candidate = %candidate,
                assessment = %assessment_id,
                score = report.score,
                "resume shortlisted, advancing to psychometric stage"
            );
        } else {
            application.status = ApplicationStatus::Rejected;
            info!(
                candidate = %candidate,
                assessment = %assessment_id,
                score = report.score,
                "resume below shortlist threshold, application rejected"
            );
        }

        application.touch();
        Ok(self.store.upsert(application)?)
    }

    /// Stages 2 and 3: record the supplied score and advance unconditionally.
    /// There is no per-stage cutoff before the final aggregate.
    pub fn complete_stage(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
        stage_number: u8,
        score: u8,
        feedback: String,
    ) -> Result<Application, PipelineError> {
        let stage = Stage::from_number(stage_number)
            .filter(|stage| matches!(stage, Stage::Psychometric | Stage::ResumeTechnical))
            .ok_or_else(|| {
                PipelineError::InvalidTransition(format!(
                    "stage {stage_number} cannot be completed through this operation"
                ))
            })?;

        let mut application = self.get_status(candidate, assessment_id)?;
        self.ensure_at_stage(&application, stage)?;

        application.record_score(stage.score_key(), StageScore::new(score, feedback));
        application.stage = stage.next().unwrap_or(application.stage);
        application.strike_count = 0;
        application.touch();

        let stored = self.store.upsert(application)?;
        info!(
            candidate = %candidate,
            assessment = %assessment_id,
            stage = stage.label(),
            score,
            "stage completed"
        );
        Ok(stored)
    }

    /// Score a free-text answer set without mutating any application. Used by
    /// the operator layer before `complete_stage` for non-auto-scorable
    /// content.
    pub async fn evaluate_stage(
        &self,
        candidate: &CandidateId,
        questions: &[Question],
        answers: &[String],
    ) -> ScoreReport {
        let report = self
            .scorer
            .evaluate_free_text(self.evaluator.as_ref(), questions, answers)
            .await;
        info!(candidate = %candidate, score = report.score, "answer set evaluated");
        report
    }

    /// Stage 4: score the final answers, compute the weighted aggregate, and
    /// settle the terminal qualification decision.
    pub async fn submit_final(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
        answers: &[String],
    ) -> Result<Application, PipelineError> {
        let application = self.get_status(candidate, assessment_id)?;
        self.ensure_at_stage(&application, Stage::FinalAssessment)?;

        let assessment = self
            .bank
            .assessment(assessment_id)?
            .ok_or(PipelineError::NotFound)?;

        // The evaluator is awaited before any commit; no lock is held across
        // this call.
        let stage4 = self
            .scorer
            .score_final_stage(self.evaluator.as_ref(), &assessment.questions, answers)
            .await;

        // Reload after the await so a disqualification that landed while the
        // evaluator was in flight wins before we attempt a commit.
        let mut application = self.get_status(candidate, assessment_id)?;
        self.ensure_at_stage(&application, Stage::FinalAssessment)?;

        let resume = self.recorded_score(&application, StageKey::Resume)?;
        let psychometric = self.recorded_score(&application, StageKey::Stage2)?;
        let resume_tech = self.recorded_score(&application, StageKey::Stage3)?;

        let (final_score, breakdown) =
            self.scorer
                .final_outcome(resume, psychometric, resume_tech, stage4.score);

        let qualified = self.scorer.qualifies(final_score);
        application.status = if qualified {
            ApplicationStatus::Qualified
        } else {
            ApplicationStatus::Rejected
        };

        let feedback = if qualified {
            format!(
                "Qualified with a weighted score of {final_score}. {}",
                stage4.feedback
            )
        } else {
            format!(
                "Weighted score {final_score} is below the qualification threshold. {}",
                stage4.feedback
            )
        };
        let mut final_entry = StageScore::new(final_score, feedback);
        final_entry.breakdown = Some(breakdown);
        application.record_score(StageKey::Final, final_entry);
        application.touch();

        let stored = self.store.upsert(application)?;
        info!(
            candidate = %candidate,
            assessment = %assessment_id,
            final_score,
            qualified,
            "final assessment settled"
        );
        Ok(stored)
    }

    /// Proctoring strike from the monitor. Strikes below the limit only move
    /// the counter; the limit triggers exactly one disqualification. Events
    /// against an already-terminal application are dropped so the monitor
    /// can never double-fire.
    pub fn report_violation(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
    ) -> Result<Application, PipelineError> {
        let mut application = self.get_status(candidate, assessment_id)?;
        if application.is_terminal() {
            return Ok(application);
        }

        application.strike_count = application.strike_count.saturating_add(1);

        if application.strike_count >= self.scorer.config().max_strikes {
            application.status = ApplicationStatus::Disqualified;
            application.disqualification_reason =
                Some(VISIBILITY_DISQUALIFICATION_REASON.to_string());
            warn!(
                candidate = %candidate,
                assessment = %assessment_id,
                "visibility-loss limit reached, application disqualified"
            );
        } else {
            warn!(
                candidate = %candidate,
                assessment = %assessment_id,
                strikes = application.strike_count,
                limit = self.scorer.config().max_strikes,
                "proctoring strike recorded"
            );
        }

        application.touch();
        Ok(self.store.upsert(application)?)
    }

    /// Administrative reset back to stage 1. Not permitted once qualified.
    pub fn restart(
        &self,
        candidate: &CandidateId,
        assessment_id: &AssessmentId,
    ) -> Result<Application, PipelineError> {
        let mut application = self.get_status(candidate, assessment_id)?;
        if application.status == ApplicationStatus::Qualified {
            return Err(PipelineError::InvalidTransition(
                "qualified applications cannot be restarted".to_string(),
            ));
        }

        application.stage = Stage::ResumeScreening;
        application.status = ApplicationStatus::InProgress;
        application.stage_scores.clear();
        application.disqualification_reason = None;
        application.strike_count = 0;
        application.touch();

        let stored = self.store.upsert(application)?;
        info!(candidate = %candidate, assessment = %assessment_id, "application restarted");
        Ok(stored)
    }

    /// A candidate holding a qualified application anywhere may not activate
    /// another one.
    fn guard_single_offer(&self, candidate: &CandidateId) -> Result<(), PipelineError> {
        let qualified = self
            .store
            .list_by_candidate(candidate)?
            .into_iter()
            .find(|application| application.status == ApplicationStatus::Qualified);

        match qualified {
            Some(application) => Err(PipelineError::SingleOfferViolation {
                assessment_id: application.assessment_id.0,
            }),
            None => Ok(()),
        }
    }

    fn ensure_at_stage(
        &self,
        application: &Application,
        expected: Stage,
    ) -> Result<(), PipelineError> {
        if application.is_terminal() {
            return Err(PipelineError::InvalidTransition(format!(
                "application is terminal ({})",
                application.status.label()
            )));
        }
        if application.stage != expected {
            return Err(PipelineError::InvalidTransition(format!(
                "expected stage '{}', application is at '{}'",
                expected.label(),
                application.stage.label()
            )));
        }
        Ok(())
    }

    fn recorded_score(
        &self,
        application: &Application,
        key: StageKey,
    ) -> Result<u8, PipelineError> {
        application.stage_score(key).ok_or_else(|| {
            PipelineError::InvalidTransition(format!(
                "missing recorded score for '{}'",
                key.as_str()
            ))
        })
    }
}

/// Error raised by the pipeline service.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no application exists for this candidate and assessment")]
    NotFound,
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("candidate already qualified for assessment '{assessment_id}'")]
    SingleOfferViolation { assessment_id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
