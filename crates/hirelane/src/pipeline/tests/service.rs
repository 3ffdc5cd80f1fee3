use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::common::*;
use crate::pipeline::domain::{
    Application, ApplicationStatus, AssessmentId, CandidateId, Stage, StageKey,
};
use crate::pipeline::proctor::VISIBILITY_DISQUALIFICATION_REASON;
use crate::pipeline::scorer::ScoringConfig;
use crate::pipeline::service::{PipelineError, PipelineService};
use crate::pipeline::store::{ApplicationStore, StoreError};

#[test]
fn select_assessment_is_idempotent() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();

    let first = service
        .select_assessment(&candidate, &id)
        .expect("first selection creates");
    let second = service
        .select_assessment(&candidate, &id)
        .expect("second selection resumes");

    assert_eq!(first.stage, Stage::ResumeScreening);
    assert_eq!(first.status, ApplicationStatus::InProgress);
    assert_eq!(first, second, "no duplicate creation, no score reset");
}

#[test]
fn select_unknown_assessment_is_not_found() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let missing = AssessmentId("does-not-exist".to_string());

    match service.select_assessment(&candidate(), &missing) {
        Err(PipelineError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn shortlisted_resume_advances_to_psychometric() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();

    let application = service
        .submit_resume(&candidate, &assessment_id(), strong_resume())
        .expect("resume accepted");

    assert_eq!(application.stage, Stage::Psychometric);
    assert_eq!(application.status, ApplicationStatus::InProgress);
    assert_eq!(application.stage_score(StageKey::Resume), Some(100));
}

#[test]
fn weak_resume_rejects_immediately() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();

    let application = service
        .submit_resume(&candidate, &assessment_id(), plain_resume())
        .expect("resume processed");

    assert_eq!(application.status, ApplicationStatus::Rejected);
    assert_eq!(application.stage, Stage::ResumeScreening);
    assert_eq!(application.stage_score(StageKey::Resume), Some(40));
    assert!(application.stage_scores.get(&StageKey::Stage2).is_none());
    assert!(application.stage_scores.get(&StageKey::Final).is_none());
    assert!(
        application.disqualification_reason.is_none(),
        "rejected is not disqualified"
    );
}

#[test]
fn resume_upload_creates_the_application_when_missing() {
    let (service, store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();

    assert!(store.stored(&candidate, &id).is_none());
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("first action creates the record");
    assert!(store.stored(&candidate, &id).is_some());
}

#[test]
fn complete_stage_records_score_and_advances() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");

    // A strike in flight is cleared when the stage turns over.
    service
        .report_violation(&candidate, &id)
        .expect("strike recorded");

    let application = service
        .complete_stage(&candidate, &id, 2, 90, "sharp".to_string())
        .expect("stage 2 completes");

    assert_eq!(application.stage, Stage::ResumeTechnical);
    assert_eq!(application.stage_score(StageKey::Stage2), Some(90));
    assert_eq!(application.strike_count, 0);
}

#[test]
fn complete_stage_rejects_mismatched_stage() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");

    match service.complete_stage(&candidate, &id, 3, 70, "too soon".to_string()) {
        Err(PipelineError::InvalidTransition(_)) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn complete_stage_only_accepts_stages_two_and_three() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .select_assessment(&candidate, &id)
        .expect("application exists");

    for stage in [0u8, 1, 4, 9] {
        match service.complete_stage(&candidate, &id, stage, 70, "nope".to_string()) {
            Err(PipelineError::InvalidTransition(_)) => {}
            other => panic!("stage {stage} should be invalid, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn final_score_of_exactly_seventy_qualifies() {
    // resume 100, stage2 70, stage3 60, stage4 60:
    // 0.2*100 + 0.2*70 + 0.3*60 + 0.3*60 = 70
    let (service, _store) = build_service(ScriptedEvaluator::passing(60.0));
    let candidate = candidate();
    advance_to_final(service.as_ref(), &candidate, 70, 60);

    let application = service
        .submit_final(&candidate, &assessment_id(), &answers())
        .await
        .expect("final settles");

    assert_eq!(application.status, ApplicationStatus::Qualified);
    assert_eq!(application.stage_score(StageKey::Final), Some(70));
}

#[tokio::test]
async fn final_score_of_sixty_nine_rejects() {
    // resume 100, stage2 70, stage3 60, stage4 56 -> round(68.8) = 69
    let (service, _store) = build_service(ScriptedEvaluator::passing(56.0));
    let candidate = candidate();
    advance_to_final(service.as_ref(), &candidate, 70, 60);

    let application = service
        .submit_final(&candidate, &assessment_id(), &answers())
        .await
        .expect("final settles");

    assert_eq!(application.status, ApplicationStatus::Rejected);
    assert_eq!(application.stage_score(StageKey::Final), Some(69));
    assert!(application.disqualification_reason.is_none());
}

#[tokio::test]
async fn final_entry_carries_the_module_breakdown() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(64.0));
    let candidate = candidate();
    advance_to_final(service.as_ref(), &candidate, 85, 72);

    let application = service
        .submit_final(&candidate, &assessment_id(), &answers())
        .await
        .expect("final settles");

    let final_entry = application
        .stage_scores
        .get(&StageKey::Final)
        .expect("final recorded");
    let breakdown = final_entry.breakdown.expect("breakdown recorded");
    assert_eq!(breakdown.resume_parsing, 100);
    assert_eq!(breakdown.psychometric, 85);
    assert_eq!(breakdown.resume_tech, 72);
    assert_eq!(breakdown.jd_test, 64);
}

#[tokio::test]
async fn submit_final_requires_the_final_stage() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(64.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");

    match service.submit_final(&candidate, &id, &answers()).await {
        Err(PipelineError::InvalidTransition(_)) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[tokio::test]
async fn evaluator_outage_degrades_instead_of_stalling() {
    let (service, _store) = build_service_with(FailingEvaluator);
    let candidate = candidate();
    advance_to_final(&service, &candidate, 70, 60);

    let application = service
        .submit_final(&candidate, &assessment_id(), &answers())
        .await
        .expect("final settles on the fallback score");

    // Fallback stage4 score is 75: 20 + 14 + 18 + 22.5 -> 75 (rounded).
    assert!(application.is_terminal());
    let final_entry = application
        .stage_scores
        .get(&StageKey::Final)
        .expect("final recorded");
    assert_eq!(final_entry.breakdown.expect("breakdown").jd_test, 75);
}

#[test]
fn two_strikes_warn_and_the_third_disqualifies() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");

    let first = service.report_violation(&candidate, &id).expect("strike 1");
    assert_eq!(first.status, ApplicationStatus::InProgress);
    assert_eq!(first.strike_count, 1);

    let second = service.report_violation(&candidate, &id).expect("strike 2");
    assert_eq!(second.status, ApplicationStatus::InProgress);
    assert_eq!(second.strike_count, 2);

    let third = service.report_violation(&candidate, &id).expect("strike 3");
    assert_eq!(third.status, ApplicationStatus::Disqualified);
    assert_eq!(
        third.disqualification_reason.as_deref(),
        Some(VISIBILITY_DISQUALIFICATION_REASON)
    );
}

#[test]
fn violations_on_a_terminal_application_are_dropped() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");
    for _ in 0..3 {
        service.report_violation(&candidate, &id).expect("strike");
    }

    let after = service
        .report_violation(&candidate, &id)
        .expect("extra report is a no-op");
    assert_eq!(after.status, ApplicationStatus::Disqualified);
    assert_eq!(after.strike_count, 3, "counter stops at the firing strike");
}

#[test]
fn qualified_candidate_cannot_open_another_application() {
    let (service, store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();

    let mut qualified = Application::new(candidate.clone(), assessment_id());
    qualified.status = ApplicationStatus::Qualified;
    store.seed(qualified);

    match service.select_assessment(&candidate, &other_assessment_id()) {
        Err(PipelineError::SingleOfferViolation { assessment_id }) => {
            assert_eq!(assessment_id, "fullstack-dev");
        }
        other => panic!("expected single-offer violation, got {other:?}"),
    }
}

#[test]
fn disqualified_candidate_may_try_a_different_assessment() {
    let (service, store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();

    let mut disqualified = Application::new(candidate.clone(), assessment_id());
    disqualified.status = ApplicationStatus::Disqualified;
    disqualified.disqualification_reason = Some(VISIBILITY_DISQUALIFICATION_REASON.to_string());
    store.seed(disqualified);

    let fresh = service
        .select_assessment(&candidate, &other_assessment_id())
        .expect("disqualification elsewhere does not block");
    assert_eq!(fresh.stage, Stage::ResumeScreening);
    assert_eq!(fresh.status, ApplicationStatus::InProgress);
}

#[test]
fn restart_resets_progress_and_scores() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");
    service
        .complete_stage(&candidate, &id, 2, 88, "done".to_string())
        .expect("stage 2 completes");

    let application = service.restart(&candidate, &id).expect("restart accepted");

    assert_eq!(application.stage, Stage::ResumeScreening);
    assert_eq!(application.status, ApplicationStatus::InProgress);
    assert!(application.stage_scores.is_empty());
    assert_eq!(application.strike_count, 0);
}

#[test]
fn restart_is_rejected_once_qualified() {
    let (service, store) = build_service(ScriptedEvaluator::passing(80.0));
    let candidate = candidate();

    let mut qualified = Application::new(candidate.clone(), assessment_id());
    qualified.status = ApplicationStatus::Qualified;
    store.seed(qualified);

    match service.restart(&candidate, &assessment_id()) {
        Err(PipelineError::InvalidTransition(_)) => {}
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn status_for_unknown_application_is_not_found() {
    let (service, _store) = build_service(ScriptedEvaluator::passing(80.0));
    match service.get_status(&other_candidate(), &assessment_id()) {
        Err(PipelineError::NotFound) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

/// Store wrapper simulating a disqualification that commits while a stage
/// completion is in flight: the first armed `upsert` first lands three
/// strikes, so the foreground commit hits a revision conflict.
struct RacingStore {
    inner: Arc<MemoryStore>,
    armed: AtomicBool,
}

impl RacingStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn land_disqualification(&self, candidate: &CandidateId, assessment: &AssessmentId) {
        let mut current = self
            .inner
            .load(candidate, assessment)
            .expect("load")
            .expect("record present");
        current.strike_count = 3;
        current.status = ApplicationStatus::Disqualified;
        current.disqualification_reason = Some(VISIBILITY_DISQUALIFICATION_REASON.to_string());
        self.inner.upsert(current).expect("racing commit lands");
    }
}

impl ApplicationStore for RacingStore {
    fn load(
        &self,
        candidate: &CandidateId,
        assessment: &AssessmentId,
    ) -> Result<Option<Application>, StoreError> {
        self.inner.load(candidate, assessment)
    }

    fn upsert(&self, application: Application) -> Result<Application, StoreError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.land_disqualification(&application.candidate_id, &application.assessment_id);
        }
        self.inner.upsert(application)
    }

    fn list_by_candidate(&self, candidate: &CandidateId) -> Result<Vec<Application>, StoreError> {
        self.inner.list_by_candidate(candidate)
    }
}

#[test]
fn concurrent_disqualification_beats_a_stage_completion() {
    let memory = Arc::new(MemoryStore::default());
    let racing = Arc::new(RacingStore::new(memory.clone()));
    let service = PipelineService::new(
        racing.clone(),
        Arc::new(MemoryBank::default()),
        Arc::new(ScriptedEvaluator::passing(80.0)),
        ScoringConfig::default(),
    );

    let candidate = candidate();
    let id = assessment_id();
    service
        .submit_resume(&candidate, &id, strong_resume())
        .expect("shortlisted");
    service
        .complete_stage(&candidate, &id, 2, 90, "done".to_string())
        .expect("stage 2 completes");

    // Third strike lands between the stage-3 read and its commit.
    racing.arm();
    match service.complete_stage(&candidate, &id, 3, 80, "in flight".to_string()) {
        Err(PipelineError::Store(StoreError::Conflict)) => {}
        other => panic!("expected a commit conflict, got {other:?}"),
    }

    let stored = memory
        .stored(&candidate, &id)
        .expect("record still present");
    assert_eq!(stored.status, ApplicationStatus::Disqualified);
    assert_ne!(stored.stage, Stage::FinalAssessment);

    // The mandated retry from a fresh read now sees the terminal record.
    match service.complete_stage(&candidate, &id, 3, 80, "retry".to_string()) {
        Err(PipelineError::InvalidTransition(_)) => {}
        other => panic!("expected invalid transition on retry, got {other:?}"),
    }
}

fn answers() -> Vec<String> {
    vec![
        "Diffing and reconciliation avoid full re-renders.".to_string(),
        "PUT replaces, PATCH applies a partial update.".to_string(),
        "Run migrations with a backup and rolling deploys.".to_string(),
    ]
}
