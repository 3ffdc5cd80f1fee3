use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{Application, AssessmentId, CandidateId, StageKey, StageScore};

/// Durable persistence contract for [`Application`] records, keyed by
/// (candidate, assessment).
///
/// `upsert` commits a full snapshot and must reject stale writes: the caller
/// passes the revision it loaded, and a mismatch with the stored revision is
/// a [`StoreError::Conflict`]. That compare-and-swap is what serializes the
/// candidate's foreground stage completion against the proctoring monitor's
/// background disqualification signal.
pub trait ApplicationStore: Send + Sync {
    fn load(
        &self,
        candidate: &CandidateId,
        assessment: &AssessmentId,
    ) -> Result<Option<Application>, StoreError>;

    /// Commit a snapshot, returning the stored record with its new revision.
    fn upsert(&self, application: Application) -> Result<Application, StoreError>;

    fn list_by_candidate(&self, candidate: &CandidateId) -> Result<Vec<Application>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("commit raced a concurrent write; retry from a fresh read")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of an application for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub candidate_id: CandidateId,
    pub assessment_id: AssessmentId,
    pub current_stage: u8,
    pub status: &'static str,
    pub stage_scores: BTreeMap<&'static str, StageScore>,
    pub strike_count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualification_reason: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ApplicationView {
    pub fn from_application(application: &Application) -> Self {
        let stage_scores = application
            .stage_scores
            .iter()
            .map(|(key, score)| (key.as_str(), score.clone()))
            .collect::<BTreeMap<&'static str, StageScore>>();

        Self {
            candidate_id: application.candidate_id.clone(),
            assessment_id: application.assessment_id.clone(),
            current_stage: application.stage.number(),
            status: application.status.label(),
            stage_scores,
            strike_count: application.strike_count,
            disqualification_reason: application.disqualification_reason.clone(),
            updated_at: application.updated_at,
        }
    }

    pub fn final_score(&self) -> Option<u8> {
        self.stage_scores
            .get(StageKey::Final.as_str())
            .map(|entry| entry.score)
    }
}
