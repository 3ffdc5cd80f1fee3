use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candidate identity. The unique e-mail address is the sole authorization
/// key the pipeline relies on; authentication happens upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub String);

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered candidate. Created externally; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub display_name: String,
    pub affiliation: Option<String>,
}

/// A role posting with the ordered question set used by the final stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessment_id: AssessmentId,
    pub role_title: String,
    pub job_description: String,
    pub suggested_skills: Vec<String>,
    pub questions: Vec<Question>,
}

/// One question within a stage's question set. Immutable once attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Question {
    /// A question is auto-scorable when it carries a canonical correct option.
    pub fn answer_key(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice {
                answer_key: Some(key),
                ..
            } => Some(key.as_str()),
            _ => None,
        }
    }
}

/// Question kinds and their kind-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        answer_key: Option<String>,
    },
    FreeText,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Ordered pipeline stages. Terminal outcomes live on [`ApplicationStatus`];
/// `stage` only records how far the candidate has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResumeScreening,
    Psychometric,
    ResumeTechnical,
    FinalAssessment,
}

impl Stage {
    pub const fn number(self) -> u8 {
        match self {
            Stage::ResumeScreening => 1,
            Stage::Psychometric => 2,
            Stage::ResumeTechnical => 3,
            Stage::FinalAssessment => 4,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Stage::ResumeScreening),
            2 => Some(Stage::Psychometric),
            3 => Some(Stage::ResumeTechnical),
            4 => Some(Stage::FinalAssessment),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Stage::ResumeScreening => Some(Stage::Psychometric),
            Stage::Psychometric => Some(Stage::ResumeTechnical),
            Stage::ResumeTechnical => Some(Stage::FinalAssessment),
            Stage::FinalAssessment => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::ResumeScreening => "resume screening",
            Stage::Psychometric => "psychometric",
            Stage::ResumeTechnical => "resume technical",
            Stage::FinalAssessment => "final assessment",
        }
    }

    /// Key under which this stage's score is recorded.
    pub const fn score_key(self) -> StageKey {
        match self {
            Stage::ResumeScreening => StageKey::Resume,
            Stage::Psychometric => StageKey::Stage2,
            Stage::ResumeTechnical => StageKey::Stage3,
            Stage::FinalAssessment => StageKey::Final,
        }
    }
}

/// Canonical stage-score keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StageKey {
    #[serde(rename = "resume")]
    Resume,
    #[serde(rename = "stage_2")]
    Stage2,
    #[serde(rename = "stage_3")]
    Stage3,
    #[serde(rename = "final")]
    Final,
}

impl StageKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            StageKey::Resume => "resume",
            StageKey::Stage2 => "stage_2",
            StageKey::Stage3 => "stage_3",
            StageKey::Final => "final",
        }
    }
}

/// High level status tracked throughout the application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    InProgress,
    Qualified,
    Rejected,
    Disqualified,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Qualified => "qualified",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Disqualified => "disqualified",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::InProgress)
    }
}

/// Recorded result for one completed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageScore {
    pub score: u8,
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<FinalBreakdown>,
}

impl StageScore {
    pub fn new(score: u8, feedback: impl Into<String>) -> Self {
        Self {
            score: score.min(100),
            feedback: feedback.into(),
            breakdown: None,
        }
    }
}

/// Per-module scores backing the final weighted aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalBreakdown {
    pub resume_parsing: u8,
    pub psychometric: u8,
    pub resume_tech: u8,
    pub jd_test: u8,
}

/// The core aggregate: one candidate's progress through one assessment.
///
/// Mutated exclusively by the pipeline service; committed as a whole via the
/// store's revision-checked `upsert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub candidate_id: CandidateId,
    pub assessment_id: AssessmentId,
    pub stage: Stage,
    pub status: ApplicationStatus,
    pub stage_scores: BTreeMap<StageKey, StageScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualification_reason: Option<String>,
    /// Proctoring strikes within the current stage attempt. Reset on every
    /// stage transition; never read across stages.
    pub strike_count: u8,
    /// Optimistic concurrency token. Incremented by the store on each commit.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn new(candidate_id: CandidateId, assessment_id: AssessmentId) -> Self {
        let now = Utc::now();
        Self {
            candidate_id,
            assessment_id,
            stage: Stage::ResumeScreening,
            status: ApplicationStatus::InProgress,
            stage_scores: BTreeMap::new(),
            disqualification_reason: None,
            strike_count: 0,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn stage_score(&self, key: StageKey) -> Option<u8> {
        self.stage_scores.get(&key).map(|entry| entry.score)
    }

    pub(crate) fn record_score(&mut self, key: StageKey, score: StageScore) {
        self.stage_scores.insert(key, score);
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
