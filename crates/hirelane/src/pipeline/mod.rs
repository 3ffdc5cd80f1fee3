//! The assessment pipeline: domain aggregate, state machine service,
//! scoring engine, proctoring monitor, and the persistence and question-bank
//! contracts the binaries implement.

pub mod domain;
pub mod proctor;
pub mod question_bank;
pub mod router;
pub mod scorer;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationStatus, Assessment, AssessmentId, Candidate, CandidateId, Difficulty,
    FinalBreakdown, Question, QuestionKind, Stage, StageKey, StageScore,
};
pub use proctor::{ProctorMonitor, ProctorSignal, VISIBILITY_DISQUALIFICATION_REASON};
pub use question_bank::{BankError, QuestionBank};
pub use router::pipeline_router;
pub use scorer::{
    AnswerEvaluator, AnswerPair, EvaluationRequest, EvaluatorError, EvaluatorReply, ScoreReport,
    Scorer, ScoringConfig, StageWeights,
};
pub use service::{PipelineError, PipelineService};
pub use store::{ApplicationStore, ApplicationView, StoreError};
