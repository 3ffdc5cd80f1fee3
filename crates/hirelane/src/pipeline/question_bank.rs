use super::domain::{Assessment, AssessmentId, CandidateId, Question};

/// Read-only accessor for stage question content. The pipeline never writes
/// question data; assessments are authored by an external generator.
pub trait QuestionBank: Send + Sync {
    /// Full assessment (role, job description, final-stage questions).
    fn assessment(&self, id: &AssessmentId) -> Result<Option<Assessment>, BankError>;

    /// Fixed multiple-choice set used by the psychometric stage.
    fn psychometric_set(&self) -> Result<Vec<Question>, BankError>;

    /// Resume-grounded technical questions for the given candidate.
    fn resume_set(&self, candidate: &CandidateId) -> Result<Vec<Question>, BankError>;
}

/// Question bank failures. The bank is an external collaborator, so the only
/// failure mode the pipeline models is unavailability.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("question bank unavailable: {0}")]
    Unavailable(String),
}
