use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One (question, answer) pair shipped to the external evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPair {
    pub prompt: String,
    pub expected_keywords: Vec<String>,
    pub answer: String,
}

/// Request shape for free-text/code evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub pairs: Vec<AnswerPair>,
}

/// Raw reply from the evaluator, validated before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorReply {
    pub score: f64,
    pub feedback: String,
}

/// Errors from the external evaluation dependency. These are recovered
/// locally via the documented fallback score; they never stall the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("evaluator unreachable: {0}")]
    Unreachable(String),
    #[error("evaluator returned a malformed reply: {0}")]
    Malformed(String),
}

/// External language-reasoning service that grades free-text and code
/// answers. The only network-latency-bound dependency in the core; callers
/// await it without holding any cross-application lock.
pub trait AnswerEvaluator: Send + Sync {
    fn evaluate(
        &self,
        request: EvaluationRequest,
    ) -> BoxFuture<'_, Result<EvaluatorReply, EvaluatorError>>;
}

/// Enforce the reply contract: a finite score in 0..=100 and non-empty
/// feedback. Anything else is treated as a malformed reply.
pub(crate) fn validate_reply(reply: EvaluatorReply) -> Result<EvaluatorReply, EvaluatorError> {
    if !reply.score.is_finite() || !(0.0..=100.0).contains(&reply.score) {
        return Err(EvaluatorError::Malformed(format!(
            "score {} outside 0..=100",
            reply.score
        )));
    }
    if reply.feedback.trim().is_empty() {
        return Err(EvaluatorError::Malformed("empty feedback".to_string()));
    }
    Ok(reply)
}
