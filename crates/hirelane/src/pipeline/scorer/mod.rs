mod aggregate;
mod config;
mod evaluator;
mod multiple_choice;
mod resume;

pub use config::{ScoringConfig, StageWeights};
pub use evaluator::{
    AnswerEvaluator, AnswerPair, BoxFuture, EvaluationRequest, EvaluatorError, EvaluatorReply,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{Assessment, FinalBreakdown, Question, QuestionKind};
use evaluator::validate_reply;

/// Result of scoring one stage's answer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u8,
    pub feedback: String,
}

/// Stateless scoring engine applying the configured contract constants.
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Stage 1: deterministic resume screen against the role posting.
    pub fn screen_resume(&self, resume_text: &str, assessment: &Assessment) -> ScoreReport {
        let outcome = resume::screen_resume(resume_text, assessment);
        ScoreReport {
            score: outcome.score,
            feedback: outcome.feedback,
        }
    }

    /// Stage 2: auto-score a multiple-choice set. A set with no canonical
    /// answer keys reports the documented pass-level fallback instead of
    /// failing the candidate.
    pub fn score_psychometric(&self, questions: &[Question], answers: &[String]) -> ScoreReport {
        match multiple_choice::score_multiple_choice(questions, answers) {
            Some(outcome) => ScoreReport {
                score: outcome.score,
                feedback: format!(
                    "Answered {} of {} scorable questions correctly.",
                    outcome.correct, outcome.scorable
                ),
            },
            None => ScoreReport {
                score: self.config.psychometric_fallback_score,
                feedback: "Ungraded set: no scorable questions; assumed pass-level.".to_string(),
            },
        }
    }

    /// Stage 3: delegate free-text/code answers to the external evaluator.
    /// Unreachable or malformed replies degrade to the documented fallback
    /// score; the candidate never stalls on this dependency.
    pub async fn evaluate_free_text(
        &self,
        evaluator: &dyn AnswerEvaluator,
        questions: &[Question],
        answers: &[String],
    ) -> ScoreReport {
        let pairs: Vec<AnswerPair> = questions
            .iter()
            .enumerate()
            .map(|(index, question)| AnswerPair {
                prompt: question.prompt.clone(),
                expected_keywords: question.keywords.clone(),
                answer: answers.get(index).cloned().unwrap_or_default(),
            })
            .collect();

        if pairs.is_empty() {
            return self.degraded_report("empty answer set");
        }

        let request = EvaluationRequest { pairs };
        match evaluator.evaluate(request).await.and_then(validate_reply) {
            Ok(reply) => ScoreReport {
                score: reply.score.round() as u8,
                feedback: reply.feedback,
            },
            Err(err) => {
                warn!(error = %err, "answer evaluation degraded, applying fallback score");
                self.degraded_report("external evaluator failed")
            }
        }
    }

    /// Stage 4: mixed question sets. Multiple-choice questions with keys are
    /// auto-scored; the remainder goes to the evaluator; the partial reports
    /// combine weighted by question count.
    pub async fn score_final_stage(
        &self,
        evaluator: &dyn AnswerEvaluator,
        questions: &[Question],
        answers: &[String],
    ) -> ScoreReport {
        let mut open_questions = Vec::new();
        let mut open_answers = Vec::new();
        for (index, question) in questions.iter().enumerate() {
            let auto_scorable = matches!(
                question.kind,
                QuestionKind::MultipleChoice {
                    answer_key: Some(_),
                    ..
                }
            );
            if !auto_scorable {
                open_questions.push(question.clone());
                open_answers.push(answers.get(index).cloned().unwrap_or_default());
            }
        }

        let mc = multiple_choice::score_multiple_choice(questions, answers);
        let open = if open_questions.is_empty() {
            None
        } else {
            Some(
                self.evaluate_free_text(evaluator, &open_questions, &open_answers)
                    .await,
            )
        };

        match (mc, open) {
            (Some(mc), Some(open)) => {
                let total = mc.scorable + open_questions.len();
                let weighted = (f64::from(mc.score) * mc.scorable as f64
                    + f64::from(open.score) * open_questions.len() as f64)
                    / total as f64;
                ScoreReport {
                    score: weighted.round() as u8,
                    feedback: format!(
                        "{} of {} choice questions correct. {}",
                        mc.correct, mc.scorable, open.feedback
                    ),
                }
            }
            (Some(mc), None) => ScoreReport {
                score: mc.score,
                feedback: format!(
                    "Answered {} of {} scorable questions correctly.",
                    mc.correct, mc.scorable
                ),
            },
            (None, Some(open)) => open,
            (None, None) => self.degraded_report("no scorable content"),
        }
    }

    /// Weighted qualification aggregate over the four recorded stage scores.
    pub fn final_outcome(
        &self,
        resume: u8,
        psychometric: u8,
        resume_tech: u8,
        jd_test: u8,
    ) -> (u8, FinalBreakdown) {
        aggregate::weighted_final(
            resume,
            psychometric,
            resume_tech,
            jd_test,
            &self.config.weights,
        )
    }

    pub fn qualifies(&self, final_score: u8) -> bool {
        final_score >= self.config.qualification_threshold
    }

    fn degraded_report(&self, detail: &str) -> ScoreReport {
        ScoreReport {
            score: self.config.evaluator_fallback_score,
            feedback: format!("Evaluation degraded ({detail}); provisional score applied."),
        }
    }
}
