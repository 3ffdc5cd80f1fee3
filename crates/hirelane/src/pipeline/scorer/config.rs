use serde::{Deserialize, Serialize};

/// Relative weight of each stage in the final aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageWeights {
    pub resume: f32,
    pub psychometric: f32,
    pub resume_technical: f32,
    pub final_assessment: f32,
}

/// Scoring contract constants. Defaults carry the documented values; deploys
/// may tighten or loosen them without touching the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum resume score to proceed past stage 1.
    pub shortlist_threshold: u8,
    /// Minimum weighted final score for the qualified outcome.
    pub qualification_threshold: u8,
    pub weights: StageWeights,
    /// Applied when a psychometric set has no auto-scorable questions:
    /// ungraded, assumed pass-level.
    pub psychometric_fallback_score: u8,
    /// Applied when the external answer evaluator is unreachable or returns
    /// a malformed reply.
    pub evaluator_fallback_score: u8,
    /// Visibility-loss strikes that force disqualification.
    pub max_strikes: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            shortlist_threshold: 60,
            qualification_threshold: 70,
            weights: StageWeights {
                resume: 0.20,
                psychometric: 0.20,
                resume_technical: 0.30,
                final_assessment: 0.30,
            },
            psychometric_fallback_score: 85,
            evaluator_fallback_score: 75,
            max_strikes: 3,
        }
    }
}
