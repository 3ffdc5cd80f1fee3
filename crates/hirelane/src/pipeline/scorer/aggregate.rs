use super::super::domain::FinalBreakdown;
use super::config::StageWeights;

/// Combine the four per-stage scores into the weighted final aggregate,
/// rounded to an integer 0..=100.
pub(crate) fn weighted_final(
    resume: u8,
    psychometric: u8,
    resume_tech: u8,
    jd_test: u8,
    weights: &StageWeights,
) -> (u8, FinalBreakdown) {
    let total = f64::from(weights.resume) * f64::from(resume)
        + f64::from(weights.psychometric) * f64::from(psychometric)
        + f64::from(weights.resume_technical) * f64::from(resume_tech)
        + f64::from(weights.final_assessment) * f64::from(jd_test);

    let score = total.round().clamp(0.0, 100.0) as u8;

    let breakdown = FinalBreakdown {
        resume_parsing: resume,
        psychometric,
        resume_tech,
        jd_test,
    };

    (score, breakdown)
}
