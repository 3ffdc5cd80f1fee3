use super::super::domain::Question;

/// Raw tally for an auto-scored multiple-choice set.
pub(crate) struct McOutcome {
    pub score: u8,
    pub correct: usize,
    pub scorable: usize,
}

/// Score a multiple-choice set against canonical answer keys. Questions
/// lacking a key are excluded from both numerator and denominator; answers
/// are matched by position, case-insensitively. Returns `None` when nothing
/// in the set is scorable.
pub(crate) fn score_multiple_choice(questions: &[Question], answers: &[String]) -> Option<McOutcome> {
    let mut correct = 0usize;
    let mut scorable = 0usize;

    for (index, question) in questions.iter().enumerate() {
        let Some(key) = question.answer_key() else {
            continue;
        };
        scorable += 1;

        let matched = answers
            .get(index)
            .map(|answer| answer.trim().eq_ignore_ascii_case(key.trim()))
            .unwrap_or(false);
        if matched {
            correct += 1;
        }
    }

    if scorable == 0 {
        return None;
    }

    let score = ((100.0 * correct as f64) / scorable as f64).round() as u8;
    Some(McOutcome {
        score,
        correct,
        scorable,
    })
}
