use super::super::domain::Assessment;

const SECTION_CHECKPOINTS: [&str; 4] = ["experience", "education", "skills", "projects"];

const GENERIC_KEYWORDS: [&str; 8] = [
    "python",
    "javascript",
    "react",
    "sql",
    "aws",
    "docker",
    "communication",
    "leadership",
];

pub(crate) struct ResumeOutcome {
    pub score: u8,
    pub feedback: String,
}

/// Deterministic resume screen: structural checkpoints plus a keyword scan
/// seeded with the role's suggested skills. Normalized to 0..=100 with a
/// small grace boost so borderline resumes round up rather than down.
pub(crate) fn screen_resume(resume_text: &str, assessment: &Assessment) -> ResumeOutcome {
    let text = resume_text.to_lowercase();
    let mut score = 0u32;
    let mut feedback = Vec::new();

    let sections_found = SECTION_CHECKPOINTS
        .iter()
        .filter(|section| text.contains(**section))
        .count();

    if sections_found >= 3 {
        score += 60;
        feedback.push("Good structure: found most standard sections.".to_string());
    } else {
        score += 30;
        feedback.push("Weak structure: missing key sections such as projects or experience.".to_string());
    }

    let mut keywords: Vec<String> = GENERIC_KEYWORDS.iter().map(|kw| kw.to_string()).collect();
    for skill in &assessment.suggested_skills {
        let skill = skill.to_lowercase();
        if !keywords.contains(&skill) {
            keywords.push(skill);
        }
    }

    let found: Vec<&String> = keywords.iter().filter(|kw| text.contains(kw.as_str())).collect();

    if found.len() >= 3 {
        score += 30;
        let sample = found
            .iter()
            .take(3)
            .map(|kw| kw.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        feedback.push(format!("Strong skills: detected {sample}."));
    } else if !found.is_empty() {
        score += 15;
        let sample = found.iter().map(|kw| kw.as_str()).collect::<Vec<_>>().join(", ");
        feedback.push(format!("Basic skills: detected {sample}."));
    } else {
        feedback.push("Low skill match: no major technical keywords found.".to_string());
    }

    let score = (score + 10).min(100) as u8;

    ResumeOutcome {
        score,
        feedback: feedback.join(" "),
    }
}
