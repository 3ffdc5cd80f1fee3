use hirelane::pipeline::{Assessment, AssessmentId, Difficulty, Question, QuestionKind};

/// Skills the generator can recognize in a job description. The lexicon is
/// deliberately small; unrecognized stacks still produce a usable assessment
/// from the generic templates.
const SKILL_LEXICON: [&str; 12] = [
    "react",
    "python",
    "rust",
    "sql",
    "docker",
    "kubernetes",
    "aws",
    "typescript",
    "pytorch",
    "redis",
    "kafka",
    "graphql",
];

/// Derive an assessment from a role title and job description. Deterministic:
/// the same inputs always yield the same identifier and question set.
pub(crate) fn generate_assessment(role_title: &str, job_description: &str) -> Assessment {
    let id = slugify(role_title);
    let lowered = job_description.to_lowercase();

    let skills: Vec<String> = SKILL_LEXICON
        .iter()
        .filter(|skill| lowered.contains(**skill))
        .map(|skill| capitalize(skill))
        .collect();

    let mut questions = Vec::new();
    for (index, skill) in skills.iter().take(3).enumerate() {
        questions.push(Question {
            id: format!("{id}-s{}", index + 1),
            prompt: format!(
                "Describe a production problem you solved with {skill} and the tradeoffs involved."
            ),
            kind: QuestionKind::FreeText,
            difficulty: Some(Difficulty::Medium),
            keywords: vec![skill.to_lowercase(), "tradeoff".to_string()],
        });
    }

    questions.push(Question {
        id: format!("{id}-g1"),
        prompt: format!(
            "What would your first ninety days look like as a {role_title} here?"
        ),
        kind: QuestionKind::FreeText,
        difficulty: Some(Difficulty::Easy),
        keywords: vec!["plan".to_string(), "learn".to_string(), "ship".to_string()],
    });
    questions.push(Question {
        id: format!("{id}-g2"),
        prompt: "Which practice best keeps a growing codebase healthy?".to_string(),
        kind: QuestionKind::MultipleChoice {
            options: vec![
                "code review".to_string(),
                "longer release cycles".to_string(),
                "fewer tests".to_string(),
                "feature freezes".to_string(),
            ],
            answer_key: Some("code review".to_string()),
        },
        difficulty: Some(Difficulty::Easy),
        keywords: Vec::new(),
    });

    Assessment {
        assessment_id: AssessmentId(id),
        role_title: role_title.to_string(),
        job_description: job_description.to_string(),
        suggested_skills: skills,
        questions,
    }
}

fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut last_dash = true;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
