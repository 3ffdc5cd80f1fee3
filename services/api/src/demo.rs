use std::sync::Arc;

use clap::Args;

use hirelane::error::AppError;
use hirelane::pipeline::{
    AssessmentId, CandidateId, PipelineService, QuestionBank, ScoringConfig, StageKey,
};

use crate::infra::{InMemoryApplicationStore, InMemoryQuestionBank, KeywordEvaluator};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Candidate e-mail used for the walkthrough
    #[arg(long, default_value = "demo.candidate@example.com")]
    pub(crate) email: String,
    /// Assessment to run the candidate through
    #[arg(long, default_value = "fullstack-developer")]
    pub(crate) assessment: String,
    /// Show the disqualification path instead of the happy path
    #[arg(long)]
    pub(crate) violations: bool,
}

const DEMO_RESUME: &str = "Experience: five years shipping full stack products.\n\
                           Education: BSc Computer Science.\n\
                           Skills: React, Python, SQL, Docker, AWS.\n\
                           Projects: a multi-tenant billing dashboard.";

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let candidate = CandidateId(args.email.clone());
    let assessment_id = AssessmentId(args.assessment.clone());

    let store = Arc::new(InMemoryApplicationStore::default());
    let bank = Arc::new(InMemoryQuestionBank::seeded());
    let service = PipelineService::new(
        store,
        bank.clone(),
        Arc::new(KeywordEvaluator),
        ScoringConfig::default(),
    );

    println!("Hiring pipeline demo");
    println!("  candidate:  {candidate}");
    println!("  assessment: {assessment_id}");

    let application = match service.select_assessment(&candidate, &assessment_id) {
        Ok(application) => application,
        Err(err) => {
            println!("  selection failed: {err}");
            return Ok(());
        }
    };
    println!("\nStage 1 - resume screening");
    println!("  application created at stage {}", application.stage.number());

    let application = match service.submit_resume(&candidate, &assessment_id, DEMO_RESUME) {
        Ok(application) => application,
        Err(err) => {
            println!("  resume submission failed: {err}");
            return Ok(());
        }
    };
    let resume_score = application.stage_score(StageKey::Resume).unwrap_or(0);
    println!("  resume score: {resume_score}");
    if application.is_terminal() {
        println!("  application ended: {}", application.status.label());
        return Ok(());
    }

    if args.violations {
        println!("\nProctoring - repeated visibility loss");
        for strike in 1..=3 {
            let application = match service.report_violation(&candidate, &assessment_id) {
                Ok(application) => application,
                Err(err) => {
                    println!("  violation report failed: {err}");
                    return Ok(());
                }
            };
            println!(
                "  strike {strike}: status {}",
                application.status.label()
            );
            if let Some(reason) = application.disqualification_reason {
                println!("  reason: {reason}");
            }
        }
        return Ok(());
    }

    println!("\nStage 2 - psychometric");
    let psychometric = bank.psychometric_set().map(|set| set.len()).unwrap_or(0);
    println!("  serving {psychometric} aptitude questions");
    step(service.complete_stage(&candidate, &assessment_id, 2, 83, "Steady aptitude run.".to_string()))?;

    println!("\nStage 3 - resume deep-dive");
    step(service.complete_stage(&candidate, &assessment_id, 3, 78, "Solid depth on listed projects.".to_string()))?;

    println!("\nStage 4 - role assessment");
    let answers = vec![
        "The virtual DOM batches updates through diffing and reconciliation before render."
            .to_string(),
        "PUT is an idempotent full replace; PATCH applies a partial change.".to_string(),
        "DISTINCT".to_string(),
        "Expand-contract migration with a backfill job and a rollback plan.".to_string(),
    ];
    let application = match service.submit_final(&candidate, &assessment_id, &answers).await {
        Ok(application) => application,
        Err(err) => {
            println!("  final submission failed: {err}");
            return Ok(());
        }
    };

    println!("  outcome: {}", application.status.label());
    if let Some(entry) = application.stage_scores.get(&StageKey::Final) {
        println!("  weighted score: {}", entry.score);
        if let Some(breakdown) = entry.breakdown {
            println!("  breakdown:");
            println!("    resume parsing  {:>3}", breakdown.resume_parsing);
            println!("    psychometric    {:>3}", breakdown.psychometric);
            println!("    resume tech     {:>3}", breakdown.resume_tech);
            println!("    role assessment {:>3}", breakdown.jd_test);
        }
        println!("  feedback: {}", entry.feedback);
    }

    Ok(())
}

fn step<T>(result: Result<T, hirelane::pipeline::PipelineError>) -> Result<(), AppError> {
    if let Err(err) = result {
        println!("  step failed: {err}");
    }
    Ok(())
}
