//! `agrocam ask` - one question through the coordinator

use crate::server::{build_orchestrator, build_runner, load_config};
use agrocam_core::{ExecutionResult, ExecutionStatus, OrchestratorInput};
use agrocam_data::Region;
use anyhow::Result;

/// Ask `query` and print the answer
pub async fn run(query: &str, region: Option<&str>, language: Option<String>) -> Result<()> {
    let config = load_config()?;
    let region = match region {
        Some(name) => name.parse::<Region>()?,
        None => config.agriculture.default_region,
    };

    let runner = build_runner(&config.agriculture);
    let orchestrator = build_orchestrator(&config, runner)?;

    let user = whoami();
    let mut input = OrchestratorInput::new("cli", "local", &user, query).with_region(region);
    if let Some(language) = language {
        input = input.with_language(language);
    }

    let result = orchestrator.process(input).await?;
    print_result(&result);

    if result.status == ExecutionStatus::Failed {
        anyhow::bail!("la demande a échoué");
    }
    Ok(())
}

pub(crate) fn print_result(result: &ExecutionResult) {
    println!("\n{}\n", result.response);

    if !result.agent_responses.is_empty() {
        println!("Agents consultés:");
        for answer in &result.agent_responses {
            println!(
                "  - {} (confiance {:.0}%)",
                answer.agent_name,
                answer.confidence_score * 100.0
            );
        }
    }
    if result.status == ExecutionStatus::PartialSuccess {
        println!("⚠️  Réponse partielle: certains agents n'ont pas pu répondre.");
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "local".to_string())
}
