//! `agrocam demo` - interactive session
//!
//! Uses the coordinator when a Gemini key is configured. Without one, each
//! question is routed by keywords to a single domain tool.

use super::ask::print_result;
use crate::server::{api_key, build_orchestrator, build_runner, load_config};
use agrocam_core::{route, Orchestrator, OrchestratorInput, UNROUTED_REPLY};
use agrocam_data::Region;
use agrocam_tools::ToolRunner;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

const HELP: &str = "\
Posez votre question en français, par exemple:
  - Quel temps fera-t-il à Bafoussam cette semaine ?
  - Quand planter le maïs dans l'Ouest ?
  - Mes feuilles de cacao ont des taches noires
  - Quel est le prix du cacao ?
  - Quel engrais pour un sol argileux ?
Tapez 'quitter' pour sortir.";

enum Mode {
    Online(Orchestrator),
    Offline(ToolRunner),
}

/// Run the REPL until quit or end of input
pub async fn run() -> Result<()> {
    let config = load_config()?;
    let default_region = config.agriculture.default_region;
    let runner = build_runner(&config.agriculture);

    let mode = if api_key().is_some() {
        match build_orchestrator(&config, runner.clone()) {
            Ok(orchestrator) => Mode::Online(orchestrator),
            Err(e) => {
                warn!("Coordinator unavailable, falling back to offline mode: {}", e);
                Mode::Offline(runner)
            }
        }
    } else {
        Mode::Offline(runner)
    };

    println!("🌱 AgroCam - conseil agricole pour le Cameroun");
    match &mode {
        Mode::Online(_) => println!("Mode en ligne (Gemini)."),
        Mode::Offline(_) => println!("Mode hors ligne: réponses tirées des outils locaux."),
    }
    println!("Région par défaut: {default_region}. Tapez 'aide' pour l'aide.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("👨‍🌾 > ");
        std::io::stdout().flush().ok();

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => println!("{HELP}\n"),
            Command::Question(question) => match &mode {
                Mode::Online(orchestrator) => {
                    let input = OrchestratorInput::new("cli", "demo", "local", question)
                        .with_region(default_region);
                    match orchestrator.process(input).await {
                        Ok(result) => print_result(&result),
                        Err(e) => println!("❌ {}", agrocam_core::format_error_for_chat(&e)),
                    }
                }
                Mode::Offline(runner) => answer_offline(runner, question, default_region).await,
            },
        }
    }

    println!("À bientôt ! Bonnes récoltes 🌾");
    Ok(())
}

async fn answer_offline(runner: &ToolRunner, question: &str, default_region: Region) {
    let Some((tool, input)) = route(question).offline_tool_call(default_region) else {
        println!("{UNROUTED_REPLY}\n");
        return;
    };

    match runner.execute(tool, input).await {
        Ok(execution) if execution.result.success => {
            let output = serde_json::to_string_pretty(&execution.result.output)
                .unwrap_or_else(|_| execution.result.output.to_string());
            println!("[{tool}]\n{output}\n");
        }
        Ok(execution) => println!(
            "❌ {}\n",
            execution.result.error.as_deref().unwrap_or("échec de l'outil")
        ),
        Err(e) => println!("❌ {e}\n"),
    }
}

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Empty,
    Quit,
    Help,
    Question(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "exit" | "quitter" => Self::Quit,
            "aide" | "help" => Self::Help,
            _ => Self::Question(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocam_tools::{register_domain_tools, ToolEnv, ToolRegistry};
    use std::sync::Arc;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(Command::parse("Quitter"), Command::Quit);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse("AIDE"), Command::Help);
        assert_eq!(
            Command::parse(" Prix du cacao ? "),
            Command::Question("Prix du cacao ?")
        );
    }

    #[tokio::test]
    async fn test_offline_routed_question_runs_a_tool() {
        let mut registry = ToolRegistry::new();
        register_domain_tools(&mut registry, &ToolEnv::seeded(5));
        let runner = ToolRunner::with_defaults(Arc::new(registry));

        let (tool, input) = route("Quel est le prix du cacao ?")
            .offline_tool_call(Region::Centre)
            .unwrap();
        let execution = runner.execute(tool, input).await.unwrap();
        assert!(execution.result.success);
    }
}
