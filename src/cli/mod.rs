//! CLI module for AgroCam
//!
//! Provides commands:
//! - `serve`: HTTP API server
//! - `ask`: one question through the coordinator
//! - `demo`: interactive session, offline when no API key is set
//! - `regions`, `crops`, `prices`, `season`: reference lookups

use clap::{Parser, Subcommand};

pub mod ask;
pub mod data;
pub mod demo;

/// AgroCam agricultural advisory CLI
#[derive(Parser, Debug)]
#[command(name = "agrocam")]
#[command(about = "Conseil agricole multi-agents pour le Cameroun")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve,
    /// Ask one question
    Ask {
        /// The question, in French or English
        query: String,
        /// Region of the farm (defaults to the configured region)
        #[arg(short, long)]
        region: Option<String>,
        /// Answer language
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Interactive session
    Demo,
    /// List the ten regions
    Regions,
    /// List crops, optionally those suited to a region
    Crops {
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Market price band of a crop
    Prices {
        /// Crop name (maïs, cacao, cassava...)
        crop: String,
    },
    /// Season and field activities for a region and month
    Season {
        #[arg(short, long)]
        region: Option<String>,
        /// Month 1-12 (defaults to the current month)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },
}

impl Commands {
    /// Commands that start long-running services log at info level
    pub fn is_service(&self) -> bool {
        matches!(self, Self::Serve)
    }
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Ask {
            query,
            region,
            language,
        }) => ask::run(&query, region.as_deref(), language).await,
        Some(Commands::Demo) => demo::run().await,
        Some(Commands::Regions) => data::regions(),
        Some(Commands::Crops { region }) => data::crops(region.as_deref()),
        Some(Commands::Prices { crop }) => data::prices(&crop),
        Some(Commands::Season { region, month }) => data::season(region.as_deref(), month),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_region() {
        let cli = Cli::try_parse_from(["agrocam", "ask", "Quand semer ?", "--region", "Ouest"]).unwrap();
        match cli.command {
            Some(Commands::Ask { query, region, .. }) => {
                assert_eq!(query, "Quand semer ?");
                assert_eq!(region.as_deref(), Some("Ouest"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_season_month_is_bounded() {
        assert!(Cli::try_parse_from(["agrocam", "season", "--month", "13"]).is_err());
        assert!(Cli::try_parse_from(["agrocam", "season", "--month", "7"]).is_ok());
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["agrocam"]).unwrap();
        assert!(cli.command.is_none());
    }
}
