//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::countdown::CountdownArgs;
use super::commands::format::FormatArgs;
use super::commands::personas::PersonasArgs;
use super::commands::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(name = "mentor-gateway")]
#[command(about = "Mentor Gateway - exam-prep AI proxy and notation formatter", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .mentor-gateway/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve(ServeArgs),

    /// Rewrite shorthand into exam notation
    Format(FormatArgs),

    /// List persona templates
    Personas(PersonasArgs),

    /// Days until an exam and the current study-cycle position
    Countdown(CountdownArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["mentor-gateway", "format", "v0", "--json", "-c", "x.yaml"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Commands::Format(_)));
    }

    #[test]
    fn test_countdown_parses_dates() {
        let cli = Cli::try_parse_from([
            "mentor-gateway",
            "countdown",
            "neet",
            "--today",
            "2026-10-18",
        ])
        .unwrap();
        let Commands::Countdown(args) = cli.command else {
            panic!("expected countdown");
        };
        assert_eq!(args.exam.as_deref(), Some("neet"));
        assert!(args.today.is_some());
    }
}
