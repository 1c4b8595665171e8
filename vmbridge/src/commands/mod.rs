mod check;
mod completions;
mod generate;

use check::CheckCommand;
use clap::{Parser, Subcommand, ValueEnum};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;

/// Extension trait for exiting on source and configuration errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for vmbridge_source::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

/// How a command prints its report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// Human-readable summary
    #[default]
    Text,
    /// The report as pretty-printed JSON
    Json,
}

#[derive(Parser)]
#[command(name = "vmbridge")]
#[command(version)]
#[command(about = "Generate gRPC bridges for MVVM view models")]
pub(crate) struct Cli {
    /// Increase log verbosity (ignored when RUST_LOG is set)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Check(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the view model and write the enabled artifacts
    Generate(GenerateCommand),

    /// Extract the view model and report it without generating code
    Check(CheckCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
