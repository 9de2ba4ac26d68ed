//! apidiff CLI
//!
//! Command-line interface for comparing OpenAPI/Swagger documents.
//!
//! Exit codes: 0 no breaking differences, 1 breaking differences found,
//! 2 error.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "apidiff")]
#[command(about = "apidiff - Breaking change detection for OpenAPI/Swagger documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a source document with a destination document
    Compare(commands::compare::CompareArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args),
    };

    match result {
        Ok(verdict) => std::process::exit(verdict.exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
