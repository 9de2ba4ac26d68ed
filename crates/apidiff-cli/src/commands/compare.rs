//! Compare command

use super::load::{load_config, load_document};
use apidiff_core::logging_facility::{init, Profile};
use apidiff_core::{
    compare_specs, render_human_summary, NoopSchemaDiffer, SchemaDiffer, StructuralSchemaDiffer,
};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// The older document (JSON or YAML)
    pub source: PathBuf,

    /// The newer document (JSON or YAML)
    pub destination: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Engine configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging profile
    #[arg(long, value_enum, default_value_t = LogProfile::Production)]
    pub log_profile: LogProfile,

    /// Skip JSON-schema comparison of request and response bodies
    #[arg(long)]
    pub no_schema_diff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogProfile {
    /// Pretty, human-readable output
    #[value(alias = "dev")]
    Development,
    /// JSON lines on stderr
    #[value(alias = "prod")]
    Production,
}

impl From<LogProfile> for Profile {
    fn from(profile: LogProfile) -> Self {
        match profile {
            LogProfile::Development => Profile::Development,
            LogProfile::Production => Profile::Production,
        }
    }
}

/// Whether the comparison found breaking differences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Compatible,
    Breaking,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Compatible => 0,
            Verdict::Breaking => 1,
        }
    }
}

pub fn execute(args: CompareArgs) -> Result<Verdict, Box<dyn std::error::Error>> {
    init(args.log_profile.into());

    let config = load_config(args.config.as_deref())?;
    let source = load_document(&args.source)?;
    let destination = load_document(&args.destination)?;

    let differ: &dyn SchemaDiffer = if args.no_schema_diff {
        &NoopSchemaDiffer
    } else {
        &StructuralSchemaDiffer
    };

    let outcome = compare_specs(&source, &destination, differ, &config)?;

    match args.output {
        OutputFormat::Text => print!("{}", render_human_summary(&outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }

    Ok(if outcome.breaking_differences_found {
        Verdict::Breaking
    } else {
        Verdict::Compatible
    })
}
